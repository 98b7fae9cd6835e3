use clap::{Parser, Subcommand};

use canasta_ingest::{Ingestor, RunOutcome};

#[derive(Debug, Parser)]
#[command(name = "canasta-cli")]
#[command(about = "Canasta operational command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run a full catalog scrape, or one chain with --chain.
    Scrape {
        /// Chain slug (e.g. plaza_vea); omit to scrape every chain.
        #[arg(long)]
        chain: Option<String>,
    },
    /// Re-scrape only the basket product subset.
    Basket,
    /// Expire stale reports and purge snapshots past retention.
    Maintenance,
    /// Show recent scrape runs.
    Runs {
        #[arg(long, default_value_t = 20)]
        limit: i64,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = canasta_core::load_app_config()?;
    let pool_config = canasta_db::PoolConfig::from_app_config(&config);
    let pool = canasta_db::connect_pool(&config.database_url, pool_config).await?;
    canasta_db::run_migrations(&pool).await?;

    match cli.command {
        Commands::Scrape { chain } => {
            let chains = canasta_core::load_chains(&config.chains_path)?;
            let ingestor = Ingestor::new(pool, &config, chains);

            let outcome = match chain {
                Some(slug) => ingestor.run_chain_scrape(&slug, "cli").await?,
                None => ingestor.run_full_scrape("cli").await?,
            };
            print_outcome(&outcome);
        }
        Commands::Basket => {
            let chains = canasta_core::load_chains(&config.chains_path)?;
            let ingestor = Ingestor::new(pool, &config, chains);

            let outcome = ingestor.run_basket_scrape("cli").await?;
            print_outcome(&outcome);
        }
        Commands::Maintenance => {
            let stats = canasta_ingest::maintenance::run_sweep(&pool).await?;
            println!(
                "expired {} reports, purged {} snapshots",
                stats.reports_expired, stats.snapshots_purged
            );
        }
        Commands::Runs { limit } => {
            let runs = canasta_db::list_scrape_runs(&pool, limit).await?;
            if runs.is_empty() {
                println!("no scrape runs recorded yet");
            }
            for run in runs {
                println!(
                    "{}  {:<7} {:<9} {:>6} offers  trigger={} started={}",
                    run.public_id,
                    run.run_type,
                    run.status,
                    run.offers_persisted,
                    run.trigger_source,
                    run.started_at
                        .map_or_else(|| "-".to_string(), |t| t.to_rfc3339()),
                );
            }
        }
    }

    Ok(())
}

fn print_outcome(outcome: &RunOutcome) {
    match outcome {
        RunOutcome::Completed { offers_persisted } => {
            println!("persisted {offers_persisted} offers");
        }
        RunOutcome::AlreadyRunning => {
            println!("a scrape run is already in progress; nothing to do");
        }
    }
}
