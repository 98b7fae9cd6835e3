//! Background job scheduler.
//!
//! Initialises a [`JobScheduler`] at server startup and registers the
//! recurring scrape and maintenance jobs. Cadence is a deployment parameter;
//! the orchestrator's own in-progress guard absorbs any overlap.

use std::sync::Arc;

use sqlx::PgPool;
use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};

use canasta_ingest::{Ingestor, RunOutcome};

/// Builds and starts the background job scheduler.
///
/// Returns the running [`JobScheduler`] handle, which must be kept alive for
/// the lifetime of the process — dropping it shuts down all jobs.
///
/// # Errors
///
/// Returns [`JobSchedulerError`] if the scheduler cannot be initialised, a
/// job cannot be registered, or the scheduler fails to start.
pub async fn build_scheduler(
    pool: PgPool,
    ingestor: Arc<Ingestor>,
) -> Result<JobScheduler, JobSchedulerError> {
    let scheduler = JobScheduler::new().await?;

    register_full_scrape_job(&scheduler, Arc::clone(&ingestor)).await?;
    register_basket_scrape_job(&scheduler, ingestor).await?;
    register_maintenance_job(&scheduler, pool).await?;

    scheduler.start().await?;
    Ok(scheduler)
}

/// Full catalog scrape every 6 hours.
async fn register_full_scrape_job(
    scheduler: &JobScheduler,
    ingestor: Arc<Ingestor>,
) -> Result<(), JobSchedulerError> {
    let job = Job::new_async("0 0 */6 * * *", move |_uuid, _lock| {
        let ingestor = Arc::clone(&ingestor);
        Box::pin(async move {
            tracing::info!("scheduler: starting full scrape");
            match ingestor.run_full_scrape("schedule").await {
                Ok(RunOutcome::Completed { offers_persisted }) => {
                    tracing::info!(offers_persisted, "scheduler: full scrape finished");
                }
                Ok(RunOutcome::AlreadyRunning) => {
                    tracing::warn!("scheduler: full scrape skipped — run already in progress");
                }
                Err(e) => tracing::error!(error = %e, "scheduler: full scrape failed"),
            }
        })
    })?;

    scheduler.add(job).await?;
    Ok(())
}

/// Basket scrape hourly, offset from the full scrape.
async fn register_basket_scrape_job(
    scheduler: &JobScheduler,
    ingestor: Arc<Ingestor>,
) -> Result<(), JobSchedulerError> {
    let job = Job::new_async("0 15 * * * *", move |_uuid, _lock| {
        let ingestor = Arc::clone(&ingestor);
        Box::pin(async move {
            match ingestor.run_basket_scrape("schedule").await {
                Ok(RunOutcome::Completed { offers_persisted }) => {
                    tracing::info!(offers_persisted, "scheduler: basket scrape finished");
                }
                Ok(RunOutcome::AlreadyRunning) => {
                    tracing::info!("scheduler: basket scrape skipped — run already in progress");
                }
                Err(e) => tracing::error!(error = %e, "scheduler: basket scrape failed"),
            }
        })
    })?;

    scheduler.add(job).await?;
    Ok(())
}

/// Nightly retention sweep: expire stale reports, purge old snapshots.
async fn register_maintenance_job(
    scheduler: &JobScheduler,
    pool: PgPool,
) -> Result<(), JobSchedulerError> {
    let pool = Arc::new(pool);

    let job = Job::new_async("0 45 3 * * *", move |_uuid, _lock| {
        let pool = Arc::clone(&pool);
        Box::pin(async move {
            if let Err(e) = canasta_ingest::maintenance::run_sweep(&pool).await {
                tracing::error!(error = %e, "scheduler: maintenance sweep failed");
            }
        })
    })?;

    scheduler.add(job).await?;
    Ok(())
}
