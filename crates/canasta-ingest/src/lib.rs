//! Ingestion orchestrator: turns scraper output into catalog products,
//! price snapshots, and rolling stats.

use thiserror::Error;

mod basket;
mod ingestor;
pub mod maintenance;
pub mod persist;

pub use ingestor::{Ingestor, RunOutcome};
pub use persist::PersistStats;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("unknown chain '{0}'")]
    UnknownChain(String),

    #[error(transparent)]
    Db(#[from] canasta_db::DbError),

    #[error(transparent)]
    Scraper(#[from] canasta_scraper::ScraperError),
}
