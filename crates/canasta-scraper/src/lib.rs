pub mod client;
pub mod error;
pub mod justo;
mod retry;
pub mod terms;
pub mod tottus;
pub mod vtex;

pub use client::{build_http_client, ScrapePolicy};
pub use error::ScraperError;
pub use justo::JustoScraper;
pub use terms::SEARCH_TERMS;
pub use tottus::TottusScraper;
pub use vtex::VtexScraper;
