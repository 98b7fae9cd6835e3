//! Read-side services over the aggregated price data: crowdsourced report
//! lifecycle, the cross-source price merge, and the store-total optimizer.

use thiserror::Error;

pub mod merge;
pub mod optimizer;
pub mod reports;

pub use merge::{prices_for_product, MergedPriceEntry, PriceSource};
pub use optimizer::{store_totals, ListItem, StoreTotal};
pub use reports::{confirm, dispute, submit, SubmitReport};

#[derive(Debug, Error)]
pub enum PricesError {
    #[error("product {0} not found")]
    ProductNotFound(i64),

    #[error("store {0} not found")]
    StoreNotFound(i64),

    #[error("report {0} not found")]
    ReportNotFound(i64),

    #[error("price must be positive")]
    InvalidPrice,

    #[error(transparent)]
    Db(#[from] canasta_db::DbError),
}
