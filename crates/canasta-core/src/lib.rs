use thiserror::Error;

pub mod app_config;
pub mod categorize;
pub mod chains;
pub mod config;
pub mod geo;
pub mod offer;
pub mod types;

pub use app_config::{AppConfig, Environment};
pub use categorize::categorize_product;
pub use chains::{load_chains, Backend, ChainConfig, ChainsFile};
pub use config::{load_app_config, load_app_config_from_env};
pub use geo::haversine_distance_m;
pub use offer::{sale_fields, ScrapedOffer};
pub use types::{ProductCategory, ProductUnit, StoreType};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    MissingEnvVar(String),

    #[error("invalid value for environment variable {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read chains file {path}: {source}")]
    ChainsFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse chains file: {0}")]
    ChainsFileParse(#[from] serde_yaml::Error),

    #[error("chains file validation failed: {0}")]
    Validation(String),
}
