//! The retailer chain roster, loaded from a YAML file.
//!
//! Each entry names one scrapeable chain and the backend that understands its
//! catalog. Four chains share the VTEX catalog platform; Tambo sits behind
//! the Justo GraphQL API; Tottus serves its catalog as embedded JSON inside
//! server-rendered HTML.

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Which scraper implementation a chain's catalog requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    Vtex,
    Justo,
    Tottus,
}

impl std::fmt::Display for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Backend::Vtex => write!(f, "vtex"),
            Backend::Justo => write!(f, "justo"),
            Backend::Tottus => write!(f, "tottus"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainConfig {
    /// Stable identifier, also the `stores.chain` value (e.g. `plaza_vea`).
    pub slug: String,
    /// Human-readable name (e.g. `"Plaza Vea"`).
    pub label: String,
    pub backend: Backend,
    /// Site origin for `vtex` and `tottus` backends.
    pub base_url: Option<String>,
    /// GraphQL endpoint for the `justo` backend.
    pub graphql_url: Option<String>,
    pub website_id: Option<String>,
    pub menu_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ChainsFile {
    pub chains: Vec<ChainConfig>,
}

impl ChainsFile {
    /// Looks up a chain by slug.
    #[must_use]
    pub fn find(&self, slug: &str) -> Option<&ChainConfig> {
        self.chains.iter().find(|c| c.slug == slug)
    }
}

/// Load and validate the chain roster from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails
/// validation.
pub fn load_chains(path: &Path) -> Result<ChainsFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ChainsFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    let chains_file: ChainsFile = serde_yaml::from_str(&content)?;
    validate_chains(&chains_file)?;
    Ok(chains_file)
}

fn validate_chains(chains_file: &ChainsFile) -> Result<(), ConfigError> {
    if chains_file.chains.is_empty() {
        return Err(ConfigError::Validation(
            "chains file contains no chains".to_string(),
        ));
    }

    let mut seen_slugs = HashSet::new();
    for chain in &chains_file.chains {
        if chain.slug.trim().is_empty() {
            return Err(ConfigError::Validation(
                "chain slug must be non-empty".to_string(),
            ));
        }
        if !seen_slugs.insert(chain.slug.as_str()) {
            return Err(ConfigError::Validation(format!(
                "duplicate chain slug '{}'",
                chain.slug
            )));
        }

        match chain.backend {
            Backend::Vtex | Backend::Tottus => {
                if chain.base_url.as_deref().is_none_or(str::is_empty) {
                    return Err(ConfigError::Validation(format!(
                        "chain '{}' uses the {} backend and requires base_url",
                        chain.slug, chain.backend
                    )));
                }
            }
            Backend::Justo => {
                let complete = chain.graphql_url.as_deref().is_some_and(|s| !s.is_empty())
                    && chain.website_id.as_deref().is_some_and(|s| !s.is_empty())
                    && chain.menu_id.as_deref().is_some_and(|s| !s.is_empty());
                if !complete {
                    return Err(ConfigError::Validation(format!(
                        "chain '{}' uses the justo backend and requires graphql_url, website_id and menu_id",
                        chain.slug
                    )));
                }
            }
        }
    }

    Ok(())
}
