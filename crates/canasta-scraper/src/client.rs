//! Shared HTTP client construction and response classification.

use std::time::Duration;

use reqwest::{Client, Response};

use crate::error::ScraperError;

/// Behavioral knobs shared by every backend: timeouts, courtesy delays, and
/// the retry policy.
#[derive(Debug, Clone)]
pub struct ScrapePolicy {
    pub request_timeout_secs: u64,
    pub user_agent: String,
    /// Delay between category/page requests (category-tree strategy).
    pub category_delay_ms: u64,
    /// Delay between search-term requests (search-term strategy).
    pub term_delay_ms: u64,
    pub max_retries: u32,
    pub backoff_base_ms: u64,
}

impl ScrapePolicy {
    #[must_use]
    pub fn from_app_config(config: &canasta_core::AppConfig) -> Self {
        Self {
            request_timeout_secs: config.scraper_request_timeout_secs,
            user_agent: config.scraper_user_agent.clone(),
            category_delay_ms: config.scraper_category_delay_ms,
            term_delay_ms: config.scraper_term_delay_ms,
            max_retries: config.scraper_max_retries,
            backoff_base_ms: config.scraper_retry_backoff_base_ms,
        }
    }
}

/// Builds a `reqwest::Client` with the policy's timeout and `User-Agent`.
///
/// # Errors
///
/// Returns [`ScraperError::Http`] if the underlying client cannot be
/// constructed (e.g., invalid TLS config).
pub fn build_http_client(policy: &ScrapePolicy) -> Result<Client, ScraperError> {
    let client = Client::builder()
        .timeout(Duration::from_secs(policy.request_timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .user_agent(&policy.user_agent)
        .build()?;
    Ok(client)
}

/// Maps a non-success response to the matching typed error.
///
/// # Errors
///
/// - [`ScraperError::RateLimited`] for HTTP 429, with the `Retry-After`
///   value when the server sends one.
/// - [`ScraperError::UnexpectedStatus`] for any other non-2xx status.
pub(crate) fn check_status(url: &str, response: &Response) -> Result<(), ScraperError> {
    let status = response.status();

    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        let retry_after_secs = response
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(60);

        let domain = response
            .url()
            .host_str()
            .unwrap_or("unknown")
            .to_owned();

        return Err(ScraperError::RateLimited {
            domain,
            retry_after_secs,
        });
    }

    if !status.is_success() {
        return Err(ScraperError::UnexpectedStatus {
            status: status.as_u16(),
            url: url.to_owned(),
        });
    }

    Ok(())
}

/// Sleeps for the given courtesy delay; zero disables the sleep entirely.
pub(crate) async fn courtesy_delay(delay_ms: u64) {
    if delay_ms > 0 {
        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
    }
}
