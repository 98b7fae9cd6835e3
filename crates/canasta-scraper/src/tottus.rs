//! Scraper for Tottus, whose catalog is server-rendered HTML with the
//! product data embedded in a `__NEXT_DATA__` JSON blob.
//!
//! No usable category tree is exposed, so this backend runs the search-term
//! strategy against the site's search page and deduplicates by the
//! platform's SKU id within the run.

use std::collections::HashSet;

use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use reqwest::Client;
use serde::Deserialize;

use canasta_core::{sale_fields, ChainConfig, ScrapedOffer};

use crate::client::{build_http_client, check_status, courtesy_delay, ScrapePolicy};
use crate::error::ScraperError;
use crate::retry::retry_with_backoff;
use crate::terms::SEARCH_TERMS;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TottusProduct {
    #[serde(default)]
    pub product_id: String,
    #[serde(default)]
    pub sku_id: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub brand: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub media_urls: Vec<String>,
    #[serde(default)]
    pub prices: Vec<TottusPrice>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TottusPrice {
    #[serde(rename = "type", default)]
    pub price_type: String,
    #[serde(default)]
    pub crossed: bool,
    #[serde(default)]
    pub price: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct NextData {
    props: Option<NextProps>,
}

#[derive(Debug, Deserialize)]
struct NextProps {
    #[serde(rename = "pageProps")]
    page_props: Option<PageProps>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageProps {
    #[serde(default)]
    results: Vec<serde_json::Value>,
}

/// Extracts the `props.pageProps.results` array from a server-rendered page.
///
/// Returns `None` when the `__NEXT_DATA__` marker, the JSON blob, or the
/// expected structure is absent — a miss, not an error: the caller treats
/// the page as empty.
pub(crate) fn extract_next_data_results(html: &str) -> Option<Vec<TottusProduct>> {
    let marker_idx = html.find("__NEXT_DATA__")?;
    let json_start = html[marker_idx..].find('{')? + marker_idx;
    let script_end = html[json_start..].find("</script>")? + json_start;
    let json_str = &html[json_start..script_end];

    let data: NextData = serde_json::from_str(json_str).ok()?;
    let results = data.props?.page_props?.results;

    // Results are parsed individually so one malformed product does not
    // discard the page.
    Some(
        results
            .into_iter()
            .filter_map(|value| serde_json::from_value::<TottusProduct>(value).ok())
            .collect(),
    )
}

/// Picks the selling price (`internetPrice`, uncrossed) and list price
/// (`normalPrice`) out of the price entries. Values arrive as display
/// strings (`"S/ 4.50"`); everything but digits and the decimal point is
/// stripped before parsing.
pub(crate) fn extract_prices(prices: &[TottusPrice]) -> Option<(f64, f64)> {
    let internet = prices
        .iter()
        .find(|p| p.price_type == "internetPrice" && !p.crossed)
        .and_then(parse_price_entry)?;

    if internet <= 0.0 {
        return None;
    }

    let normal = prices
        .iter()
        .find(|p| p.price_type == "normalPrice")
        .and_then(parse_price_entry)
        .unwrap_or(internet);

    Some((internet, normal))
}

fn parse_price_entry(entry: &TottusPrice) -> Option<f64> {
    let raw = entry.price.first()?;
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    cleaned.parse().ok()
}

pub struct TottusScraper {
    client: Client,
    policy: ScrapePolicy,
    chain: String,
    base_url: String,
}

impl TottusScraper {
    /// Creates the Tottus scraper.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::InvalidChainConfig`] if the chain has no
    /// `base_url`, or [`ScraperError::Http`] if the HTTP client cannot be
    /// built.
    pub fn new(policy: &ScrapePolicy, chain: &ChainConfig) -> Result<Self, ScraperError> {
        let base_url = chain
            .base_url
            .as_deref()
            .ok_or_else(|| ScraperError::InvalidChainConfig {
                chain: chain.slug.clone(),
                reason: "tottus backend requires base_url".to_owned(),
            })?
            .trim_end_matches('/')
            .to_owned();

        Ok(Self {
            client: build_http_client(policy)?,
            policy: policy.clone(),
            chain: chain.slug.clone(),
            base_url,
        })
    }

    /// Scrapes the catalog through the curated search terms, best-effort.
    /// Failed terms are logged and skipped.
    pub async fn scrape(&self) -> Vec<ScrapedOffer> {
        // Coerce the search-term future to a `Send` trait object so its `Send`
        // bound is discharged at this concrete lifetime, rather than leaking a
        // higher-ranked region up to the background-task spawn that drives it.
        let fut: std::pin::Pin<
            Box<dyn std::future::Future<Output = Vec<ScrapedOffer>> + Send + '_>,
        > = Box::pin(self.scrape_terms(SEARCH_TERMS.iter().copied()));
        fut.await
    }

    /// Runs the search-term loop over an arbitrary term list (the basket
    /// path passes product names here).
    pub async fn scrape_terms<'a, I>(&self, terms: I) -> Vec<ScrapedOffer>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut offers = Vec::new();
        let mut seen = HashSet::new();

        for term in terms {
            match self.fetch_search_page(term).await {
                Ok(products) => {
                    for product in products {
                        let external_id = if product.sku_id.is_empty() {
                            product.product_id.clone()
                        } else {
                            product.sku_id.clone()
                        };
                        if external_id.is_empty() || !seen.insert(external_id.clone()) {
                            continue;
                        }
                        if let Some(offer) = parse_product(&self.base_url, external_id, product) {
                            offers.push(offer);
                        }
                    }
                }
                Err(e) => {
                    tracing::warn!(chain = %self.chain, term, error = %e, "skipping search term");
                }
            }
            courtesy_delay(self.policy.term_delay_ms).await;
        }

        tracing::info!(chain = %self.chain, offers = offers.len(), "tottus scrape finished");
        offers
    }

    async fn fetch_search_page(&self, term: &str) -> Result<Vec<TottusProduct>, ScraperError> {
        let encoded = utf8_percent_encode(term, NON_ALPHANUMERIC);
        let url = format!("{}/tottus-pe/buscar?Ntt={encoded}", self.base_url);

        retry_with_backoff(self.policy.max_retries, self.policy.backoff_base_ms, || {
            let url = url.clone();
            async move {
                let response = self
                    .client
                    .get(&url)
                    .header(reqwest::header::ACCEPT, "text/html,application/xhtml+xml")
                    .header(reqwest::header::ACCEPT_LANGUAGE, "es-PE,es;q=0.9")
                    .send()
                    .await?;
                check_status(&url, &response)?;
                let html = response.text().await?;
                Ok(extract_next_data_results(&html).unwrap_or_default())
            }
        })
        .await
    }
}

fn parse_product(
    base_url: &str,
    external_id: String,
    product: TottusProduct,
) -> Option<ScrapedOffer> {
    let (price, list_price) = extract_prices(&product.prices)?;
    let (is_on_sale, sale_percentage) = sale_fields(price, list_price);

    Some(ScrapedOffer {
        external_id,
        name: product.display_name,
        brand: product.brand,
        price,
        list_price,
        is_available: true,
        is_on_sale,
        sale_percentage,
        image_url: product.media_urls.first().cloned().unwrap_or_default(),
        product_url: if product.url.is_empty() {
            String::new()
        } else if product.url.starts_with("http") {
            product.url
        } else {
            format!("{base_url}{}", product.url)
        },
    })
}
