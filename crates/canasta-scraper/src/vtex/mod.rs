//! Scraper for chains on the VTEX catalog platform (Plaza Vea, Wong, Metro,
//! Makro).
//!
//! Primary strategy: walk the public category tree, keep grocery-scope
//! categories, and paginate each one through the search API. Categories whose
//! `resources` count exceeds the platform's pagination ceiling are subdivided
//! into their children. If the tree endpoint is unusable the scraper degrades
//! to the generic search-term strategy instead of failing the chain.

pub mod tree;
pub mod types;

use std::collections::HashSet;

use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use reqwest::Client;

use canasta_core::{sale_fields, ChainConfig, ScrapedOffer};

use crate::client::{build_http_client, check_status, courtesy_delay, ScrapePolicy};
use crate::error::ScraperError;
use crate::retry::retry_with_backoff;
use crate::terms::SEARCH_TERMS;

use tree::{
    category_in_scope, page_windows, parse_resources_total, plan_category, CategoryPlan, PAGE_SIZE,
};
use types::{CategoryNode, VtexProduct};

/// Depth requested from the category tree endpoint.
const TREE_DEPTH: u8 = 3;

/// Page cap per term on the degraded search-term path (3 × 50 per term).
const FALLBACK_TERM_PAGES: u32 = 3;

pub struct VtexScraper {
    client: Client,
    policy: ScrapePolicy,
    chain: String,
    base_url: String,
}

impl VtexScraper {
    /// Creates a scraper for one VTEX chain.
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
                reason: "vtex backend requires base_url".to_owned(),
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

    /// Scrapes the chain's grocery catalog, best-effort.
    ///
    /// Failures below the chain level (one category, one page, one term) are
    /// logged and skipped; the method itself never fails — an unusable
    /// category tree degrades to the search-term fallback.
    pub async fn scrape(&self) -> Vec<ScrapedOffer> {
        let roots = match self.fetch_category_tree().await {
            Ok(tree) => tree,
            Err(e) => {
                tracing::warn!(
                    chain = %self.chain,
                    error = %e,
                    "category tree unavailable — falling back to search terms"
                );
                return self.scrape_by_search_terms().await;
            }
        };

        let in_scope: Vec<CategoryNode> = roots
            .into_iter()
            .filter(|node| category_in_scope(&node.name))
            .collect();

        tracing::info!(
            chain = %self.chain,
            categories = in_scope.len(),
            "walking category tree"
        );

        let mut offers = Vec::new();
        let mut seen = HashSet::new();
        let mut worklist: Vec<CategoryNode> = in_scope;

        while let Some(node) = worklist.pop() {
            courtesy_delay(self.policy.category_delay_ms).await;

            let total = match self.fetch_category_count(node.id).await {
                Ok(total) => total,
                Err(e) => {
                    tracing::warn!(
                        chain = %self.chain,
                        category = %node.name,
                        error = %e,
                        "skipping category — count probe failed"
                    );
                    continue;
                }
            };

            match plan_category(total, &node) {
                CategoryPlan::Skip => {}
                CategoryPlan::Paginate { limit } => {
                    self.paginate_category(&node, limit, &mut seen, &mut offers)
                        .await;
                }
                CategoryPlan::Recurse => {
                    tracing::debug!(
                        chain = %self.chain,
                        category = %node.name,
                        total,
                        children = node.children.len(),
                        "category exceeds pagination ceiling — descending into children"
                    );
                    worklist.extend(node.children);
                }
            }
        }

        tracing::info!(
            chain = %self.chain,
            offers = offers.len(),
            "vtex scrape finished"
        );
        offers
    }

    /// Paginates one category; a page failure abandons the remaining pages of
    /// that category only.
    async fn paginate_category(
        &self,
        node: &CategoryNode,
        limit: u32,
        seen: &mut HashSet<String>,
        offers: &mut Vec<ScrapedOffer>,
    ) {
        for (idx, (from, to)) in page_windows(limit).into_iter().enumerate() {
            if idx > 0 {
                courtesy_delay(self.policy.category_delay_ms).await;
            }

            match self.fetch_category_page(node.id, from, to).await {
                Ok(products) => self.collect_offers(products, seen, offers),
                Err(e) => {
                    tracing::warn!(
                        chain = %self.chain,
                        category = %node.name,
                        from,
                        to,
                        error = %e,
                        "abandoning category after page failure"
                    );
                    return;
                }
            }
        }
    }

    /// Degraded path: iterate the curated search terms against the search
    /// API, up to [`FALLBACK_TERM_PAGES`] pages per term.
    async fn scrape_by_search_terms(&self) -> Vec<ScrapedOffer> {
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
            let result = self.paginate_search_term(term, &mut seen, &mut offers).await;
            if let Err(e) = result {
                tracing::warn!(
                    chain = %self.chain,
                    term,
                    error = %e,
                    "skipping search term"
                );
            }
            courtesy_delay(self.policy.term_delay_ms).await;
        }

        tracing::info!(
            chain = %self.chain,
            offers = offers.len(),
            "vtex search-term scrape finished"
        );
        offers
    }

    async fn paginate_search_term(
        &self,
        term: &str,
        seen: &mut HashSet<String>,
        offers: &mut Vec<ScrapedOffer>,
    ) -> Result<(), ScraperError> {
        for page in 0..FALLBACK_TERM_PAGES {
            if page > 0 {
                courtesy_delay(self.policy.term_delay_ms).await;
            }

            let from = page * PAGE_SIZE;
            let to = from + PAGE_SIZE - 1;
            let products = self.fetch_search_page(term, from, to).await?;
            let page_len = products.len();

            let before = offers.len();
            self.collect_offers(products, seen, offers);

            // Short page: no more data. All-duplicates page: deeper pages
            // would only repeat what a broader term already returned.
            if page_len < PAGE_SIZE as usize || offers.len() == before {
                break;
            }
        }
        Ok(())
    }

    async fn fetch_category_tree(&self) -> Result<Vec<CategoryNode>, ScraperError> {
        let url = format!(
            "{}/api/catalog_system/pub/category/tree/{TREE_DEPTH}",
            self.base_url
        );
        retry_with_backoff(self.policy.max_retries, self.policy.backoff_base_ms, || {
            let url = url.clone();
            async move {
                let response = self.client.get(&url).send().await?;
                check_status(&url, &response)?;
                let body = response.text().await?;
                serde_json::from_str::<Vec<CategoryNode>>(&body).map_err(|e| {
                    ScraperError::Deserialize {
                        context: format!("category tree from {url}"),
                        source: e,
                    }
                })
            }
        })
        .await
    }

    /// Probes a category's total product count via the `resources` header of
    /// a zero-width search window.
    async fn fetch_category_count(&self, category_id: i64) -> Result<u32, ScraperError> {
        let url = format!(
            "{}/api/catalog_system/pub/products/search?fq=C:{category_id}&_from=0&_to=0",
            self.base_url
        );
        retry_with_backoff(self.policy.max_retries, self.policy.backoff_base_ms, || {
            let url = url.clone();
            async move {
                let response = self.client.get(&url).send().await?;
                check_status(&url, &response)?;
                response
                    .headers()
                    .get("resources")
                    .and_then(|v| v.to_str().ok())
                    .and_then(parse_resources_total)
                    .ok_or(ScraperError::MissingHeader {
                        header: "resources",
                        url,
                    })
            }
        })
        .await
    }

    async fn fetch_category_page(
        &self,
        category_id: i64,
        from: u32,
        to: u32,
    ) -> Result<Vec<VtexProduct>, ScraperError> {
        let url = format!(
            "{}/api/catalog_system/pub/products/search?fq=C:{category_id}&_from={from}&_to={to}",
            self.base_url
        );
        self.fetch_products(url).await
    }

    async fn fetch_search_page(
        &self,
        term: &str,
        from: u32,
        to: u32,
    ) -> Result<Vec<VtexProduct>, ScraperError> {
        let encoded = utf8_percent_encode(term, NON_ALPHANUMERIC);
        let url = format!(
            "{}/api/catalog_system/pub/products/search/{encoded}?_from={from}&_to={to}",
            self.base_url
        );
        self.fetch_products(url).await
    }

    async fn fetch_products(&self, url: String) -> Result<Vec<VtexProduct>, ScraperError> {
        retry_with_backoff(self.policy.max_retries, self.policy.backoff_base_ms, || {
            let url = url.clone();
            async move {
                let response = self.client.get(&url).send().await?;
                check_status(&url, &response)?;
                let body = response.text().await?;
                serde_json::from_str::<Vec<VtexProduct>>(&body).map_err(|e| {
                    ScraperError::Deserialize {
                        context: format!("products from {url}"),
                        source: e,
                    }
                })
            }
        })
        .await
    }

    /// Applies the uniform parsing rules and the per-run `(ean, price)` dedup.
    fn collect_offers(
        &self,
        products: Vec<VtexProduct>,
        seen: &mut HashSet<String>,
        offers: &mut Vec<ScrapedOffer>,
    ) {
        for product in products {
            for item in product.items {
                let Some(offer) = item.sellers.first().and_then(|s| s.commertial_offer.as_ref())
                else {
                    continue;
                };

                if offer.price <= 0.0 || item.ean.is_empty() {
                    continue;
                }

                let key = format!("{}-{}", item.ean, offer.price);
                if !seen.insert(key) {
                    continue;
                }

                let (is_on_sale, sale_percentage) = sale_fields(offer.price, offer.list_price);
                offers.push(ScrapedOffer {
                    external_id: item.ean.clone(),
                    name: product.product_name.clone(),
                    brand: product.brand.clone(),
                    price: offer.price,
                    list_price: offer.list_price,
                    is_available: offer.is_available && offer.available_quantity > 0,
                    is_on_sale,
                    sale_percentage,
                    image_url: item
                        .images
                        .first()
                        .map(|i| i.image_url.clone())
                        .unwrap_or_default(),
                    product_url: if product.link.is_empty() {
                        String::new()
                    } else {
                        format!("{}{}", self.base_url, product.link)
                    },
                });
            }
        }
    }
}
