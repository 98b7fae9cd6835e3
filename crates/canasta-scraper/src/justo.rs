//! Scraper for chains on the Justo commerce platform (Tambo).
//!
//! Justo exposes no browsable category tree, so this backend runs the
//! search-term strategy against the platform's GraphQL product search,
//! deduplicating by the product's internal id within the run.

use std::collections::HashSet;

use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use canasta_core::{sale_fields, ChainConfig, ScrapedOffer};

use crate::client::{build_http_client, check_status, courtesy_delay, ScrapePolicy};
use crate::error::ScraperError;
use crate::retry::retry_with_backoff;
use crate::terms::SEARCH_TERMS;

const PRODUCTS_QUERY: &str = "\
query SearchProducts($websiteId: ID!, $menuId: ID!, $filter: String) {\n\
  products(websiteId: $websiteId, menuId: $menuId, filter: $filter) {\n\
    totalCount\n\
    items {\n\
      _id\n\
      name\n\
      image { url }\n\
      availability { basePrice finalPrice }\n\
    }\n\
  }\n\
}";

#[derive(Debug, Deserialize)]
struct GraphqlResponse {
    data: Option<ProductsData>,
}

#[derive(Debug, Deserialize)]
struct ProductsData {
    products: Option<ProductsPage>,
}

#[derive(Debug, Deserialize)]
struct ProductsPage {
    #[serde(default)]
    items: Vec<JustoProduct>,
}

#[derive(Debug, Deserialize)]
struct JustoProduct {
    #[serde(rename = "_id")]
    id: String,
    #[serde(default)]
    name: String,
    image: Option<JustoImage>,
    #[serde(default)]
    availability: Vec<JustoAvailability>,
}

#[derive(Debug, Deserialize)]
struct JustoImage {
    #[serde(default)]
    url: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JustoAvailability {
    #[serde(default)]
    base_price: f64,
    #[serde(default)]
    final_price: f64,
}

pub struct JustoScraper {
    client: Client,
    policy: ScrapePolicy,
    chain: String,
    label: String,
    graphql_url: String,
    website_id: String,
    menu_id: String,
}

impl JustoScraper {
    /// Creates a scraper for one Justo-backed chain.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::InvalidChainConfig`] if `graphql_url`,
    /// `website_id` or `menu_id` is missing, or [`ScraperError::Http`] if the
    /// HTTP client cannot be built.
    pub fn new(policy: &ScrapePolicy, chain: &ChainConfig) -> Result<Self, ScraperError> {
        let missing = |field: &str| ScraperError::InvalidChainConfig {
            chain: chain.slug.clone(),
            reason: format!("justo backend requires {field}"),
        };

        Ok(Self {
            client: build_http_client(policy)?,
            policy: policy.clone(),
            chain: chain.slug.clone(),
            label: chain.label.clone(),
            graphql_url: chain
                .graphql_url
                .clone()
                .ok_or_else(|| missing("graphql_url"))?,
            website_id: chain
                .website_id
                .clone()
                .ok_or_else(|| missing("website_id"))?,
            menu_id: chain.menu_id.clone().ok_or_else(|| missing("menu_id"))?,
        })
    }

    /// Scrapes the chain's catalog through the curated search terms,
    /// best-effort. Failed terms are logged and skipped.
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
            match self.search_products(term).await {
                Ok(products) => {
                    for product in products {
                        if seen.insert(product.id.clone()) {
                            if let Some(offer) = self.parse_product(product) {
                                offers.push(offer);
                            }
                        }
                    }
                }
                Err(e) => {
                    tracing::warn!(chain = %self.chain, term, error = %e, "skipping search term");
                }
            }
            courtesy_delay(self.policy.term_delay_ms).await;
        }

        tracing::info!(chain = %self.chain, offers = offers.len(), "justo scrape finished");
        offers
    }

    async fn search_products(&self, filter: &str) -> Result<Vec<JustoProduct>, ScraperError> {
        let body = json!({
            "query": PRODUCTS_QUERY,
            "variables": {
                "websiteId": self.website_id,
                "menuId": self.menu_id,
                "filter": filter,
            },
        });

        retry_with_backoff(self.policy.max_retries, self.policy.backoff_base_ms, || {
            let body = body.clone();
            async move {
                let response = self.client.post(&self.graphql_url).json(&body).send().await?;
                check_status(&self.graphql_url, &response)?;
                let text = response.text().await?;
                let parsed: GraphqlResponse =
                    serde_json::from_str(&text).map_err(|e| ScraperError::Deserialize {
                        context: format!("justo search for \"{filter}\""),
                        source: e,
                    })?;
                Ok(parsed
                    .data
                    .and_then(|d| d.products)
                    .map(|p| p.items)
                    .unwrap_or_default())
            }
        })
        .await
    }

    /// First availability entry with a positive final price becomes the
    /// offer; products without one are discarded.
    fn parse_product(&self, product: JustoProduct) -> Option<ScrapedOffer> {
        let avail = product.availability.iter().find(|a| a.final_price > 0.0)?;

        let price = avail.final_price;
        let list_price = avail.base_price;
        let (is_on_sale, sale_percentage) = sale_fields(price, list_price);

        Some(ScrapedOffer {
            // Justo exposes internal ids, not barcodes.
            external_id: product.id,
            name: product.name,
            brand: self.label.clone(),
            price,
            list_price,
            is_available: true,
            is_on_sale,
            sale_percentage,
            image_url: product.image.map(|i| i.url).unwrap_or_default(),
            product_url: String::new(),
        })
    }
}
