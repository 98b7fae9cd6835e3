//! Per-offer persistence: product upsert, snapshot rotation, stats refresh.

use rust_decimal::Decimal;
use sqlx::PgPool;

use canasta_core::{categorize_product, ScrapedOffer};
use canasta_db::{NewSnapshot, ProductSeed};

use crate::IngestError;

/// How many per-offer failures are logged with full detail before the rest
/// are only counted.
const DETAILED_ERROR_SAMPLE: u64 = 3;

/// Outcome counters for one batch of offers.
#[derive(Debug, Default, Clone, Copy)]
pub struct PersistStats {
    pub persisted: i32,
    pub skipped: u64,
    pub failed: u64,
}

/// Persists one scraped offer against a store.
///
/// 1. Resolve the catalog product by barcode (upsert).
/// 2. Classify and assign a category if the product has none.
/// 3. Rotate the latest snapshot for the (product, store) pair.
/// 4. Refresh the product's rolling stats from all latest snapshots.
///
/// # Errors
///
/// Returns [`IngestError::Db`] if any persistence step fails.
pub async fn persist_offer(
    pool: &PgPool,
    store_id: i64,
    offer: &ScrapedOffer,
) -> Result<(), IngestError> {
    let Some(price) = to_price(offer.price) else {
        // Scrapers discard unusable prices; a non-representable value here
        // is treated the same way.
        return Ok(());
    };

    let seed = ProductSeed {
        name: offer.name.clone(),
        brand: non_empty(&offer.brand),
        image_url: non_empty(&offer.image_url),
    };
    let product = canasta_db::find_or_create_by_barcode(pool, &offer.external_id, &seed).await?;

    if product.category.is_none() {
        if let Some(category) = categorize_product(&offer.name) {
            canasta_db::set_category_if_unset(pool, product.id, category.as_str()).await?;
        }
    }

    canasta_db::rotate_latest_snapshot(
        pool,
        &NewSnapshot {
            product_id: product.id,
            store_id,
            price,
            is_available: offer.is_available,
            is_on_sale: offer.is_on_sale,
            sale_percentage: offer.sale_percentage,
            original_name: non_empty(&offer.name),
            original_url: non_empty(&offer.product_url),
            original_image_url: non_empty(&offer.image_url),
        },
    )
    .await?;

    canasta_db::refresh_price_stats(pool, product.id).await?;

    Ok(())
}

/// Persists a batch of offers, isolating per-offer failures.
///
/// Failed offers are counted; the first [`DETAILED_ERROR_SAMPLE`] per batch
/// are logged with detail so one malformed offer never aborts the batch or
/// floods the log.
pub async fn persist_offers(
    pool: &PgPool,
    chain: &str,
    store_id: i64,
    offers: &[ScrapedOffer],
) -> PersistStats {
    let mut stats = PersistStats::default();

    for offer in offers {
        if !offer.is_usable() {
            stats.skipped += 1;
            continue;
        }

        match persist_offer(pool, store_id, offer).await {
            Ok(()) => stats.persisted += 1,
            Err(e) => {
                stats.failed += 1;
                if stats.failed <= DETAILED_ERROR_SAMPLE {
                    tracing::warn!(
                        chain,
                        external_id = %offer.external_id,
                        error = %e,
                        "failed to persist offer"
                    );
                }
            }
        }
    }

    if stats.failed > DETAILED_ERROR_SAMPLE {
        tracing::warn!(
            chain,
            failed = stats.failed,
            "additional offer failures were counted but not logged"
        );
    }

    stats
}

/// Converts a scrape-time `f64` into the 2-decimal price stored in the DB.
fn to_price(value: f64) -> Option<Decimal> {
    Decimal::from_f64_retain(value).map(|d| d.round_dp(2))
}

fn non_empty(s: &str) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s.to_owned())
    }
}
