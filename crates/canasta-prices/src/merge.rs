//! The cross-source price merge: crowdsourced reports and scraped snapshots
//! for one product become a single confidence-scored, price-sorted list.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::PgPool;

use canasta_db::{ReportWithStore, SnapshotWithStore};

use crate::PricesError;

/// Fixed confidence for scraped snapshots: trusted more than an unconfirmed
/// manual report, less than a heavily confirmed one.
const SCRAPED_CONFIDENCE: u8 = 90;

/// How many recent reports feed the merge per product.
const REPORT_LIMIT: i64 = 20;

/// Labels shown when a price's store reference no longer resolves — the
/// entry stays visible rather than being dropped.
const PLACEHOLDER_STORE: &str = "Unknown store";
const PLACEHOLDER_ONLINE_STORE: &str = "Online store";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceSource {
    Crowdsourced,
    Scraped,
}

/// One entry of the merged per-product price list.
#[derive(Debug, Clone, Serialize)]
pub struct MergedPriceEntry {
    pub store_id: i64,
    pub store_name: String,
    pub store_type: String,
    pub price: Decimal,
    /// `price / unit_size`, when the catalog product declares a unit size.
    pub price_per_unit: Option<Decimal>,
    pub is_on_sale: bool,
    pub source: PriceSource,
    pub reported_at: DateTime<Utc>,
    /// 0–100 trust score; see [`report_confidence`].
    pub confidence: u8,
}

/// Maps confirmation/dispute counts to a crowdsourced entry's confidence.
#[must_use]
pub fn report_confidence(confirmations: i32, disputes: i32) -> u8 {
    if confirmations >= 3 && disputes == 0 {
        return 95;
    }
    if confirmations >= 2 {
        return 80;
    }
    if confirmations >= 1 {
        return 60;
    }
    if disputes > 0 {
        return 30;
    }
    // Freshly submitted, unconfirmed.
    50
}

/// Builds the merged list from already-fetched rows. Pure; the async service
/// wraps it with the two concurrent reads.
///
/// Reports map in before snapshots, and the ascending price sort is stable,
/// so equal prices keep that source order.
#[must_use]
pub fn merge_entries(
    reports: Vec<ReportWithStore>,
    snapshots: Vec<SnapshotWithStore>,
    unit_size: Option<Decimal>,
) -> Vec<MergedPriceEntry> {
    let mut entries: Vec<MergedPriceEntry> =
        Vec::with_capacity(reports.len() + snapshots.len());

    for report in reports {
        entries.push(MergedPriceEntry {
            store_id: report.store_id,
            store_name: report
                .store_name
                .unwrap_or_else(|| PLACEHOLDER_STORE.to_owned()),
            store_type: report.store_type.unwrap_or_else(|| "bodega".to_owned()),
            price: report.price,
            price_per_unit: per_unit(report.price, unit_size),
            is_on_sale: report.is_on_sale,
            source: PriceSource::Crowdsourced,
            reported_at: report.created_at,
            confidence: report_confidence(report.confirmations, report.disputes),
        });
    }

    for snapshot in snapshots {
        entries.push(MergedPriceEntry {
            store_id: snapshot.store_id,
            store_name: snapshot
                .store_name
                .unwrap_or_else(|| PLACEHOLDER_ONLINE_STORE.to_owned()),
            store_type: snapshot.store_type.unwrap_or_else(|| "online".to_owned()),
            price: snapshot.price,
            price_per_unit: per_unit(snapshot.price, unit_size),
            is_on_sale: snapshot.is_on_sale,
            source: PriceSource::Scraped,
            reported_at: snapshot.scraped_at,
            confidence: SCRAPED_CONFIDENCE,
        });
    }

    entries.sort_by(|a, b| a.price.cmp(&b.price));
    entries
}

fn per_unit(price: Decimal, unit_size: Option<Decimal>) -> Option<Decimal> {
    let size = unit_size.filter(|s| !s.is_zero())?;
    Some((price / size).round_dp(2))
}

/// Returns the merged, price-sorted list for one product.
///
/// Active reports and latest snapshots are fetched concurrently; a product
/// with no sources yields an empty list, never an error.
///
/// # Errors
///
/// Returns [`PricesError::Db`] if any read fails.
pub async fn prices_for_product(
    pool: &PgPool,
    product_id: i64,
) -> Result<Vec<MergedPriceEntry>, PricesError> {
    let (reports, snapshots, product) = tokio::try_join!(
        canasta_db::active_reports_for_product(pool, product_id, REPORT_LIMIT),
        canasta_db::latest_snapshots_for_product(pool, product_id),
        canasta_db::find_product_by_id(pool, product_id),
    )?;

    let unit_size = product.and_then(|p| p.unit_size);
    Ok(merge_entries(reports, snapshots, unit_size))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().expect("invalid decimal literal")
    }

    fn report(store_id: i64, price: &str, confirmations: i32, disputes: i32) -> ReportWithStore {
        ReportWithStore {
            id: store_id * 100,
            product_id: 1,
            store_id,
            price: dec(price),
            is_on_sale: false,
            confirmations,
            disputes,
            created_at: Utc::now(),
            store_name: Some(format!("Bodega {store_id}")),
            store_type: Some("bodega".to_owned()),
        }
    }

    fn snapshot(store_id: i64, price: &str) -> SnapshotWithStore {
        SnapshotWithStore {
            id: store_id * 200,
            product_id: 1,
            store_id,
            price: dec(price),
            is_on_sale: false,
            scraped_at: Utc::now(),
            store_name: Some(format!("Online {store_id}")),
            store_type: Some("online".to_owned()),
        }
    }

    #[test]
    fn confidence_mapping_matches_the_trust_ladder() {
        assert_eq!(report_confidence(3, 0), 95);
        assert_eq!(report_confidence(4, 0), 95);
        assert_eq!(report_confidence(3, 1), 80, "a dispute blocks the top tier");
        assert_eq!(report_confidence(2, 0), 80);
        assert_eq!(report_confidence(1, 0), 60);
        assert_eq!(report_confidence(0, 1), 30);
        assert_eq!(report_confidence(0, 0), 50);
    }

    #[test]
    fn scraped_entries_carry_fixed_confidence() {
        let entries = merge_entries(vec![], vec![snapshot(1, "4.50")], None);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].confidence, 90);
        assert_eq!(entries[0].source, PriceSource::Scraped);
    }

    #[test]
    fn sorts_ascending_and_keeps_equal_prices_in_source_order() {
        // Prices [12.0, 8.5] from reports and [8.5, 15.0] from snapshots:
        // the two 8.5 entries must end up adjacent with the report first.
        let entries = merge_entries(
            vec![report(1, "12.00", 0, 0), report(2, "8.50", 0, 0)],
            vec![snapshot(3, "8.50"), snapshot(4, "15.00")],
            None,
        );

        let prices: Vec<Decimal> = entries.iter().map(|e| e.price).collect();
        assert_eq!(
            prices,
            vec![dec("8.50"), dec("8.50"), dec("12.00"), dec("15.00")]
        );
        assert_eq!(entries[0].source, PriceSource::Crowdsourced);
        assert_eq!(entries[0].store_id, 2);
        assert_eq!(entries[1].source, PriceSource::Scraped);
        assert_eq!(entries[1].store_id, 3);
    }

    #[test]
    fn missing_store_references_fall_back_to_placeholders() {
        let mut orphan_report = report(1, "3.00", 0, 0);
        orphan_report.store_name = None;
        orphan_report.store_type = None;

        let mut orphan_snapshot = snapshot(2, "4.00");
        orphan_snapshot.store_name = None;
        orphan_snapshot.store_type = None;

        let entries = merge_entries(vec![orphan_report], vec![orphan_snapshot], None);

        assert_eq!(entries[0].store_name, "Unknown store");
        assert_eq!(entries[0].store_type, "bodega");
        assert_eq!(entries[1].store_name, "Online store");
        assert_eq!(entries[1].store_type, "online");
    }

    #[test]
    fn per_unit_price_derives_from_unit_size() {
        let entries = merge_entries(vec![], vec![snapshot(1, "9.00")], Some(dec("0.400")));
        assert_eq!(entries[0].price_per_unit, Some(dec("22.50")));

        let no_size = merge_entries(vec![], vec![snapshot(1, "9.00")], None);
        assert!(no_size[0].price_per_unit.is_none());

        let zero_size = merge_entries(vec![], vec![snapshot(1, "9.00")], Some(Decimal::ZERO));
        assert!(zero_size[0].price_per_unit.is_none());
    }

    #[test]
    fn merged_entry_serializes_with_lowercase_source_tag() {
        let entries = merge_entries(vec![report(1, "5.00", 1, 0)], vec![], None);
        let json = serde_json::to_string(&entries[0]).expect("serialize");
        assert!(json.contains("\"source\":\"crowdsourced\""));
        assert!(json.contains("\"confidence\":60"));
    }
}
