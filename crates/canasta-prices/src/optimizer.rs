//! Per-store shopping-list totals over the merged price lists.
//!
//! Greedy per-item-per-store minimum: each store is priced as if the shopper
//! bought every item it stocks at that store's cheapest offer and accepted
//! the missing items. Cross-store splitting is deliberately not computed.

use std::collections::BTreeMap;

use futures::future::try_join_all;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::merge::{prices_for_product, MergedPriceEntry};
use crate::PricesError;

/// One shopping-list line.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ListItem {
    pub product_id: i64,
    pub quantity: u32,
}

/// The cheapest achievable subtotal for the list at one store.
#[derive(Debug, Clone, Serialize)]
pub struct StoreTotal {
    pub store_id: i64,
    pub store_name: String,
    pub store_type: String,
    pub total: Decimal,
    /// How many list items this store can supply.
    pub item_count: u32,
    /// Product ids the store has no price for.
    pub missing_product_ids: Vec<i64>,
}

struct StoreAccumulator {
    store_name: String,
    store_type: String,
    total: Decimal,
    covered: Vec<i64>,
}

/// Builds the ranked totals from already-merged per-item price lists. Pure;
/// `prices[i]` must be the merged list for `items[i]`.
///
/// Within one item, the first entry seen per store is kept — the merged list
/// is sorted ascending with stable ties, so that entry is the store's
/// cheapest offer and ties resolve in merge order. Stores covering zero
/// items never appear. Output is sorted ascending by total: a cheap store
/// missing items ranks above an expensive complete one.
#[must_use]
pub fn totals_from_prices(items: &[ListItem], prices: &[Vec<MergedPriceEntry>]) -> Vec<StoreTotal> {
    let mut stores: BTreeMap<i64, StoreAccumulator> = BTreeMap::new();

    for (item, merged) in items.iter().zip(prices) {
        let mut cheapest_by_store: BTreeMap<i64, &MergedPriceEntry> = BTreeMap::new();
        for entry in merged {
            cheapest_by_store.entry(entry.store_id).or_insert(entry);
        }

        for (store_id, entry) in cheapest_by_store {
            let acc = stores.entry(store_id).or_insert_with(|| StoreAccumulator {
                store_name: entry.store_name.clone(),
                store_type: entry.store_type.clone(),
                total: Decimal::ZERO,
                covered: Vec::new(),
            });
            acc.total += entry.price * Decimal::from(item.quantity);
            acc.covered.push(item.product_id);
        }
    }

    let all_ids: Vec<i64> = items.iter().map(|i| i.product_id).collect();

    let mut totals: Vec<StoreTotal> = stores
        .into_iter()
        .map(|(store_id, acc)| {
            let missing_product_ids: Vec<i64> = all_ids
                .iter()
                .copied()
                .filter(|id| !acc.covered.contains(id))
                .collect();
            #[allow(clippy::cast_possible_truncation)]
            let item_count = acc.covered.len() as u32;
            StoreTotal {
                store_id,
                store_name: acc.store_name,
                store_type: acc.store_type,
                total: acc.total.round_dp(2),
                item_count,
                missing_product_ids,
            }
        })
        .collect();

    totals.sort_by(|a, b| a.total.cmp(&b.total));
    totals
}

/// Computes per-store totals for a shopping list.
///
/// Merged price lists for all items are fetched concurrently; an empty list
/// yields an empty result.
///
/// # Errors
///
/// Returns [`PricesError::Db`] if any per-item read fails.
pub async fn store_totals(
    pool: &PgPool,
    items: &[ListItem],
) -> Result<Vec<StoreTotal>, PricesError> {
    if items.is_empty() {
        return Ok(Vec::new());
    }

    let prices = try_join_all(
        items
            .iter()
            .map(|item| prices_for_product(pool, item.product_id)),
    )
    .await?;

    Ok(totals_from_prices(items, &prices))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::merge::PriceSource;
    use chrono::Utc;

    fn dec(s: &str) -> Decimal {
        s.parse().expect("invalid decimal literal")
    }

    fn entry(store_id: i64, price: &str) -> MergedPriceEntry {
        MergedPriceEntry {
            store_id,
            store_name: format!("Store {store_id}"),
            store_type: "supermercado".to_owned(),
            price: dec(price),
            price_per_unit: None,
            is_on_sale: false,
            source: PriceSource::Scraped,
            reported_at: Utc::now(),
            confidence: 90,
        }
    }

    fn item(product_id: i64, quantity: u32) -> ListItem {
        ListItem {
            product_id,
            quantity,
        }
    }

    #[test]
    fn ranks_purely_by_ascending_total_even_with_missing_items() {
        // Store A stocks items 1,2 at [3.00, 4.00]; Store B stocks all three
        // at [3.50, 4.50, 2.00]. A totals 7.00 with item 3 missing and must
        // rank first — the ordering is by total alone, not coverage.
        let items = [item(1, 1), item(2, 1), item(3, 1)];
        let prices = vec![
            vec![entry(1, "3.00"), entry(2, "3.50")],
            vec![entry(1, "4.00"), entry(2, "4.50")],
            vec![entry(2, "2.00")],
        ];

        let totals = totals_from_prices(&items, &prices);
        assert_eq!(totals.len(), 2);

        assert_eq!(totals[0].store_id, 1);
        assert_eq!(totals[0].total, dec("7.00"));
        assert_eq!(totals[0].item_count, 2);
        assert_eq!(totals[0].missing_product_ids, vec![3]);

        assert_eq!(totals[1].store_id, 2);
        assert_eq!(totals[1].total, dec("10.00"));
        assert_eq!(totals[1].item_count, 3);
        assert!(totals[1].missing_product_ids.is_empty());
    }

    #[test]
    fn takes_the_cheapest_entry_per_store_per_item() {
        // Two offers from store 1 for the same item (a report and a scrape):
        // the merged list is sorted ascending, so the first wins.
        let items = [item(1, 1)];
        let prices = vec![vec![entry(1, "3.20"), entry(1, "3.80"), entry(2, "3.50")]];

        let totals = totals_from_prices(&items, &prices);
        assert_eq!(totals[0].store_id, 1);
        assert_eq!(totals[0].total, dec("3.20"));
        assert_eq!(totals[1].total, dec("3.50"));
    }

    #[test]
    fn quantities_multiply_the_cheapest_price() {
        let items = [item(1, 3), item(2, 2)];
        let prices = vec![vec![entry(1, "2.50")], vec![entry(1, "4.00")]];

        let totals = totals_from_prices(&items, &prices);
        assert_eq!(totals.len(), 1);
        assert_eq!(totals[0].total, dec("15.50"), "3×2.50 + 2×4.00");
        assert_eq!(totals[0].item_count, 2);
    }

    #[test]
    fn stores_with_zero_coverage_are_omitted_entirely() {
        let items = [item(1, 1), item(2, 1)];
        // Store 9 never appears in any item's price list.
        let prices = vec![vec![entry(1, "2.00")], vec![entry(1, "3.00")]];

        let totals = totals_from_prices(&items, &prices);
        assert_eq!(totals.len(), 1);
        assert_eq!(totals[0].store_id, 1);
    }

    #[test]
    fn empty_list_produces_no_totals() {
        assert!(totals_from_prices(&[], &[]).is_empty());
    }
}
