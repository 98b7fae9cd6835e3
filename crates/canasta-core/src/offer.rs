//! The transient offer record produced by every scraper backend.

use serde::{Deserialize, Serialize};

/// One priced product observed on a retailer's site during a scrape run.
///
/// Offers are producer-side only: the ingestion layer turns each one into a
/// price snapshot and (if needed) a new catalog product. `price` and
/// `list_price` are scrape-time `f64` convenience values; persistence
/// converts them to `NUMERIC(10,2)` in the DB layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapedOffer {
    /// Barcode (EAN) where the platform exposes one, otherwise the
    /// platform-internal catalog id. Used as the cross-source product key.
    pub external_id: String,
    pub name: String,
    pub brand: String,
    pub price: f64,
    /// Strike-through price; equals `price` when no sale is active.
    pub list_price: f64,
    pub is_available: bool,
    pub is_on_sale: bool,
    pub sale_percentage: i32,
    pub image_url: String,
    pub product_url: String,
}

impl ScrapedOffer {
    /// Returns `true` if the offer carries enough data to be ingested:
    /// a positive price and a non-empty external id.
    #[must_use]
    pub fn is_usable(&self) -> bool {
        self.price > 0.0 && !self.external_id.is_empty()
    }
}

/// Derives the sale flag and rounded discount percentage from a price pair.
///
/// An offer is on sale when the list price is strictly above the selling
/// price and the selling price is positive. The percentage is rounded to the
/// nearest integer; off-sale offers report 0.
#[must_use]
pub fn sale_fields(price: f64, list_price: f64) -> (bool, i32) {
    let is_on_sale = list_price > price && price > 0.0;
    if !is_on_sale {
        return (false, 0);
    }
    #[allow(clippy::cast_possible_truncation)]
    let pct = ((list_price - price) / list_price * 100.0).round() as i32;
    (true, pct)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offer(external_id: &str, price: f64) -> ScrapedOffer {
        let (is_on_sale, sale_percentage) = sale_fields(price, price);
        ScrapedOffer {
            external_id: external_id.to_string(),
            name: "Leche Gloria Entera 400g".to_string(),
            brand: "Gloria".to_string(),
            price,
            list_price: price,
            is_available: true,
            is_on_sale,
            sale_percentage,
            image_url: String::new(),
            product_url: String::new(),
        }
    }

    #[test]
    fn sale_fields_off_sale_when_prices_equal() {
        assert_eq!(sale_fields(4.50, 4.50), (false, 0));
    }

    #[test]
    fn sale_fields_off_sale_when_list_price_lower() {
        assert_eq!(sale_fields(5.00, 4.00), (false, 0));
    }

    #[test]
    fn sale_fields_off_sale_when_price_not_positive() {
        assert_eq!(sale_fields(0.0, 10.0), (false, 0));
    }

    #[test]
    fn sale_fields_rounds_percentage() {
        // (12 - 9) / 12 = 25%
        assert_eq!(sale_fields(9.0, 12.0), (true, 25));
        // (10 - 6.7) / 10 = 33%
        assert_eq!(sale_fields(6.7, 10.0), (true, 33));
    }

    #[test]
    fn usable_requires_positive_price() {
        assert!(offer("7751271001234", 3.20).is_usable());
        assert!(!offer("7751271001234", 0.0).is_usable());
    }

    #[test]
    fn usable_requires_external_id() {
        assert!(!offer("", 3.20).is_usable());
    }
}
