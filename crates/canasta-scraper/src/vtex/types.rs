//! VTEX catalog API response types.
//!
//! ## Observed shape from live VTEX stores (plazavea.com.pe, wong.pe)
//!
//! ### Category tree (`/api/catalog_system/pub/category/tree/{depth}`)
//! An array of nodes with numeric `id`, display `name`, `hasChildren`, and a
//! nested `children` array (empty at the requested depth limit).
//!
//! ### Product search (`/api/catalog_system/pub/products/search`)
//! An array of products; each carries `items` (SKUs), each SKU carries
//! `sellers`, and the first seller's `commertialOffer` (sic — the typo is
//! VTEX's) holds the price data. `ean` may be an empty string on produce and
//! store-brand SKUs; such offers are discarded during parsing.
//!
//! The response's `resources` header (`"start-end/total"`) carries the total
//! result count for the query and drives category subdivision.

use serde::Deserialize;

/// A node from the category tree endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryNode {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub has_children: bool,
    #[serde(default)]
    pub children: Vec<CategoryNode>,
}

/// A product from the search endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VtexProduct {
    #[serde(default)]
    pub product_name: String,
    #[serde(default)]
    pub brand: String,
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub items: Vec<VtexItem>,
}

/// A purchasable SKU of a [`VtexProduct`].
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VtexItem {
    #[serde(default)]
    pub ean: String,
    #[serde(default)]
    pub images: Vec<VtexImage>,
    #[serde(default)]
    pub sellers: Vec<VtexSeller>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VtexImage {
    #[serde(default)]
    pub image_url: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VtexSeller {
    pub commertial_offer: Option<CommertialOffer>,
}

/// Price block of a seller. Field names are VTEX's PascalCase originals.
#[derive(Debug, Clone, Deserialize)]
pub struct CommertialOffer {
    #[serde(rename = "Price", default)]
    pub price: f64,
    #[serde(rename = "ListPrice", default)]
    pub list_price: f64,
    #[serde(rename = "AvailableQuantity", default)]
    pub available_quantity: i64,
    #[serde(rename = "IsAvailable", default)]
    pub is_available: bool,
}
