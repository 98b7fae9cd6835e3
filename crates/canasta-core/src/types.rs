//! Shared domain enums for the product catalog and store directory.

use serde::{Deserialize, Serialize};

/// Product category assigned by the name-based classifier.
///
/// Stored as the lowercase string form in the `products.category` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductCategory {
    Lacteos,
    Carnes,
    FrutasVerduras,
    GranosCereales,
    Bebidas,
    Limpieza,
    Higiene,
    Panaderia,
    Enlatados,
    Aceites,
    Escolar,
}

impl ProductCategory {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ProductCategory::Lacteos => "lacteos",
            ProductCategory::Carnes => "carnes",
            ProductCategory::FrutasVerduras => "frutas_verduras",
            ProductCategory::GranosCereales => "granos_cereales",
            ProductCategory::Bebidas => "bebidas",
            ProductCategory::Limpieza => "limpieza",
            ProductCategory::Higiene => "higiene",
            ProductCategory::Panaderia => "panaderia",
            ProductCategory::Enlatados => "enlatados",
            ProductCategory::Aceites => "aceites",
            ProductCategory::Escolar => "escolar",
        }
    }
}

impl std::fmt::Display for ProductCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unit of sale for a catalog product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductUnit {
    Kg,
    G,
    Ml,
    L,
    Unidad,
    Pack,
}

impl ProductUnit {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ProductUnit::Kg => "kg",
            ProductUnit::G => "g",
            ProductUnit::Ml => "ml",
            ProductUnit::L => "l",
            ProductUnit::Unidad => "unidad",
            ProductUnit::Pack => "pack",
        }
    }
}

/// Kind of store a price was observed at.
///
/// `Online` is the synthetic storefront that scraped prices are attributed
/// to; the rest come from the physical store directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreType {
    Bodega,
    Mercado,
    Supermercado,
    Minimarket,
    Farmacia,
    Mayorista,
    Online,
}

impl StoreType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            StoreType::Bodega => "bodega",
            StoreType::Mercado => "mercado",
            StoreType::Supermercado => "supermercado",
            StoreType::Minimarket => "minimarket",
            StoreType::Farmacia => "farmacia",
            StoreType::Mayorista => "mayorista",
            StoreType::Online => "online",
        }
    }
}

impl std::fmt::Display for StoreType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
