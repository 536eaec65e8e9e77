//! Core product domain types.

use serde::{Deserialize, Serialize};

/// Database identifier for a product.
pub type ProductId = i64;

/// An item that can be bought, e.g. 'Kopi Robusta 250g'.
///
/// Prices are stored as a whole number of the smallest currency unit.
/// Products are created once by the database seed and never modified
/// afterwards, so there is no update path for them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    /// The stock keeping unit, unique across all products.
    pub sku: String,
    pub name: String,
    /// The current unit price in the smallest currency unit.
    pub price: i64,
}

/// A product joined with the units currently in stock for it.
///
/// Every product has exactly one stock row, created alongside it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductWithStock {
    pub product: Product,
    /// The units on hand. Never negative.
    pub qty: i64,
}
