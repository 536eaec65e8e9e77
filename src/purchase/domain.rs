//! Core purchase domain types.

use std::fmt::Display;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::product::ProductId;

/// Database identifier for a purchase.
pub type PurchaseId = i64;

/// The lifecycle state of a purchase.
///
/// A purchase starts out [PurchaseStatus::Paid] and can move to
/// [PurchaseStatus::Canceled] exactly once. There are no other transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PurchaseStatus {
    Paid,
    Canceled,
}

impl PurchaseStatus {
    /// The exact text stored in the database for this status.
    pub fn as_str(self) -> &'static str {
        match self {
            PurchaseStatus::Paid => "PAID",
            PurchaseStatus::Canceled => "CANCELED",
        }
    }

    /// Parse the text representation used in the database and in query strings.
    ///
    /// Returns [None] for any other text.
    pub fn from_text(text: &str) -> Option<Self> {
        match text {
            "PAID" => Some(PurchaseStatus::Paid),
            "CANCELED" => Some(PurchaseStatus::Canceled),
            _ => None,
        }
    }
}

impl Display for PurchaseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A sale of a product that deducted stock at the time it was recorded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Purchase {
    /// The ID of the purchase.
    pub id: PurchaseId,
    /// The ID of the product that was sold.
    pub product_id: ProductId,
    /// How many units were sold.
    pub qty: i64,
    /// The unit price at the time of sale.
    ///
    /// This is a snapshot of the product price, so later price changes do not
    /// rewrite the history of past purchases.
    pub price_each: i64,
    /// The total charged, always `qty * price_each`.
    pub total_price: i64,
    /// Whether the purchase is still paid or has been canceled.
    pub status: PurchaseStatus,
    /// When the purchase was recorded, in UTC.
    pub created_at: OffsetDateTime,
    /// When the purchase was canceled, in UTC. `None` while the purchase is paid.
    pub canceled_at: Option<OffsetDateTime>,
    /// Who canceled the purchase. `None` while the purchase is paid.
    pub canceled_by: Option<String>,
}

/// A purchase joined with the name and SKU of its product for display.
#[derive(Debug, Clone, PartialEq)]
pub struct PurchaseWithProduct {
    pub purchase: Purchase,
    pub product_name: String,
    pub product_sku: String,
}

/// Filters applied to the purchase listing.
///
/// Both filters are optional and combined with AND when both are set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PurchaseFilter {
    /// Only include purchases with this status.
    pub status: Option<PurchaseStatus>,
    /// Only include purchases whose product name or SKU contains this text,
    /// compared case-insensitively.
    pub search: Option<String>,
}

/// Form data for recording a purchase.
#[derive(Debug, Serialize, Deserialize)]
pub struct NewPurchaseForm {
    pub product_id: ProductId,
    /// Kept as text so non-numeric input reaches the quantity validation
    /// instead of failing form extraction.
    pub quantity: String,
}
