//! Purchase recording, listing, and cancellation.

mod cancel;
mod create;
mod db;
mod domain;
mod list;

pub use cancel::cancel_purchase_endpoint;
pub use create::{create_purchase_endpoint, get_new_purchase_page};
pub use db::{
    cancel_purchase, count_purchases, create_purchase_table, get_paid_revenue, get_purchase,
    get_purchases, record_purchase,
};
pub use domain::{Purchase, PurchaseFilter, PurchaseId, PurchaseStatus, PurchaseWithProduct};
pub use list::get_purchases_page;
