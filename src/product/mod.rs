//! The product catalogue and its stock levels.

mod db;
mod domain;
mod list;

pub use db::{
    count_products, create_product_table, create_stock_table, get_all_products_with_stock,
    get_product_with_stock, get_products_by_name, get_total_stock, seed_default_products,
};
pub use domain::{Product, ProductId, ProductWithStock};
pub use list::get_products_page;
