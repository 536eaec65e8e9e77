//! Database operations for products and their stock levels.

use rusqlite::{Connection, Row};

use crate::{
    Error,
    product::{Product, ProductId, ProductWithStock},
};

/// The products inserted into an empty database: (sku, name, price, starting stock).
const DEFAULT_PRODUCTS: [(&str, &str, i64, i64); 10] = [
    ("SKU-001", "Kopi Robusta 250g", 35_000, 50),
    ("SKU-002", "Kopi Arabica 250g", 55_000, 40),
    ("SKU-003", "Teh Hijau 200g", 25_000, 60),
    ("SKU-004", "Gula Aren 500g", 28_000, 45),
    ("SKU-005", "Susu Bubuk 400g", 42_000, 30),
    ("SKU-006", "Coklat Bubuk 200g", 32_000, 35),
    ("SKU-007", "Madu 250ml", 70_000, 20),
    ("SKU-008", "Biskuit Gandum", 18_000, 80),
    ("SKU-009", "Keripik Singkong", 15_000, 100),
    ("SKU-010", "Air Mineral 1.5L", 8_000, 120),
];

/// Retrieve a single product joined with its stock level.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `product_id` does not refer to a valid product,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn get_product_with_stock(
    product_id: ProductId,
    connection: &Connection,
) -> Result<ProductWithStock, Error> {
    connection
        .prepare(
            "SELECT p.id, p.sku, p.name, p.price, s.qty
             FROM products p
             JOIN stocks s ON s.product_id = p.id
             WHERE p.id = :id",
        )?
        .query_row(&[(":id", &product_id)], map_product_with_stock_row)
        .map_err(|error| error.into())
}

/// Retrieve all products with their stock levels, ordered by ID.
pub fn get_all_products_with_stock(
    connection: &Connection,
) -> Result<Vec<ProductWithStock>, Error> {
    connection
        .prepare(
            "SELECT p.id, p.sku, p.name, p.price, s.qty
             FROM products p
             JOIN stocks s ON s.product_id = p.id
             ORDER BY p.id ASC",
        )?
        .query_map([], map_product_with_stock_row)?
        .map(|maybe_product| maybe_product.map_err(|error| error.into()))
        .collect()
}

/// Retrieve all products with their stock levels, ordered alphabetically by name.
///
/// Used by the new purchase form's product selector.
pub fn get_products_by_name(connection: &Connection) -> Result<Vec<ProductWithStock>, Error> {
    connection
        .prepare(
            "SELECT p.id, p.sku, p.name, p.price, s.qty
             FROM products p
             JOIN stocks s ON s.product_id = p.id
             ORDER BY p.name ASC",
        )?
        .query_map([], map_product_with_stock_row)?
        .map(|maybe_product| maybe_product.map_err(|error| error.into()))
        .collect()
}

/// Get the total number of products in the database.
pub fn count_products(connection: &Connection) -> Result<u32, Error> {
    connection
        .query_row("SELECT COUNT(id) FROM products", [], |row| row.get(0))
        .map_err(|error| error.into())
}

/// Get the total units in stock across all products.
pub fn get_total_stock(connection: &Connection) -> Result<i64, Error> {
    connection
        .query_row("SELECT COALESCE(SUM(qty), 0) FROM stocks", [], |row| {
            row.get(0)
        })
        .map_err(|error| error.into())
}

/// Create the products table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_product_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS products (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            sku TEXT UNIQUE NOT NULL,
            name TEXT NOT NULL,
            price INTEGER NOT NULL
        );",
    )?;

    Ok(())
}

/// Create the stocks table in the database.
///
/// Each row holds the units on hand for one product. The table is keyed by
/// the product ID so a product can never have more than one stock row.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_stock_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS stocks (
            product_id INTEGER PRIMARY KEY,
            qty INTEGER NOT NULL DEFAULT 0,
            FOREIGN KEY(product_id) REFERENCES products(id) ON DELETE CASCADE
        );",
    )?;

    Ok(())
}

/// Insert the default products and their starting stock into an empty database.
///
/// Seeding only runs when the products table is empty, so calling this on
/// every start up never duplicates or resets data.
pub fn seed_default_products(connection: &Connection) -> Result<(), rusqlite::Error> {
    let product_count: i64 =
        connection.query_row("SELECT COUNT(id) FROM products", [], |row| row.get(0))?;

    if product_count > 0 {
        return Ok(());
    }

    for (sku, name, price, qty) in DEFAULT_PRODUCTS {
        connection.execute(
            "INSERT INTO products (sku, name, price) VALUES (?1, ?2, ?3)",
            (sku, name, price),
        )?;

        let product_id = connection.last_insert_rowid();

        connection.execute(
            "INSERT INTO stocks (product_id, qty) VALUES (?1, ?2)",
            (product_id, qty),
        )?;
    }

    Ok(())
}

fn map_product_with_stock_row(row: &Row) -> Result<ProductWithStock, rusqlite::Error> {
    let id = row.get(0)?;
    let sku = row.get(1)?;
    let name = row.get(2)?;
    let price = row.get(3)?;
    let qty = row.get(4)?;

    Ok(ProductWithStock {
        product: Product {
            id,
            sku,
            name,
            price,
        },
        qty,
    })
}
