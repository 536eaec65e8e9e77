//! Database operations for recording and canceling purchases.

use rusqlite::{Connection, Row};
use time::OffsetDateTime;

use crate::{
    Error,
    product::{ProductId, get_product_with_stock},
    purchase::{Purchase, PurchaseFilter, PurchaseId, PurchaseStatus, PurchaseWithProduct},
};

/// Record a paid purchase of `qty` units of a product and deduct its stock.
///
/// The product price at the time of the call is snapshotted into the purchase,
/// so later catalogue price changes leave the history of past sales untouched.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `product_id` does not refer to a valid product,
/// - or [Error::InvalidQuantity] if `qty` is zero or negative,
/// - or [Error::InsufficientStock] if fewer than `qty` units are in stock,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn record_purchase(
    product_id: ProductId,
    qty: i64,
    connection: &Connection,
) -> Result<Purchase, Error> {
    let product_with_stock = get_product_with_stock(product_id, connection)?;

    if qty <= 0 {
        return Err(Error::InvalidQuantity);
    }

    if qty > product_with_stock.qty {
        return Err(Error::InsufficientStock {
            remaining: product_with_stock.qty,
        });
    }

    let price_each = product_with_stock.product.price;
    let total_price = qty * price_each;
    let created_at = OffsetDateTime::now_utc();

    // Using unchecked_transaction because we only have &Connection from the MutexGuard.
    // This is safe because we hold the mutex lock and won't have nested transactions.
    let transaction = connection.unchecked_transaction()?;

    let purchase = transaction
        .prepare(
            "INSERT INTO purchases (product_id, qty, price_each, total_price, status, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             RETURNING id, product_id, qty, price_each, total_price, status, created_at,
                 canceled_at, canceled_by",
        )?
        .query_row(
            (
                product_id,
                qty,
                price_each,
                total_price,
                PurchaseStatus::Paid.as_str(),
                created_at,
            ),
            map_purchase_row,
        )?;

    transaction.execute(
        "UPDATE stocks SET qty = qty - ?1 WHERE product_id = ?2",
        (qty, product_id),
    )?;

    transaction.commit()?;

    Ok(purchase)
}

/// Cancel a paid purchase and return its quantity to the product's stock.
///
/// The status flip, the cancellation stamp, and the stock restore happen in
/// one transaction. The restored quantity is the one stored on the purchase,
/// not whatever the caller believes it to be.
///
/// # Errors
/// This function will return a:
/// - [Error::CancelMissingPurchase] if `purchase_id` does not refer to a valid purchase,
/// - or [Error::PurchaseAlreadyCanceled] if the purchase was canceled before,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn cancel_purchase(
    purchase_id: PurchaseId,
    canceled_by: &str,
    connection: &Connection,
) -> Result<Purchase, Error> {
    let purchase = get_purchase(purchase_id, connection).map_err(|error| match error {
        Error::NotFound => Error::CancelMissingPurchase,
        other => other,
    })?;

    if purchase.status == PurchaseStatus::Canceled {
        return Err(Error::PurchaseAlreadyCanceled);
    }

    let canceled_at = OffsetDateTime::now_utc();

    // Using unchecked_transaction because we only have &Connection from the MutexGuard.
    // This is safe because we hold the mutex lock and won't have nested transactions.
    let transaction = connection.unchecked_transaction()?;

    let canceled_purchase = transaction
        .prepare(
            "UPDATE purchases
             SET status = ?1, canceled_at = ?2, canceled_by = ?3
             WHERE id = ?4
             RETURNING id, product_id, qty, price_each, total_price, status, created_at,
                 canceled_at, canceled_by",
        )?
        .query_row(
            (
                PurchaseStatus::Canceled.as_str(),
                canceled_at,
                canceled_by,
                purchase_id,
            ),
            map_purchase_row,
        )?;

    transaction.execute(
        "UPDATE stocks SET qty = qty + ?1 WHERE product_id = ?2",
        (purchase.qty, purchase.product_id),
    )?;

    transaction.commit()?;

    Ok(canceled_purchase)
}

/// Retrieve a purchase from the database by its `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `purchase_id` does not refer to a valid purchase,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn get_purchase(purchase_id: PurchaseId, connection: &Connection) -> Result<Purchase, Error> {
    let purchase = connection
        .prepare(
            "SELECT id, product_id, qty, price_each, total_price, status, created_at,
                 canceled_at, canceled_by
             FROM purchases
             WHERE id = :id",
        )?
        .query_one(&[(":id", &purchase_id)], map_purchase_row)?;

    Ok(purchase)
}

/// Retrieve purchases joined with their product details, newest first.
///
/// Both parts of `filter` are optional. When set, the status must match
/// exactly and the search text must appear in the product name or SKU,
/// compared case-insensitively.
pub fn get_purchases(
    filter: &PurchaseFilter,
    connection: &Connection,
) -> Result<Vec<PurchaseWithProduct>, Error> {
    let status_text = filter.status.map(|status| status.as_str().to_string());
    let search_pattern = filter.search.as_ref().map(|search| format!("%{search}%"));

    connection
        .prepare(
            "SELECT pu.id, pu.product_id, pu.qty, pu.price_each, pu.total_price, pu.status,
                 pu.created_at, pu.canceled_at, pu.canceled_by, p.name, p.sku
             FROM purchases pu
             JOIN products p ON p.id = pu.product_id
             WHERE (:status IS NULL OR pu.status = :status)
               AND (:search IS NULL OR p.name LIKE :search OR p.sku LIKE :search)
             ORDER BY pu.id DESC",
        )?
        .query_map(
            &[(":status", &status_text), (":search", &search_pattern)],
            map_purchase_with_product_row,
        )?
        .map(|maybe_purchase| maybe_purchase.map_err(|error| error.into()))
        .collect()
}

/// Get the total number of purchases in the database, regardless of status.
pub fn count_purchases(connection: &Connection) -> Result<u32, Error> {
    connection
        .query_row("SELECT COUNT(id) FROM purchases", [], |row| row.get(0))
        .map_err(|error| error.into())
}

/// Get the summed total price of all paid purchases.
///
/// Canceled purchases do not count towards revenue.
pub fn get_paid_revenue(connection: &Connection) -> Result<i64, Error> {
    connection
        .query_row(
            "SELECT COALESCE(SUM(total_price), 0) FROM purchases WHERE status = ?1",
            [PurchaseStatus::Paid.as_str()],
            |row| row.get(0),
        )
        .map_err(|error| error.into())
}

/// Create the purchases table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_purchase_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS purchases (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                product_id INTEGER NOT NULL,
                qty INTEGER NOT NULL,
                price_each INTEGER NOT NULL,
                total_price INTEGER NOT NULL,
                status TEXT NOT NULL DEFAULT 'PAID',
                created_at TEXT NOT NULL,
                canceled_at TEXT,
                canceled_by TEXT,
                FOREIGN KEY(product_id) REFERENCES products(id)
                )",
        (),
    )?;

    // Ensure the sequence starts at 1
    connection.execute(
        "INSERT OR IGNORE INTO sqlite_sequence (name, seq) VALUES ('purchases', 0)",
        (),
    )?;

    // Index used by the dashboard revenue query and the status filter.
    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_purchases_status ON purchases(status);",
        (),
    )?;

    Ok(())
}

fn map_purchase_row(row: &Row) -> Result<Purchase, rusqlite::Error> {
    let status_text: String = row.get(5)?;
    let status = PurchaseStatus::from_text(&status_text).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            5,
            rusqlite::types::Type::Text,
            format!("unknown purchase status {status_text:?}").into(),
        )
    })?;

    Ok(Purchase {
        id: row.get(0)?,
        product_id: row.get(1)?,
        qty: row.get(2)?,
        price_each: row.get(3)?,
        total_price: row.get(4)?,
        status,
        created_at: row.get(6)?,
        canceled_at: row.get(7)?,
        canceled_by: row.get(8)?,
    })
}

fn map_purchase_with_product_row(row: &Row) -> Result<PurchaseWithProduct, rusqlite::Error> {
    let purchase = map_purchase_row(row)?;

    Ok(PurchaseWithProduct {
        purchase,
        product_name: row.get(9)?,
        product_sku: row.get(10)?,
    })
}

#[cfg(test)]
mod purchase_db_tests {
    use rusqlite::Connection;

    use crate::{
        Error,
        db::initialize,
        product::get_product_with_stock,
        purchase::{
            PurchaseFilter, PurchaseStatus, cancel_purchase, count_purchases, get_paid_revenue,
            get_purchases, record_purchase,
        },
    };

    fn get_test_connection() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        conn
    }

    #[test]
    fn record_succeeds_and_deducts_stock() {
        let conn = get_test_connection();

        let purchase = record_purchase(1, 5, &conn).expect("Could not record purchase");

        assert_eq!(purchase.product_id, 1);
        assert_eq!(purchase.qty, 5);
        assert_eq!(purchase.price_each, 35_000);
        assert_eq!(purchase.total_price, 175_000);
        assert_eq!(purchase.status, PurchaseStatus::Paid);
        assert_eq!(purchase.canceled_at, None);
        assert_eq!(purchase.canceled_by, None);

        let product = get_product_with_stock(1, &conn).unwrap();
        assert_eq!(product.qty, 45);
    }

    #[test]
    fn record_fails_on_missing_product() {
        let conn = get_test_connection();

        let result = record_purchase(999, 5, &conn);

        assert_eq!(result, Err(Error::NotFound));
    }

    #[test]
    fn record_checks_product_before_quantity() {
        let conn = get_test_connection();

        let result = record_purchase(999, 0, &conn);

        assert_eq!(result, Err(Error::NotFound));
    }

    #[test]
    fn record_fails_on_non_positive_quantity() {
        let conn = get_test_connection();

        for qty in [0, -3] {
            let result = record_purchase(1, qty, &conn);

            assert_eq!(result, Err(Error::InvalidQuantity));
        }

        let product = get_product_with_stock(1, &conn).unwrap();
        assert_eq!(product.qty, 50);
    }

    #[test]
    fn record_fails_on_insufficient_stock() {
        let conn = get_test_connection();

        let result = record_purchase(1, 1000, &conn);

        assert_eq!(result, Err(Error::InsufficientStock { remaining: 50 }));
        let product = get_product_with_stock(1, &conn).unwrap();
        assert_eq!(product.qty, 50);
        assert_eq!(count_purchases(&conn).unwrap(), 0);
    }

    #[test]
    fn record_allows_buying_entire_stock() {
        let conn = get_test_connection();

        record_purchase(7, 20, &conn).expect("Could not record purchase");

        let product = get_product_with_stock(7, &conn).unwrap();
        assert_eq!(product.qty, 0);
    }

    #[test]
    fn cancel_restores_stock() {
        let conn = get_test_connection();
        let purchase = record_purchase(1, 5, &conn).expect("Could not record purchase");

        let canceled =
            cancel_purchase(purchase.id, "admin@toko", &conn).expect("Could not cancel purchase");

        assert_eq!(canceled.status, PurchaseStatus::Canceled);
        assert!(canceled.canceled_at.is_some());
        assert_eq!(canceled.canceled_by.as_deref(), Some("admin@toko"));
        let product = get_product_with_stock(1, &conn).unwrap();
        assert_eq!(product.qty, 50);
    }

    #[test]
    fn cancel_fails_on_missing_purchase() {
        let conn = get_test_connection();

        let result = cancel_purchase(999, "admin@toko", &conn);

        assert_eq!(result, Err(Error::CancelMissingPurchase));
    }

    #[test]
    fn cancel_twice_fails_and_restores_stock_once() {
        let conn = get_test_connection();
        let purchase = record_purchase(1, 5, &conn).expect("Could not record purchase");
        cancel_purchase(purchase.id, "admin@toko", &conn).expect("Could not cancel purchase");

        let result = cancel_purchase(purchase.id, "admin@toko", &conn);

        assert_eq!(result, Err(Error::PurchaseAlreadyCanceled));
        let product = get_product_with_stock(1, &conn).unwrap();
        assert_eq!(product.qty, 50);
    }

    #[test]
    fn recording_and_canceling_preserves_stock() {
        let conn = get_test_connection();
        let first = record_purchase(1, 5, &conn).expect("Could not record purchase");
        record_purchase(1, 3, &conn).expect("Could not record purchase");

        cancel_purchase(first.id, "admin@toko", &conn).expect("Could not cancel purchase");

        let product = get_product_with_stock(1, &conn).unwrap();
        assert_eq!(product.qty, 47);
    }

    #[test]
    fn get_purchases_returns_newest_first() {
        let conn = get_test_connection();
        let first = record_purchase(1, 1, &conn).expect("Could not record purchase");
        let second = record_purchase(2, 1, &conn).expect("Could not record purchase");

        let purchases = get_purchases(&PurchaseFilter::default(), &conn)
            .expect("Could not get purchases");

        assert_eq!(purchases.len(), 2);
        assert_eq!(purchases[0].purchase.id, second.id);
        assert_eq!(purchases[1].purchase.id, first.id);
    }

    #[test]
    fn get_purchases_filters_by_status() {
        let conn = get_test_connection();
        let first = record_purchase(1, 1, &conn).expect("Could not record purchase");
        let second = record_purchase(2, 1, &conn).expect("Could not record purchase");
        cancel_purchase(first.id, "admin@toko", &conn).expect("Could not cancel purchase");

        let canceled = get_purchases(
            &PurchaseFilter {
                status: Some(PurchaseStatus::Canceled),
                search: None,
            },
            &conn,
        )
        .expect("Could not get purchases");
        let paid = get_purchases(
            &PurchaseFilter {
                status: Some(PurchaseStatus::Paid),
                search: None,
            },
            &conn,
        )
        .expect("Could not get purchases");

        assert_eq!(canceled.len(), 1);
        assert_eq!(canceled[0].purchase.id, first.id);
        assert_eq!(paid.len(), 1);
        assert_eq!(paid[0].purchase.id, second.id);
    }

    #[test]
    fn get_purchases_searches_name_and_sku_case_insensitively() {
        let conn = get_test_connection();
        record_purchase(1, 1, &conn).expect("Could not record purchase");
        record_purchase(2, 1, &conn).expect("Could not record purchase");
        record_purchase(3, 1, &conn).expect("Could not record purchase");

        let by_name = get_purchases(
            &PurchaseFilter {
                status: None,
                search: Some("kopi".to_string()),
            },
            &conn,
        )
        .expect("Could not get purchases");
        let by_sku = get_purchases(
            &PurchaseFilter {
                status: None,
                search: Some("sku-003".to_string()),
            },
            &conn,
        )
        .expect("Could not get purchases");

        assert_eq!(by_name.len(), 2);
        assert_eq!(by_sku.len(), 1);
        assert_eq!(by_sku[0].product_name, "Teh Hijau 200g");
    }

    #[test]
    fn get_purchases_combines_status_and_search() {
        let conn = get_test_connection();
        let robusta = record_purchase(1, 1, &conn).expect("Could not record purchase");
        record_purchase(2, 1, &conn).expect("Could not record purchase");
        cancel_purchase(robusta.id, "admin@toko", &conn).expect("Could not cancel purchase");

        let results = get_purchases(
            &PurchaseFilter {
                status: Some(PurchaseStatus::Paid),
                search: Some("kopi".to_string()),
            },
            &conn,
        )
        .expect("Could not get purchases");

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].product_name, "Kopi Arabica 250g");
    }

    #[test]
    fn revenue_counts_only_paid_purchases() {
        let conn = get_test_connection();
        let first = record_purchase(1, 5, &conn).expect("Could not record purchase");
        record_purchase(2, 2, &conn).expect("Could not record purchase");
        cancel_purchase(first.id, "admin@toko", &conn).expect("Could not cancel purchase");

        let revenue = get_paid_revenue(&conn).expect("Could not get revenue");

        assert_eq!(revenue, 110_000);
        assert_eq!(count_purchases(&conn).unwrap(), 2);
    }

    #[test]
    fn purchase_keeps_price_snapshot_after_price_change() {
        let conn = get_test_connection();
        record_purchase(1, 2, &conn).expect("Could not record purchase");

        conn.execute("UPDATE products SET price = 99000 WHERE id = 1", [])
            .unwrap();

        let purchases = get_purchases(&PurchaseFilter::default(), &conn)
            .expect("Could not get purchases");
        assert_eq!(purchases[0].purchase.price_each, 35_000);
        assert_eq!(purchases[0].purchase.total_price, 70_000);
    }
}
