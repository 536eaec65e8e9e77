//! Database initialization for the application.

use rusqlite::{Connection, Transaction as SqlTransaction};

use crate::{
    Error,
    product::{create_product_table, create_stock_table, seed_default_products},
    purchase::create_purchase_table,
};

/// Create the application's tables and seed the product catalogue.
///
/// Safe to call on every start up: tables are only created when missing and
/// the seed only runs against an empty catalogue.
///
/// # Errors
/// This function will return a [Error::SqlError] if the schema cannot be
/// created or the seed data cannot be inserted.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    // Foreign keys are off by default in SQLite, and the pragma is a no-op
    // inside a transaction, so it must be set first.
    connection.execute_batch("PRAGMA foreign_keys = ON;")?;

    let transaction =
        SqlTransaction::new_unchecked(connection, rusqlite::TransactionBehavior::Exclusive)?;

    create_product_table(&transaction)?;
    create_stock_table(&transaction)?;
    create_purchase_table(&transaction)?;
    seed_default_products(&transaction)?;

    transaction.commit()?;

    Ok(())
}
