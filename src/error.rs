//! Defines the app level error type and conversions to rendered HTML pages and alerts.
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::{
    alert::Alert, internal_server_error::InternalServerError, not_found::NotFoundError,
};

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The requested resource was not found.
    ///
    /// For HTTP request handlers, the client should check that the parameters
    /// (e.g., ID) are correct and that the resource has been created.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// The quantity for a purchase did not parse to a positive whole number.
    ///
    /// Non-numeric input and zero or negative numbers are intentionally
    /// folded into the same error so the client sees a single message for
    /// every malformed quantity.
    #[error("quantity must be a positive whole number")]
    InvalidQuantity,

    /// A purchase asked for more units than are currently in stock.
    ///
    /// Carries the remaining stock so the client can tell the user how many
    /// units they can still buy.
    #[error("insufficient stock, only {remaining} remaining")]
    InsufficientStock {
        /// The units still in stock for the requested product.
        remaining: i64,
    },

    /// Tried to cancel a purchase that does not exist
    #[error("tried to cancel a purchase that is not in the database")]
    CancelMissingPurchase,

    /// Tried to cancel a purchase that has already been canceled.
    ///
    /// Cancellation is rejected rather than treated as a no-op so that stock
    /// is never restored twice for the same purchase.
    #[error("the purchase has already been canceled")]
    PurchaseAlreadyCanceled,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezoneError(String),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            // Code 787 occurs when a FOREIGN KEY constraint failed.
            rusqlite::Error::SqliteFailure(sql_error, Some(_))
                if sql_error.extended_code == 787 =>
            {
                Error::NotFound
            }
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::NotFound => NotFoundError.into_response(),
            Error::InvalidTimezoneError(timezone) => InternalServerError {
                description: "Invalid Timezone Settings",
                fix: &format!(
                    "Could not get local timezone \"{timezone}\". Check your server settings and \
                    ensure the timezone has been set to valid, canonical timezone string"
                ),
            }
            .into_response(),
            Error::DatabaseLockError => InternalServerError::default().into_response(),
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                InternalServerError::default().into_response()
            }
        }
    }
}

impl Error {
    /// Convert the error into an HTTP response with an HTML alert.
    pub fn into_alert_response(self) -> Response {
        let (status_code, alert) = match self {
            Error::NotFound => (
                StatusCode::NOT_FOUND,
                Alert::Error {
                    message: "Product not found".to_owned(),
                    details: "Could not find the selected product. \
                    Refresh the page and pick a product from the list."
                        .to_owned(),
                },
            ),
            Error::InvalidQuantity => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "Invalid quantity".to_owned(),
                    details: "Quantity must be a positive whole number.".to_owned(),
                },
            ),
            Error::InsufficientStock { remaining } => (
                StatusCode::BAD_REQUEST,
                Alert::Error {
                    message: "Not enough stock".to_owned(),
                    details: format!("Only {remaining} left in stock."),
                },
            ),
            Error::CancelMissingPurchase => (
                StatusCode::NOT_FOUND,
                Alert::Error {
                    message: "Could not cancel purchase".to_owned(),
                    details: "The purchase could not be found.".to_owned(),
                },
            ),
            Error::PurchaseAlreadyCanceled => (
                StatusCode::CONFLICT,
                Alert::Error {
                    message: "Could not cancel purchase".to_owned(),
                    details: "The purchase has already been canceled. \
                    Refresh the page to see its current status."
                        .to_owned(),
                },
            ),
            Error::InvalidTimezoneError(timezone) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Alert::Error {
                    message: "Invalid Timezone Settings".to_owned(),
                    details: format!(
                        "Could not get local timezone \"{timezone}\". Check your server settings and \
                    ensure the timezone has been set to valid, canonical timezone string"
                    ),
                },
            ),
            _ => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Alert::Error {
                    message: "Something went wrong".to_owned(),
                    details:
                        "An unexpected error occurred, check the server logs for more details."
                            .to_owned(),
                },
            ),
        };

        (status_code, alert.into_html()).into_response()
    }
}
