//! Purchase cancellation endpoint.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;
use rusqlite::Connection;

use crate::{
    AppState, Error, endpoints,
    purchase::{PurchaseId, cancel_purchase},
};

/// Recorded as the canceling user while the admin panel has no sign in.
pub const CANCELED_BY: &str = "admin@toko";

/// The state needed for canceling a purchase.
#[derive(Debug, Clone)]
pub struct CancelPurchaseEndpointState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CancelPurchaseEndpointState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Handle purchase cancellation. Redirects to the purchase listing or returns an error alert.
pub async fn cancel_purchase_endpoint(
    Path(purchase_id): Path<PurchaseId>,
    State(state): State<CancelPurchaseEndpointState>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match cancel_purchase(purchase_id, CANCELED_BY, &connection) {
        Ok(_) => (
            HxRedirect(endpoints::PURCHASES_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(error @ (Error::CancelMissingPurchase | Error::PurchaseAlreadyCanceled)) => {
            error.into_alert_response()
        }
        Err(error) => {
            tracing::error!(
                "An unexpected error occurred while canceling purchase {purchase_id}: {error}"
            );

            error.into_alert_response()
        }
    }
}

#[cfg(test)]
mod cancel_purchase_endpoint_tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        extract::{Path, State},
        http::StatusCode,
        response::IntoResponse,
    };
    use rusqlite::Connection;
    use scraper::Html;

    use crate::{
        db::initialize,
        endpoints,
        product::get_product_with_stock,
        purchase::{PurchaseStatus, get_purchase, record_purchase},
        test_utils::{assert_hx_redirect, assert_valid_html, get_header, parse_html_fragment},
    };

    use super::{CancelPurchaseEndpointState, cancel_purchase_endpoint};

    fn get_cancel_state() -> CancelPurchaseEndpointState {
        let connection =
            Connection::open_in_memory().expect("Could not open in-memory SQLite database");
        initialize(&connection).expect("Could not initialize database");

        CancelPurchaseEndpointState {
            db_connection: Arc::new(Mutex::new(connection)),
        }
    }

    #[tokio::test]
    async fn cancel_purchase_endpoint_succeeds() {
        let state = get_cancel_state();
        let purchase = record_purchase(1, 5, &state.db_connection.lock().unwrap())
            .expect("Could not record test purchase");

        let response = cancel_purchase_endpoint(Path(purchase.id), State(state.clone()))
            .await
            .into_response();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_hx_redirect(&response, endpoints::PURCHASES_VIEW);

        let connection = state.db_connection.lock().unwrap();
        let canceled = get_purchase(purchase.id, &connection).unwrap();
        assert_eq!(canceled.status, PurchaseStatus::Canceled);
        let product = get_product_with_stock(1, &connection).unwrap();
        assert_eq!(product.qty, 50);
    }

    #[tokio::test]
    async fn cancel_purchase_endpoint_with_invalid_id_returns_error_html() {
        let state = get_cancel_state();
        let invalid_id = 999999;

        let response = cancel_purchase_endpoint(Path(invalid_id), State(state))
            .await
            .into_response();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            get_header(&response, "content-type"),
            "text/html; charset=utf-8"
        );

        let html = parse_html_fragment(response).await;
        assert_valid_html(&html);
        assert_error_content(&html, "Could not cancel purchase");
    }

    #[tokio::test]
    async fn cancel_purchase_endpoint_rejects_second_cancellation() {
        let state = get_cancel_state();
        let purchase = record_purchase(1, 5, &state.db_connection.lock().unwrap())
            .expect("Could not record test purchase");
        cancel_purchase_endpoint(Path(purchase.id), State(state.clone()))
            .await
            .into_response();

        let response = cancel_purchase_endpoint(Path(purchase.id), State(state.clone()))
            .await
            .into_response();

        assert_eq!(response.status(), StatusCode::CONFLICT);
        let html = parse_html_fragment(response).await;
        assert_valid_html(&html);
        assert_error_content(&html, "Could not cancel purchase");

        let connection = state.db_connection.lock().unwrap();
        let product = get_product_with_stock(1, &connection).unwrap();
        assert_eq!(product.qty, 50);
    }

    #[track_caller]
    fn assert_error_content(html: &Html, want_error_message: &str) {
        let p = scraper::Selector::parse("p").unwrap();
        let error_message = html
            .select(&p)
            .next()
            .expect("No error message found")
            .text()
            .collect::<Vec<_>>()
            .join("");
        let got_error_message = error_message.trim();

        assert_eq!(want_error_message, got_error_message);
    }
}
