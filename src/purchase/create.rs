//! New purchase page and recording endpoint.

use std::sync::{Arc, Mutex};

use axum::{
    Form,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error, endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, base,
        format_rupiah,
    },
    navigation::NavBar,
    product::{ProductWithStock, get_products_by_name},
    purchase::{domain::NewPurchaseForm, record_purchase},
};

/// The state needed for the new purchase page.
#[derive(Debug, Clone)]
pub struct NewPurchasePageState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for NewPurchasePageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The state needed for recording a purchase.
#[derive(Debug, Clone)]
pub struct CreatePurchaseEndpointState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreatePurchaseEndpointState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Render the new purchase page with a product selector.
pub async fn get_new_purchase_page(
    State(state): State<NewPurchasePageState>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let products = get_products_by_name(&connection)
        .inspect_err(|error| tracing::error!("Failed to retrieve products: {error}"))?;

    Ok(new_purchase_view(&products).into_response())
}

/// Handle purchase form submission.
pub async fn create_purchase_endpoint(
    State(state): State<CreatePurchaseEndpointState>,
    Form(new_purchase): Form<NewPurchaseForm>,
) -> Response {
    // Browsers send the quantity as text. Anything that does not parse as a
    // whole number becomes zero and is rejected by the quantity check.
    let qty = new_purchase.quantity.trim().parse::<i64>().unwrap_or(0);

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match record_purchase(new_purchase.product_id, qty, &connection) {
        Ok(_) => (
            HxRedirect(endpoints::PURCHASES_VIEW.to_owned()),
            StatusCode::SEE_OTHER,
        )
            .into_response(),
        Err(
            error @ (Error::NotFound | Error::InvalidQuantity | Error::InsufficientStock { .. }),
        ) => error.into_alert_response(),
        Err(error) => {
            tracing::error!("An unexpected error occurred while recording a purchase: {error}");

            error.into_alert_response()
        }
    }
}

fn new_purchase_view(products: &[ProductWithStock]) -> Markup {
    let nav_bar = NavBar::new(endpoints::NEW_PURCHASE_VIEW).into_html();
    let form = new_purchase_form_view(products);

    let content = html! {
        (nav_bar)
        div class=(FORM_CONTAINER_STYLE) { (form) }
    };

    base("New Purchase", &content)
}

fn new_purchase_form_view(products: &[ProductWithStock]) -> Markup {
    let record_purchase_endpoint = endpoints::POST_PURCHASE;

    html! {
        form
            hx-post=(record_purchase_endpoint)
            hx-target-error="#alert-container"
            class="w-full space-y-4 md:space-y-6"
        {
            div
            {
                label
                    for="product_id"
                    class=(FORM_LABEL_STYLE)
                {
                    "Product"
                }

                select
                    id="product_id"
                    name="product_id"
                    required
                    class=(FORM_TEXT_INPUT_STYLE)
                {
                    @for product_with_stock in products {
                        option value=(product_with_stock.product.id)
                        {
                            (product_with_stock.product.name)
                            " ("
                            (format_rupiah(product_with_stock.product.price))
                            ", "
                            (product_with_stock.qty)
                            " in stock)"
                        }
                    }
                }
            }

            div
            {
                label
                    for="quantity"
                    class=(FORM_LABEL_STYLE)
                {
                    "Quantity"
                }

                input
                    id="quantity"
                    type="text"
                    name="quantity"
                    placeholder="Quantity"
                    required
                    autofocus
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Record Purchase" }
        }
    }
}
