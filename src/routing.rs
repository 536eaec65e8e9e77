//! Application router configuration wiring each endpoint to its handler.

use axum::{
    Router,
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
};
use tower_http::services::ServeDir;

use crate::{
    AppState,
    dashboard::get_dashboard_page,
    endpoints,
    internal_server_error::get_internal_server_error_page,
    not_found::get_404_not_found,
    product::get_products_page,
    purchase::{
        cancel_purchase_endpoint, create_purchase_endpoint, get_new_purchase_page,
        get_purchases_page,
    },
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(endpoints::ROOT, get(get_index_page))
        .route(endpoints::COFFEE, get(get_coffee))
        .route(endpoints::DASHBOARD_VIEW, get(get_dashboard_page))
        .route(endpoints::PRODUCTS_VIEW, get(get_products_page))
        .route(endpoints::PURCHASES_VIEW, get(get_purchases_page))
        .route(endpoints::NEW_PURCHASE_VIEW, get(get_new_purchase_page))
        .route(endpoints::POST_PURCHASE, post(create_purchase_endpoint))
        .route(endpoints::CANCEL_PURCHASE, post(cancel_purchase_endpoint))
        .route(
            endpoints::INTERNAL_ERROR_VIEW,
            get(get_internal_server_error_page),
        )
        .nest_service(endpoints::STATIC, ServeDir::new("static/"))
        .fallback(get_404_not_found)
        .with_state(state)
}

/// Attempt to get a cup of coffee from the server.
async fn get_coffee() -> Response {
    (StatusCode::IM_A_TEAPOT, Html("I'm a teapot")).into_response()
}

/// The root path '/' redirects to the dashboard page.
async fn get_index_page() -> Redirect {
    Redirect::to(endpoints::DASHBOARD_VIEW)
}
