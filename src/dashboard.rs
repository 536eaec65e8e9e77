//! Dashboard page with catalogue and sales counters.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error, endpoints,
    html::{LINK_STYLE, PAGE_CONTAINER_STYLE, base, format_rupiah},
    navigation::NavBar,
    product::{count_products, get_total_stock},
    purchase::{count_purchases, get_paid_revenue},
};

/// The state needed for displaying the dashboard page.
#[derive(Debug, Clone)]
pub struct DashboardState {
    /// The database connection for reading the counters.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DashboardState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Counters summarizing the catalogue and the sales history.
struct DashboardSummary {
    product_count: u32,
    total_stock: i64,
    purchase_count: u32,
    paid_revenue: i64,
}

/// Display an overview of the shop's catalogue and sales.
pub async fn get_dashboard_page(State(state): State<DashboardState>) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let summary = DashboardSummary {
        product_count: count_products(&connection)
            .inspect_err(|error| tracing::error!("could not count products: {error}"))?,
        total_stock: get_total_stock(&connection)
            .inspect_err(|error| tracing::error!("could not sum stock: {error}"))?,
        purchase_count: count_purchases(&connection)
            .inspect_err(|error| tracing::error!("could not count purchases: {error}"))?,
        paid_revenue: get_paid_revenue(&connection)
            .inspect_err(|error| tracing::error!("could not sum revenue: {error}"))?,
    };

    Ok(dashboard_view(&summary).into_response())
}

fn dashboard_view(summary: &DashboardSummary) -> Markup {
    let nav_bar = NavBar::new(endpoints::DASHBOARD_VIEW).into_html();

    let content = html! {
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE) {
            section class="space-y-4" {
                h1 class="text-xl font-bold" { "Dashboard" }

                div class="grid grid-cols-1 sm:grid-cols-2 lg:grid-cols-4 gap-4" {
                    (summary_card(
                        "Products",
                        &summary.product_count.to_string(),
                        None,
                        endpoints::PRODUCTS_VIEW,
                        "View products",
                    ))
                    (summary_card(
                        "Units in Stock",
                        &summary.total_stock.to_string(),
                        None,
                        endpoints::PRODUCTS_VIEW,
                        "View stock",
                    ))
                    (summary_card(
                        "Purchases",
                        &summary.purchase_count.to_string(),
                        None,
                        endpoints::PURCHASES_VIEW,
                        "View purchases",
                    ))
                    (summary_card(
                        "Revenue",
                        &format_rupiah(summary.paid_revenue),
                        Some("From paid purchases"),
                        endpoints::PURCHASES_VIEW,
                        "View purchases",
                    ))
                }
            }
        }
    };

    base("Dashboard", &content)
}

fn summary_card(
    title: &str,
    value: &str,
    note: Option<&str>,
    link_url: &str,
    link_text: &str,
) -> Markup {
    html! {
        div
            class="bg-white dark:bg-gray-800 border border-gray-200
                   dark:border-gray-700 rounded-lg p-4 shadow-md
                   flex flex-col justify-between"
            data-summary-card=(title)
        {
            div {
                h3 class="text-sm font-medium text-gray-500 dark:text-gray-400" { (title) }
                p class="mt-2 text-2xl font-semibold text-gray-900 dark:text-white" { (value) }

                @if let Some(note) = note {
                    p class="text-xs text-gray-500 dark:text-gray-400" { (note) }
                }
            }

            a href=(link_url) class=(LINK_STYLE) { (link_text) }
        }
    }
}
