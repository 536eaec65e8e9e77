//! Purchases listing page with status and search filters.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use serde::Deserialize;
use time::{
    OffsetDateTime, UtcOffset, format_description::BorrowedFormatItem, macros::format_description,
};

use crate::{
    AppState, Error, endpoints,
    html::{
        BUTTON_CANCEL_STYLE, BUTTON_PRIMARY_STYLE, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE,
        LINK_STYLE, PAGE_CONTAINER_STYLE, STATUS_CANCELED_BADGE_STYLE, STATUS_PAID_BADGE_STYLE,
        TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base, format_rupiah,
    },
    navigation::NavBar,
    purchase::{PurchaseFilter, PurchaseStatus, PurchaseWithProduct, get_purchases},
    timezone::get_local_offset,
};

/// Raw query parameters for the purchases page, before normalization.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct PurchasesQuery {
    /// Status filter as sent by the filter form, e.g. "PAID".
    status: Option<String>,
    /// Search text matched against product names and SKUs.
    q: Option<String>,
}

enum QueryDecision {
    Redirect(String),
    Normalized(PurchaseFilter),
}

/// The state needed for the purchases page.
#[derive(Debug, Clone)]
pub struct PurchasesPageState {
    /// The database connection for reading purchases.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Asia/Jakarta".
    pub local_timezone: String,
}

impl FromRef<AppState> for PurchasesPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// Render the purchase listing, newest first, with optional filters.
pub async fn get_purchases_page(
    State(state): State<PurchasesPageState>,
    Query(query_params): Query<PurchasesQuery>,
) -> Result<Response, Error> {
    let filter = match normalize_query(query_params) {
        QueryDecision::Normalized(filter) => filter,
        QueryDecision::Redirect(redirect_url) => {
            return Ok(Redirect::to(&redirect_url).into_response());
        }
    };

    let Some(local_offset) = get_local_offset(&state.local_timezone) else {
        tracing::error!("Invalid timezone {}", state.local_timezone);
        return Err(Error::InvalidTimezoneError(state.local_timezone.clone()));
    };

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let purchases = get_purchases(&filter, &connection)
        .inspect_err(|error| tracing::error!("Failed to retrieve purchases: {error}"))?;

    Ok(purchases_view(&purchases, &filter, local_offset).into_response())
}

/// Clean up the raw query parameters, redirecting to the canonical URL when
/// anything had to change.
///
/// An unknown status and a blank search are dropped rather than reported,
/// and search text is trimmed.
fn normalize_query(query: PurchasesQuery) -> QueryDecision {
    let status = query.status.as_deref().and_then(PurchaseStatus::from_text);
    let search = query
        .q
        .as_deref()
        .map(str::trim)
        .filter(|search| !search.is_empty())
        .map(str::to_string);

    let status_was_cleaned = query.status.is_some() && status.is_none();
    let search_was_cleaned = query.q.as_deref() != search.as_deref();
    let filter = PurchaseFilter { status, search };

    if status_was_cleaned || search_was_cleaned {
        return QueryDecision::Redirect(filter_url(&filter));
    }

    QueryDecision::Normalized(filter)
}

/// Build the purchases page URL for a filter, with parameters URL encoded.
fn filter_url(filter: &PurchaseFilter) -> String {
    let mut params = Vec::new();

    if let Some(status) = filter.status {
        params.push(("status", status.as_str().to_string()));
    }

    if let Some(search) = &filter.search {
        params.push(("q", search.clone()));
    }

    if params.is_empty() {
        return endpoints::PURCHASES_VIEW.to_string();
    }

    match serde_urlencoded::to_string(&params) {
        Ok(query_string) => format!("{}?{query_string}", endpoints::PURCHASES_VIEW),
        Err(error) => {
            tracing::error!("Could not encode purchases filter: {error}");
            endpoints::PURCHASES_VIEW.to_string()
        }
    }
}

const DATE_TIME_FORMAT: &[BorrowedFormatItem] = format_description!(
    "[year]-[month repr:numerical padding:zero]-[day padding:zero] [hour]:[minute]"
);

fn format_local_timestamp(timestamp: OffsetDateTime, local_offset: UtcOffset) -> String {
    let local_timestamp = timestamp.to_offset(local_offset);

    local_timestamp
        .format(DATE_TIME_FORMAT)
        .unwrap_or_else(|_| local_timestamp.to_string())
}

fn purchases_view(
    purchases: &[PurchaseWithProduct],
    filter: &PurchaseFilter,
    local_offset: UtcOffset,
) -> Markup {
    let new_purchase_route = endpoints::NEW_PURCHASE_VIEW;
    let nav_bar = NavBar::new(endpoints::PURCHASES_VIEW).into_html();

    let status_badge = |purchase_with_product: &PurchaseWithProduct| {
        let purchase = &purchase_with_product.purchase;

        html!(
            @match purchase.status {
                PurchaseStatus::Paid => span class=(STATUS_PAID_BADGE_STYLE) { "PAID" }
                PurchaseStatus::Canceled => span class=(STATUS_CANCELED_BADGE_STYLE) { "CANCELED" }
            }

            @if let (Some(canceled_at), Some(canceled_by)) =
                (purchase.canceled_at, &purchase.canceled_by)
            {
                p class="mt-1 text-xs text-gray-500 dark:text-gray-400"
                {
                    (format_local_timestamp(canceled_at, local_offset)) " by " (canceled_by)
                }
            }
        )
    };

    let cancel_button = |purchase_with_product: &PurchaseWithProduct| {
        let purchase = &purchase_with_product.purchase;
        let cancel_url = endpoints::format_endpoint(endpoints::CANCEL_PURCHASE, purchase.id);
        let confirm_message = format!(
            "Cancel this purchase and return {} unit(s) of '{}' to stock?",
            purchase.qty, purchase_with_product.product_name
        );

        html!(
            @if purchase.status == PurchaseStatus::Paid {
                button
                    hx-post=(cancel_url)
                    hx-confirm=(confirm_message)
                    hx-target-error="#alert-container"
                    class=(BUTTON_CANCEL_STYLE)
                {
                    "Cancel"
                }
            }
        )
    };

    let table_row = |purchase_with_product: &PurchaseWithProduct| {
        let purchase = &purchase_with_product.purchase;

        html!(
            tr class=(TABLE_ROW_STYLE)
            {
                td class=(TABLE_CELL_STYLE)
                {
                    div class="font-medium text-gray-900 dark:text-white"
                    {
                        (purchase_with_product.product_name)
                    }
                    div class="font-mono text-xs text-gray-500 dark:text-gray-400"
                    {
                        (purchase_with_product.product_sku)
                    }
                }

                td class=(TABLE_CELL_STYLE)
                {
                    span class="tabular-nums" { (purchase.qty) }
                }

                td class=(TABLE_CELL_STYLE)
                {
                    (format_rupiah(purchase.total_price))
                }

                td class=(TABLE_CELL_STYLE)
                {
                    (status_badge(purchase_with_product))
                }

                td class=(TABLE_CELL_STYLE)
                {
                    (format_local_timestamp(purchase.created_at, local_offset))
                }

                td class=(TABLE_CELL_STYLE)
                {
                    (cancel_button(purchase_with_product))
                }
            }
        )
    };

    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="space-y-4"
            {
                header class="flex justify-between flex-wrap items-end"
                {
                    h1 class="text-xl font-bold" { "Purchases" }

                    a href=(new_purchase_route) class=(LINK_STYLE)
                    {
                        "Record Purchase"
                    }
                }

                (filter_form_view(filter))

                (purchases_cards_view(purchases, local_offset))

                section class="hidden lg:block dark:bg-gray-800 lg:max-w-5xl lg:w-full lg:mx-auto"
                {
                    table class="w-full text-sm text-left rtl:text-right
                        text-gray-500 dark:text-gray-400"
                    {
                        thead class=(TABLE_HEADER_STYLE)
                        {
                            tr
                            {
                                th scope="col" class=(TABLE_CELL_STYLE)
                                {
                                    "Product"
                                }
                                th scope="col" class=(TABLE_CELL_STYLE)
                                {
                                    "Qty"
                                }
                                th scope="col" class=(TABLE_CELL_STYLE)
                                {
                                    "Total"
                                }
                                th scope="col" class=(TABLE_CELL_STYLE)
                                {
                                    "Status"
                                }
                                th scope="col" class=(TABLE_CELL_STYLE)
                                {
                                    "Recorded"
                                }
                                th scope="col" class=(TABLE_CELL_STYLE)
                                {
                                    "Actions"
                                }
                            }
                        }

                        tbody
                        {
                            @for purchase_with_product in purchases {
                                (table_row(purchase_with_product))
                            }

                            @if purchases.is_empty() {
                                tr
                                {
                                    td
                                        colspan="6"
                                        class="px-6 py-4 text-center
                                            text-gray-500 dark:text-gray-400"
                                    {
                                        "No purchases found. "
                                        a href=(new_purchase_route) class=(LINK_STYLE)
                                        {
                                            "Record a purchase"
                                        }
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    );

    base("Purchases", &content)
}

fn filter_form_view(filter: &PurchaseFilter) -> Markup {
    html!(
        form
            method="get"
            action=(endpoints::PURCHASES_VIEW)
            class="flex flex-wrap items-end gap-3"
        {
            div
            {
                label for="status" class=(FORM_LABEL_STYLE) { "Status" }

                select id="status" name="status" class=(FORM_TEXT_INPUT_STYLE)
                {
                    option value="" selected[filter.status.is_none()] { "All" }
                    option
                        value=(PurchaseStatus::Paid.as_str())
                        selected[filter.status == Some(PurchaseStatus::Paid)]
                    {
                        "Paid"
                    }
                    option
                        value=(PurchaseStatus::Canceled.as_str())
                        selected[filter.status == Some(PurchaseStatus::Canceled)]
                    {
                        "Canceled"
                    }
                }
            }

            div
            {
                label for="q" class=(FORM_LABEL_STYLE) { "Search" }

                input
                    id="q"
                    type="text"
                    name="q"
                    value=[filter.search.as_deref()]
                    placeholder="Product name or SKU"
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Filter" }
        }
    )
}

fn purchases_cards_view(purchases: &[PurchaseWithProduct], local_offset: UtcOffset) -> Markup {
    html!(
        ul class="lg:hidden space-y-4"
        {
            @for purchase_with_product in purchases {
                @let purchase = &purchase_with_product.purchase;
                li class="rounded border border-gray-200 bg-white px-4 py-3 shadow-sm dark:border-gray-700 dark:bg-gray-800"
                    data-purchase-card="true"
                {
                    div class="flex items-start justify-between gap-3"
                    {
                        div
                        {
                            div class="font-medium text-gray-900 dark:text-white"
                            {
                                (purchase_with_product.product_name)
                            }
                            div class="font-mono text-xs text-gray-500 dark:text-gray-400"
                            {
                                (purchase_with_product.product_sku)
                            }
                        }

                        @match purchase.status {
                            PurchaseStatus::Paid => span class=(STATUS_PAID_BADGE_STYLE) { "PAID" }
                            PurchaseStatus::Canceled => span class=(STATUS_CANCELED_BADGE_STYLE) { "CANCELED" }
                        }
                    }

                    div class="mt-2 flex items-center justify-between text-sm"
                    {
                        span
                        {
                            (purchase.qty) " x " (format_rupiah(purchase.price_each))
                        }
                        span class="font-medium" { (format_rupiah(purchase.total_price)) }
                    }

                    div class="mt-2 flex items-center justify-between text-sm"
                    {
                        span class="text-xs text-gray-500 dark:text-gray-400"
                        {
                            (format_local_timestamp(purchase.created_at, local_offset))
                        }

                        @if purchase.status == PurchaseStatus::Paid {
                            button
                                hx-post=(endpoints::format_endpoint(endpoints::CANCEL_PURCHASE, purchase.id))
                                hx-confirm=(format!(
                                    "Cancel this purchase and return {} unit(s) of '{}' to stock?",
                                    purchase.qty, purchase_with_product.product_name
                                ))
                                hx-target-error="#alert-container"
                                class=(BUTTON_CANCEL_STYLE)
                            {
                                "Cancel"
                            }
                        }
                    }
                }
            }

            @if purchases.is_empty() {
                li class="rounded border border-dashed border-gray-300 bg-white px-4 py-6 text-center text-sm text-gray-500 dark:border-gray-700 dark:bg-gray-800 dark:text-gray-400"
                {
                    "No purchases found. "
                    a href=(endpoints::NEW_PURCHASE_VIEW) class=(LINK_STYLE)
                    {
                        "Record a purchase"
                    }
                }
            }
        }
    )
}

#[cfg(test)]
mod normalize_query_tests {
    use crate::purchase::{PurchaseFilter, PurchaseStatus};

    use super::{PurchasesQuery, QueryDecision, normalize_query};

    #[test]
    fn keeps_valid_params() {
        let query = PurchasesQuery {
            status: Some("PAID".to_string()),
            q: Some("kopi".to_string()),
        };

        let decision = normalize_query(query);

        let QueryDecision::Normalized(filter) = decision else {
            panic!("Expected normalized filter, got redirect");
        };
        assert_eq!(
            filter,
            PurchaseFilter {
                status: Some(PurchaseStatus::Paid),
                search: Some("kopi".to_string()),
            }
        );
    }

    #[test]
    fn keeps_missing_params() {
        let decision = normalize_query(PurchasesQuery::default());

        let QueryDecision::Normalized(filter) = decision else {
            panic!("Expected normalized filter, got redirect");
        };
        assert_eq!(filter, PurchaseFilter::default());
    }

    #[test]
    fn redirects_on_unknown_status() {
        let query = PurchasesQuery {
            status: Some("REFUNDED".to_string()),
            q: None,
        };

        let decision = normalize_query(query);

        let QueryDecision::Redirect(redirect_url) = decision else {
            panic!("Expected redirect, got normalized filter");
        };
        assert_eq!(redirect_url, "/purchases");
    }

    #[test]
    fn redirects_on_blank_search() {
        let query = PurchasesQuery {
            status: Some("PAID".to_string()),
            q: Some("   ".to_string()),
        };

        let decision = normalize_query(query);

        let QueryDecision::Redirect(redirect_url) = decision else {
            panic!("Expected redirect, got normalized filter");
        };
        assert_eq!(redirect_url, "/purchases?status=PAID");
    }

    #[test]
    fn redirects_to_trimmed_search() {
        let query = PurchasesQuery {
            status: None,
            q: Some(" kopi ".to_string()),
        };

        let decision = normalize_query(query);

        let QueryDecision::Redirect(redirect_url) = decision else {
            panic!("Expected redirect, got normalized filter");
        };
        assert_eq!(redirect_url, "/purchases?q=kopi");
    }
}
