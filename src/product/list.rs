//! Product catalogue listing page.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error, endpoints,
    html::{
        LINK_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE,
        base, format_rupiah,
    },
    navigation::NavBar,
    product::{ProductWithStock, get_all_products_with_stock},
};

/// The state needed for the product listing page.
#[derive(Debug, Clone)]
pub struct ProductsPageState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ProductsPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Render the product catalogue with current stock levels.
pub async fn get_products_page(State(state): State<ProductsPageState>) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let products = get_all_products_with_stock(&connection)
        .inspect_err(|error| tracing::error!("Failed to retrieve products: {error}"))?;

    Ok(products_view(&products).into_response())
}

fn products_view(products: &[ProductWithStock]) -> Markup {
    let new_purchase_route = endpoints::NEW_PURCHASE_VIEW;
    let nav_bar = NavBar::new(endpoints::PRODUCTS_VIEW).into_html();

    let table_row = |product_with_stock: &ProductWithStock| {
        html!(
            tr class=(TABLE_ROW_STYLE)
            {
                td class=(TABLE_CELL_STYLE)
                {
                    span class="font-mono text-xs text-gray-500 dark:text-gray-400"
                    {
                        (product_with_stock.product.sku)
                    }
                }

                td class=(TABLE_CELL_STYLE)
                {
                    span class="font-medium text-gray-900 dark:text-white"
                    {
                        (product_with_stock.product.name)
                    }
                }

                td class=(TABLE_CELL_STYLE)
                {
                    (format_rupiah(product_with_stock.product.price))
                }

                td class=(TABLE_CELL_STYLE)
                {
                    span class="tabular-nums"
                    {
                        (product_with_stock.qty)
                    }
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
                    h1 class="text-xl font-bold" { "Products" }

                    a href=(new_purchase_route) class=(LINK_STYLE)
                    {
                        "Record Purchase"
                    }
                }

                (products_cards_view(products))

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
                                    "SKU"
                                }
                                th scope="col" class=(TABLE_CELL_STYLE)
                                {
                                    "Name"
                                }
                                th scope="col" class=(TABLE_CELL_STYLE)
                                {
                                    "Price"
                                }
                                th scope="col" class=(TABLE_CELL_STYLE)
                                {
                                    "In Stock"
                                }
                            }
                        }

                        tbody
                        {
                            @for product_with_stock in products {
                                (table_row(product_with_stock))
                            }

                            @if products.is_empty() {
                                tr
                                {
                                    td
                                        colspan="4"
                                        class="px-6 py-4 text-center
                                            text-gray-500 dark:text-gray-400"
                                    {
                                        "No products in the catalogue."
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    );

    base("Products", &content)
}

fn products_cards_view(products: &[ProductWithStock]) -> Markup {
    html!(
        ul class="lg:hidden space-y-4"
        {
            @for product_with_stock in products {
                li class="rounded border border-gray-200 bg-white px-4 py-3 shadow-sm dark:border-gray-700 dark:bg-gray-800"
                    data-product-card="true"
                {
                    div class="flex items-start justify-between gap-3"
                    {
                        span class="font-medium text-gray-900 dark:text-white"
                        {
                            (product_with_stock.product.name)
                        }
                        span class="font-mono text-xs text-gray-500 dark:text-gray-400"
                        {
                            (product_with_stock.product.sku)
                        }
                    }

                    div class="mt-2 flex items-center justify-between text-sm"
                    {
                        span { (format_rupiah(product_with_stock.product.price)) }
                        span class="tabular-nums text-gray-500 dark:text-gray-400"
                        {
                            (product_with_stock.qty) " in stock"
                        }
                    }
                }
            }

            @if products.is_empty() {
                li class="rounded border border-dashed border-gray-300 bg-white px-4 py-6 text-center text-sm text-gray-500 dark:border-gray-700 dark:bg-gray-800 dark:text-gray-400"
                {
                    "No products in the catalogue."
                }
            }
        }
    )
}
