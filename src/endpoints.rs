//! The API endpoints URIs.
//!
//! For endpoints that take a parameter, e.g., '/purchases/{purchase_id}/cancel', use [format_endpoint].

/// The root route which redirects to the dashboard.
pub const ROOT: &str = "/";
/// The landing page with the stock and revenue counters.
pub const DASHBOARD_VIEW: &str = "/dashboard";
/// The page for listing all products with their stock levels.
pub const PRODUCTS_VIEW: &str = "/products";
/// The page for listing purchases, optionally filtered.
pub const PURCHASES_VIEW: &str = "/purchases";
/// The page for recording a new purchase.
pub const NEW_PURCHASE_VIEW: &str = "/purchases/new";
/// The page to display when an internal server error occurs.
pub const INTERNAL_ERROR_VIEW: &str = "/error";
/// The route for static files.
pub const STATIC: &str = "/static";

/// The route to request a cup of coffee (experimental).
pub const COFFEE: &str = "/api/coffee";
/// The route to record a purchase.
pub const POST_PURCHASE: &str = "/api/purchases";
/// The route to cancel a purchase and restore its stock.
pub const CANCEL_PURCHASE: &str = "/api/purchases/{purchase_id}/cancel";

/// Replace the parameter in `endpoint_path` with `id`.
///
/// A parameter is a string that starts with a left brace, followed by
/// lowercase letters or underscores, and ends with a right brace.
/// For example, in the endpoint path '/purchases/{purchase_id}/cancel',
/// '{purchase_id}' is the parameter.
///
/// This function assumes that an endpoint path only contains ASCII characters
/// and a single parameter.
///
/// If no parameter is found in `endpoint_path`, the function returns the
/// the original `endpoint_path`.
pub fn format_endpoint(endpoint_path: &str, id: i64) -> String {
    let mut param_start = None;
    let mut param_end = None;

    for (i, c) in endpoint_path.chars().enumerate() {
        if c == '{' {
            param_start = Some(i);
        } else if param_start.is_some() && c == '}' {
            param_end = Some(i + 1);
            break;
        }
    }

    let param_start = match param_start {
        Some(start) => start,
        None => return endpoint_path.to_string(),
    };

    let param_end = param_end.unwrap_or(endpoint_path.len());

    format!(
        "{}{}{}",
        &endpoint_path[..param_start],
        id,
        &endpoint_path[param_end..]
    )
}
