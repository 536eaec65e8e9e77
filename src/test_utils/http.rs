use axum::{body::Body, response::Response};

#[track_caller]
pub(crate) fn get_header(response: &Response<Body>, header_name: &str) -> String {
    response
        .headers()
        .get(header_name)
        .unwrap_or_else(|| panic!("Response is missing the {header_name} header"))
        .to_str()
        .expect("Header value is not valid UTF-8")
        .to_string()
}

#[track_caller]
pub(crate) fn assert_hx_redirect(response: &Response<Body>, endpoint: &str) {
    assert_eq!(
        get_header(response, "hx-redirect"),
        endpoint,
        "want a redirect to \"{endpoint}\""
    );
}
