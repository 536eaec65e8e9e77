//! Alert fragments for reporting operation outcomes.
//!
//! Endpoints return these fragments instead of queueing session flash
//! messages. Success responses render into the alert container directly,
//! error responses are routed there by `hx-target-error`.

use axum::response::{IntoResponse, Response};
use maud::{Markup, PreEscaped, html};

const SUCCESS_STYLE: &str = "flex items-start gap-3 rounded-lg border \
    border-green-300 bg-green-50 p-4 text-sm text-green-800 shadow-lg \
    dark:border-green-800 dark:bg-gray-800 dark:text-green-400";

const ERROR_STYLE: &str = "flex items-start gap-3 rounded-lg border \
    border-red-300 bg-red-50 p-4 text-sm text-red-800 shadow-lg \
    dark:border-red-800 dark:bg-gray-800 dark:text-red-400";

const DISMISS_BUTTON_STYLE: &str = "ms-auto -mx-1.5 -my-1.5 rounded-lg p-1.5 \
    hover:bg-gray-200 focus:ring-2 focus:ring-gray-300 dark:hover:bg-gray-700";

/// The alert container starts out hidden, so each alert unhides it on arrival.
const SHOW_CONTAINER_SCRIPT: &str =
    "document.getElementById('alert-container').classList.remove('hidden');";

/// A one-shot notification for the outcome of an operation.
#[derive(Debug, Clone, PartialEq)]
pub enum Alert {
    /// An operation succeeded, with extra context for the user.
    #[allow(dead_code)]
    Success {
        /// The headline shown in bold.
        message: String,
        /// Supporting detail shown under the headline.
        details: String,
    },
    /// An operation succeeded and the headline says it all.
    #[allow(dead_code)]
    SuccessSimple {
        /// The headline shown in bold.
        message: String,
    },
    /// An operation failed, with extra context for the user.
    Error {
        /// The headline shown in bold.
        message: String,
        /// Supporting detail shown under the headline.
        details: String,
    },
    /// An operation failed and the headline says it all.
    #[allow(dead_code)]
    ErrorSimple {
        /// The headline shown in bold.
        message: String,
    },
}

impl Alert {
    /// Render the alert as an HTML fragment for the alert container.
    pub fn into_html(self) -> Markup {
        let (style, message, details) = match self {
            Alert::Success { message, details } => (SUCCESS_STYLE, message, Some(details)),
            Alert::SuccessSimple { message } => (SUCCESS_STYLE, message, None),
            Alert::Error { message, details } => (ERROR_STYLE, message, Some(details)),
            Alert::ErrorSimple { message } => (ERROR_STYLE, message, None),
        };

        html! {
            // Template adapted from https://flowbite.com/docs/components/alerts/
            div class=(style) role="alert" {
                div class="flex-1" {
                    p class="font-medium" { (message) }

                    @if let Some(details) = details {
                        @if !details.is_empty() {
                            p class="mt-1" { (details) }
                        }
                    }
                }

                button
                    type="button"
                    class=(DISMISS_BUTTON_STYLE)
                    aria-label="Dismiss"
                    onclick="document.getElementById('alert-container').classList.add('hidden')"
                {
                    (PreEscaped("&times;"))
                }
            }

            script { (PreEscaped(SHOW_CONTAINER_SCRIPT)) }
        }
    }
}

impl IntoResponse for Alert {
    fn into_response(self) -> Response {
        self.into_html().into_response()
    }
}

#[cfg(test)]
mod alert_tests {
    use scraper::{Html, Selector};

    use super::Alert;

    #[test]
    fn success_alert_renders_message() {
        let alert = Alert::SuccessSimple {
            message: "Purchase recorded".to_owned(),
        };

        let html = Html::parse_fragment(&alert.into_html().into_string());

        let alert_selector = Selector::parse("div[role='alert']").unwrap();
        let alert_element = html
            .select(&alert_selector)
            .next()
            .expect("No alert element found");
        let text = alert_element.text().collect::<Vec<_>>().join("");
        assert!(
            text.contains("Purchase recorded"),
            "want alert text to contain \"Purchase recorded\", got {text:?}"
        );
    }

    #[test]
    fn error_alert_renders_details() {
        let alert = Alert::Error {
            message: "Not enough stock".to_owned(),
            details: "Only 3 left in stock.".to_owned(),
        };

        let html = Html::parse_fragment(&alert.into_html().into_string());

        let paragraph_selector = Selector::parse("p").unwrap();
        let paragraphs = html
            .select(&paragraph_selector)
            .map(|p| p.text().collect::<Vec<_>>().join(""))
            .collect::<Vec<_>>();
        assert_eq!(
            paragraphs,
            vec!["Not enough stock", "Only 3 left in stock."]
        );
    }
}
