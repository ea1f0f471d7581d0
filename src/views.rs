//! Confirmation pages for the COD checkout flow.
//!
//! Templates are compiled into the binary and rendered with MiniJinja.
//! `.html` templates are auto-escaped, so error messages are safe to embed.

use std::sync::OnceLock;

use minijinja::{Environment, Value, context};

use crate::error::{AppError, Result};

mod embedded {
    pub const BASE: &str = include_str!("../templates/base.html");
    pub const SUCCESS: &str = include_str!("../templates/checkout_success.html");
    pub const FAILURE: &str = include_str!("../templates/checkout_failure.html");
}

const SUCCESS_TEMPLATE: &str = "checkout_success.html";
const FAILURE_TEMPLATE: &str = "checkout_failure.html";

static ENGINE: OnceLock<Environment<'static>> = OnceLock::new();

fn init_engine() -> Environment<'static> {
    let mut env = Environment::new();

    for (name, source) in [
        ("base.html", embedded::BASE),
        (SUCCESS_TEMPLATE, embedded::SUCCESS),
        (FAILURE_TEMPLATE, embedded::FAILURE),
    ] {
        // A broken template shows up as a render error on first use
        if let Err(e) = env.add_template(name, source) {
            tracing::error!("Failed to load template {}: {}", name, e);
        }
    }

    env
}

fn engine() -> &'static Environment<'static> {
    ENGINE.get_or_init(init_engine)
}

/// Which page to show for a checkout attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutView {
    /// Order created, or already created by an earlier request
    Success,
    Failure { message: String },
}

impl CheckoutView {
    /// Map a commit result onto a view. Duplicates render as success.
    pub fn from_outcome(outcome: &Result<bool>) -> Self {
        match outcome {
            Ok(_) => CheckoutView::Success,
            Err(e) => CheckoutView::Failure {
                message: e.to_string(),
            },
        }
    }

    /// Link targets come from configuration and are inserted unescaped.
    pub fn render(&self, orders_page_url: &str, home_url: &str) -> Result<String> {
        let orders_page_url = Value::from_safe_string(orders_page_url.to_string());
        let home_url = Value::from_safe_string(home_url.to_string());
        let rendered = match self {
            CheckoutView::Success => engine()
                .get_template(SUCCESS_TEMPLATE)
                .and_then(|t| t.render(context! { orders_page_url })),
            CheckoutView::Failure { message } => engine()
                .get_template(FAILURE_TEMPLATE)
                .and_then(|t| t.render(context! { message, home_url })),
        };

        rendered.map_err(|e| AppError::Internal(format!("Failed to render page: {}", e)))
    }
}
