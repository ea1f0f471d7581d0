use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use serde::Deserialize;

use crate::db::{AppState, DbPool};
use crate::error::{AppError, Result};
use crate::extractors::Query;
use crate::orders::{commit_order, lookup_checkout};
use crate::views::CheckoutView;

#[derive(Debug, Deserialize)]
pub struct CheckoutCodQuery {
    #[serde(default)]
    pub checkout_id: Option<String>,
}

/// Result of committing a COD checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodCommit {
    /// Id of the committed checkout, which is also the order id
    pub order_id: String,
    /// False when the order already existed
    pub created: bool,
}

/// Look up a COD checkout and commit it.
pub fn process_cod_checkout(db: &DbPool, checkout_id: Option<&str>) -> Result<CodCommit> {
    let checkout_id = checkout_id
        .filter(|id| !id.is_empty())
        .ok_or_else(|| AppError::BadRequest("Checkout ID is required".into()))?;

    let mut conn = db.get()?;
    let checkout = lookup_checkout(&conn, Some(checkout_id))?;
    let created = commit_order(&mut conn, &checkout)?;

    Ok(CodCommit {
        order_id: checkout.id,
        created,
    })
}

/// Confirmation page the storefront redirects to after a COD checkout.
///
/// Fresh and repeated submissions both render the success page. Any failure
/// renders the failure page with the error message, using the error's
/// status code.
pub async fn checkout_cod_page(
    State(state): State<AppState>,
    Query(query): Query<CheckoutCodQuery>,
) -> Response {
    let outcome = process_cod_checkout(&state.db, query.checkout_id.as_deref())
        .map(|commit| commit.created);

    let status = match &outcome {
        Ok(created) => {
            if !created {
                tracing::info!(
                    "Checkout {:?} was already processed, showing confirmation",
                    query.checkout_id
                );
            }
            StatusCode::OK
        }
        Err(e) if e.is_persistence() => {
            tracing::error!("Store failure processing checkout {:?}: {}", query.checkout_id, e);
            e.status_code()
        }
        Err(e) if e.status_code().is_server_error() => {
            tracing::error!("Error processing checkout: {}", e);
            e.status_code()
        }
        Err(e) => {
            tracing::warn!("Checkout {:?} rejected: {}", query.checkout_id, e);
            e.status_code()
        }
    };

    match CheckoutView::from_outcome(&outcome).render(&state.orders_page_url, &state.home_url) {
        Ok(html) => (status, Html(html)).into_response(),
        Err(e) => e.into_response(),
    }
}
