use axum::{extract::State, http::StatusCode};
use serde::Serialize;

use crate::db::{AppState, queries};
use crate::error::{AppError, Result};
use crate::extractors::{Json, Path};
use crate::handlers::public::process_cod_checkout;
use crate::models::{Decimal, Order, json_number};

#[derive(Debug, Serialize)]
pub struct CommitResponse {
    pub order_id: String,
    /// False when the order already existed (repeated submission)
    pub created: bool,
    #[serde(with = "json_number")]
    pub amount: Decimal,
}

/// Commit a COD checkout and report whether this request created the order.
///
/// 201 for a new order, 200 for a duplicate.
pub async fn commit_cod_checkout(
    State(state): State<AppState>,
    Path(checkout_id): Path<String>,
) -> Result<(StatusCode, Json<CommitResponse>)> {
    let commit = process_cod_checkout(&state.db, Some(&checkout_id))?;

    let conn = state.db.get()?;
    let order = queries::get_order(&conn, &commit.order_id)?
        .ok_or_else(|| AppError::Internal("Order missing after commit".into()))?;

    let status = if commit.created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };

    Ok((
        status,
        Json(CommitResponse {
            order_id: order.id,
            created: commit.created,
            amount: order.payment.amount,
        }),
    ))
}

pub async fn get_order(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Order>> {
    let conn = state.db.get()?;
    let order = queries::get_order(&conn, &id)?
        .ok_or_else(|| AppError::NotFound("Order not found".into()))?;
    Ok(Json(order))
}

/// Orders for a user, newest first. Backs the storefront's orders page.
pub async fn list_user_orders(
    State(state): State<AppState>,
    Path(uid): Path<String>,
) -> Result<Json<Vec<Order>>> {
    let conn = state.db.get()?;
    Ok(Json(queries::list_orders_for_user(&conn, &uid)?))
}
