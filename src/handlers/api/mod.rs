mod orders;

pub use orders::*;

use axum::{
    Router,
    routing::{get, post},
};

use crate::db::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/checkout-cod/{checkout_id}", post(commit_cod_checkout))
        .route("/api/orders/{id}", get(get_order))
        .route("/api/users/{uid}/orders", get(list_user_orders))
}
