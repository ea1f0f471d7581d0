use axum::{
    Router,
    extract::State,
    http::StatusCode,
    routing::{post, put},
};
use serde::Serialize;

use crate::db::{AppState, queries};
use crate::error::{AppError, Result};
use crate::extractors::{Json, Path};
use crate::models::{CartItem, CreateCheckoutSession, CreateProduct, PaymentMode, Product, User};

/// Seeding routes for local testing. Only mounted in dev mode.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/dev/checkout-sessions", post(create_dev_checkout_session))
        .route("/dev/products", post(create_dev_product))
        .route("/dev/users/{uid}/carts", put(set_dev_user_carts))
}

#[derive(Debug, Serialize)]
pub struct DevCheckoutSessionCreated {
    pub checkout_id: String,
    pub payment_mode: PaymentMode,
    /// Confirmation page URL for this session
    pub confirm_url: String,
}

pub async fn create_dev_checkout_session(
    State(state): State<AppState>,
    Json(input): Json<CreateCheckoutSession>,
) -> Result<(StatusCode, Json<DevCheckoutSessionCreated>)> {
    let conn = state.db.get()?;
    queries::create_checkout_session(&conn, input.payment_mode, &input.session)?;

    let checkout_id = input.session["id"].as_str().unwrap_or_default().to_string();

    tracing::info!(
        "DEV: Stored {} checkout session {}",
        input.payment_mode.as_ref(),
        checkout_id
    );

    Ok((
        StatusCode::CREATED,
        Json(DevCheckoutSessionCreated {
            confirm_url: format!("/checkout-cod?checkout_id={}", checkout_id),
            checkout_id,
            payment_mode: input.payment_mode,
        }),
    ))
}

pub async fn create_dev_product(
    State(state): State<AppState>,
    Json(input): Json<CreateProduct>,
) -> Result<(StatusCode, Json<Product>)> {
    let conn = state.db.get()?;
    if queries::get_product_by_id(&conn, &input.id)?.is_some() {
        return Err(AppError::BadRequest(format!("Product {} already exists", input.id)));
    }

    let product = queries::create_product(&conn, &input)?;
    tracing::info!("DEV: Created product {} ({})", product.id, product.name);

    Ok((StatusCode::CREATED, Json(product)))
}

pub async fn set_dev_user_carts(
    State(state): State<AppState>,
    Path(uid): Path<String>,
    Json(carts): Json<Vec<CartItem>>,
) -> Result<Json<User>> {
    let conn = state.db.get()?;
    queries::update_user_carts(&conn, &uid, &carts)?;

    let user = queries::get_user(&conn, &uid)?
        .ok_or_else(|| AppError::Internal("User missing after cart update".into()))?;
    Ok(Json(user))
}
