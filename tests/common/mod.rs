//! Shared fixtures for integration tests.

#![allow(dead_code)]

use axum::{Router, body::Body, http::Request, response::Response};
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::Connection;
use serde_json::{Value, json};
use tower::ServiceExt;

pub use cod_checkout::db::{AppState, DbPool, queries};
pub use cod_checkout::models::*;

/// Single-connection in-memory pool: every `get()` sees the same database.
/// Release the connection before sending requests through an app.
pub fn create_test_pool() -> DbPool {
    let manager = SqliteConnectionManager::memory();
    let pool = Pool::builder().max_size(1).build(manager).unwrap();
    {
        let conn = pool.get().unwrap();
        cod_checkout::db::init_db(&conn).unwrap();
    }
    pool
}

pub fn create_test_app_state() -> AppState {
    AppState {
        db: create_test_pool(),
        orders_page_url: "/account".to_string(),
        home_url: "/".to_string(),
    }
}

pub fn public_app(state: AppState) -> Router {
    cod_checkout::handlers::app(state, false)
}

pub fn dev_app(state: AppState) -> Router {
    cod_checkout::handlers::app(state, true)
}

pub async fn send(app: Router, method: &str, uri: &str, body: Option<Value>) -> Response {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.oneshot(request).await.unwrap()
}

pub async fn body_text(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub async fn body_json(response: Response) -> Value {
    serde_json::from_str(&body_text(response).await).expect("Response should be valid JSON")
}

/// A line item priced at `unit_amount` for `product_id`.
pub fn line_item(product_id: &str, unit_amount: i64, quantity: i64) -> Value {
    json!({
        "price_data": {
            "currency": "inr",
            "unit_amount": unit_amount,
            "product_data": {
                "name": format!("Product {}", product_id),
                "metadata": {"productId": product_id}
            }
        },
        "quantity": quantity
    })
}

pub fn checkout_json(id: &str, uid: Option<&str>, line_items: Vec<Value>) -> Value {
    let mut session = json!({
        "id": id,
        "mode": "payment",
        "line_items": line_items,
    });
    if let Some(uid) = uid {
        session["metadata"] = json!({"uid": uid});
    }
    session
}

pub fn checkout(id: &str, uid: Option<&str>, line_items: Vec<Value>) -> CheckoutSession {
    serde_json::from_value(checkout_json(id, uid, line_items)).unwrap()
}

pub fn store_checkout(conn: &Connection, mode: PaymentMode, session: &Value) {
    queries::create_checkout_session(conn, mode, session).unwrap();
}

/// Write a session row directly, bypassing payload validation.
pub fn insert_raw_checkout(conn: &Connection, mode: PaymentMode, id: &str, data: &str) {
    conn.execute(
        "INSERT INTO checkout_sessions (id, payment_mode, data, created_at) VALUES (?1, ?2, ?3, 0)",
        rusqlite::params![id, mode.as_ref(), data],
    )
    .unwrap();
}

pub fn store_cod_checkout(conn: &Connection, session: &Value) {
    store_checkout(conn, PaymentMode::Cod, session);
}

pub fn create_test_product(conn: &Connection, id: &str) -> Product {
    queries::create_product(
        conn,
        &CreateProduct {
            id: id.to_string(),
            name: format!("Product {}", id),
        },
    )
    .unwrap()
}

pub fn product_orders(conn: &Connection, id: &str) -> i64 {
    queries::get_product_by_id(conn, id).unwrap().unwrap().orders
}

pub fn count_orders(conn: &Connection) -> i64 {
    conn.query_row("SELECT COUNT(*) FROM orders", [], |row| row.get(0))
        .unwrap()
}

pub fn cart_ids(conn: &Connection, uid: &str) -> Vec<String> {
    queries::get_user(conn, uid)
        .unwrap()
        .map(|u| u.carts.into_iter().filter_map(|c| c.id).collect())
        .unwrap_or_default()
}

pub fn set_cart(conn: &Connection, uid: &str, ids: &[&str]) {
    let carts: Vec<CartItem> = ids.iter().map(|id| CartItem::new(*id)).collect();
    queries::update_user_carts(conn, uid, &carts).unwrap();
}
