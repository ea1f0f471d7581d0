use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, params};
use serde_json::Value;

use crate::error::{AppError, Result};
use crate::models::*;

use super::from_row::{ORDER_COLS, PRODUCT_COLS, USER_COLS, query_all, query_one};

pub fn now() -> i64 {
    Utc::now().timestamp()
}

// ============ Checkout Sessions ============

/// Store a checkout session payload under a payment-mode partition.
///
/// The lookup key is read from the payload's own `id` field, so a stored row
/// can never be found under an id its checkout does not carry. The row key is
/// assigned by the store; lookups go through [`get_checkout_by_legacy_id`].
pub fn create_checkout_session(
    conn: &Connection,
    payment_mode: PaymentMode,
    session: &Value,
) -> Result<i64> {
    let legacy_id = session
        .get("id")
        .and_then(Value::as_str)
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest("session.id must be a non-empty string".into()))?;

    conn.execute(
        "INSERT INTO checkout_sessions (id, payment_mode, data, created_at)
         VALUES (?1, ?2, ?3, ?4)",
        params![legacy_id, payment_mode.as_ref(), session.to_string(), now()],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Raw payload of the first session in `payment_mode` whose `id` field matches.
pub fn get_checkout_by_legacy_id(
    conn: &Connection,
    payment_mode: PaymentMode,
    legacy_id: &str,
) -> Result<Option<String>> {
    conn.query_row(
        "SELECT data FROM checkout_sessions
         WHERE payment_mode = ?1 AND id = ?2
         ORDER BY doc_id LIMIT 1",
        params![payment_mode.as_ref(), legacy_id],
        |row| row.get(0),
    )
    .optional()
    .map_err(Into::into)
}

// ============ Orders ============

pub fn get_order(conn: &Connection, id: &str) -> Result<Option<Order>> {
    query_one(
        conn,
        &format!("SELECT {} FROM orders WHERE id = ?1", ORDER_COLS),
        params![id],
    )
}

pub fn list_orders_for_user(conn: &Connection, uid: &str) -> Result<Vec<Order>> {
    query_all(
        conn,
        &format!(
            "SELECT {} FROM orders WHERE uid = ?1 ORDER BY created_at DESC, id",
            ORDER_COLS
        ),
        params![uid],
    )
}

/// Conditionally create an order, returning whether this call created it.
///
/// Uses INSERT OR IGNORE keyed on the order id, so an existing order is
/// never overwritten and `Ok(false)` means the id was already taken.
pub fn create_order(conn: &Connection, order: &Order) -> Result<bool> {
    let checkout = serde_json::to_string(&order.checkout)
        .map_err(|e| AppError::Internal(format!("Failed to encode checkout: {}", e)))?;

    let affected = conn.execute(
        "INSERT OR IGNORE INTO orders (id, uid, payment_mode, amount, checkout, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            &order.id,
            &order.uid,
            order.payment_mode.as_ref(),
            order.payment.amount.to_string(),
            checkout,
            order.timestamp_create
        ],
    )?;
    Ok(affected > 0)
}

// ============ Users ============

pub fn get_user(conn: &Connection, uid: &str) -> Result<Option<User>> {
    query_one(
        conn,
        &format!("SELECT {} FROM users WHERE id = ?1", USER_COLS),
        params![uid],
    )
}

/// Overwrite the user's cart list, creating the user document if needed.
pub fn update_user_carts(conn: &Connection, uid: &str, carts: &[CartItem]) -> Result<()> {
    let carts = serde_json::to_string(carts)
        .map_err(|e| AppError::Internal(format!("Failed to encode carts: {}", e)))?;
    let now = now();

    conn.execute(
        "INSERT INTO users (id, carts, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?3)
         ON CONFLICT(id) DO UPDATE SET carts = excluded.carts, updated_at = excluded.updated_at",
        params![uid, carts, now],
    )?;
    Ok(())
}

// ============ Products ============

pub fn create_product(conn: &Connection, input: &CreateProduct) -> Result<Product> {
    let now = now();

    conn.execute(
        "INSERT INTO products (id, name, orders, created_at) VALUES (?1, ?2, 0, ?3)",
        params![&input.id, &input.name, now],
    )?;

    Ok(Product {
        id: input.id.clone(),
        name: input.name.clone(),
        orders: 0,
        created_at: now,
    })
}

pub fn get_product_by_id(conn: &Connection, id: &str) -> Result<Option<Product>> {
    query_one(
        conn,
        &format!("SELECT {} FROM products WHERE id = ?1", PRODUCT_COLS),
        params![id],
    )
}

/// Increment the `orders` counter of every listed product as one unit.
///
/// Runs under a savepoint: if any product is missing or a write fails, none
/// of the increments are kept. Nests inside an enclosing transaction.
pub fn batch_increment_product_counters(
    conn: &Connection,
    increments: &[(&str, i64)],
) -> Result<()> {
    conn.execute_batch("SAVEPOINT product_counters")?;

    match apply_increments(conn, increments) {
        Ok(()) => {
            conn.execute_batch("RELEASE product_counters")?;
            Ok(())
        }
        Err(e) => {
            conn.execute_batch("ROLLBACK TO product_counters; RELEASE product_counters")?;
            Err(e)
        }
    }
}

fn apply_increments(conn: &Connection, increments: &[(&str, i64)]) -> Result<()> {
    let mut stmt = conn.prepare("UPDATE products SET orders = orders + ?1 WHERE id = ?2")?;
    for (product_id, quantity) in increments {
        let affected = stmt.execute(params![quantity, product_id])?;
        if affected == 0 {
            return Err(AppError::Persistence(format!(
                "Product {} not found",
                product_id
            )));
        }
    }
    Ok(())
}
