//! Row mapping for the document tables.
//!
//! JSON columns (embedded checkout, cart lists) are decoded here so that a
//! corrupt document surfaces as a conversion error on the offending column.

use rusqlite::{Connection, Params, Row, types::Type};
use serde::de::DeserializeOwned;

use crate::error::Result;
use crate::models::*;

pub const ORDER_COLS: &str = "id, uid, payment_mode, amount, checkout, created_at";
pub const USER_COLS: &str = "id, carts, created_at, updated_at";
pub const PRODUCT_COLS: &str = "id, name, orders, created_at";

pub trait FromRow: Sized {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self>;
}

fn json_col<T: DeserializeOwned>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T> {
    let raw: String = row.get(idx)?;
    serde_json::from_str(&raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn decimal_col(row: &Row<'_>, idx: usize) -> rusqlite::Result<Decimal> {
    let raw: String = row.get(idx)?;
    raw.parse::<Decimal>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

impl FromRow for Order {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        let mode: String = row.get(2)?;
        let payment_mode = mode
            .parse::<PaymentMode>()
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(2, Type::Text, Box::new(e)))?;
        Ok(Order {
            id: row.get(0)?,
            uid: row.get(1)?,
            payment_mode,
            payment: Payment {
                amount: decimal_col(row, 3)?,
            },
            checkout: json_col(row, 4)?,
            timestamp_create: row.get(5)?,
        })
    }
}

impl FromRow for User {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(User {
            id: row.get(0)?,
            carts: json_col(row, 1)?,
            created_at: row.get(2)?,
            updated_at: row.get(3)?,
        })
    }
}

impl FromRow for Product {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Product {
            id: row.get(0)?,
            name: row.get(1)?,
            orders: row.get(2)?,
            created_at: row.get(3)?,
        })
    }
}

pub fn query_one<T: FromRow, P: Params>(conn: &Connection, sql: &str, params: P) -> Result<Option<T>> {
    let mut stmt = conn.prepare(sql)?;
    let mut rows = stmt.query(params)?;
    match rows.next()? {
        Some(row) => Ok(Some(T::from_row(row)?)),
        None => Ok(None),
    }
}

pub fn query_all<T: FromRow, P: Params>(conn: &Connection, sql: &str, params: P) -> Result<Vec<T>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map(params, |row| T::from_row(row))?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}
