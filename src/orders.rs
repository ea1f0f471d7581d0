//! COD checkout lookup and order commit.
//!
//! [`lookup_checkout`] resolves a checkout id to a validated
//! [`CheckoutSession`]; [`commit_order`] turns it into an order exactly once,
//! pruning the buyer's cart and bumping product order counters alongside it.

use rusqlite::{Connection, TransactionBehavior};
use serde_json::Value;

use crate::db::queries;
use crate::error::{AppError, Result};
use crate::models::{
    CartItem, CheckoutSession, Decimal, LineItem, Order, OrderedProduct, Payment, PaymentMode,
};

fn invalid_format() -> AppError {
    AppError::InvalidRecord("Invalid Checkout Data Format".into())
}

/// Resolve a checkout id to its session in the cash-on-delivery partition.
///
/// Sessions stored under any other payment mode never match.
pub fn lookup_checkout(conn: &Connection, checkout_id: Option<&str>) -> Result<CheckoutSession> {
    let checkout_id = checkout_id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest("Invalid or missing Checkout ID".into()))?;

    let raw = queries::get_checkout_by_legacy_id(conn, PaymentMode::Cod, checkout_id)?
        .ok_or_else(|| AppError::NotFound("No Checkout Found for the provided ID".into()))?;

    let checkout = parse_checkout(&raw)?;
    if checkout.id != checkout_id {
        tracing::warn!(
            "Stored checkout under {} carries id {:?}",
            checkout_id,
            checkout.id
        );
        return Err(invalid_format());
    }

    Ok(checkout)
}

/// Decode a stored session payload, rejecting anything that is not a
/// well-formed checkout object.
pub fn parse_checkout(raw: &str) -> Result<CheckoutSession> {
    let value: Value = serde_json::from_str(raw).map_err(|e| {
        tracing::warn!("Stored checkout is not valid JSON: {}", e);
        invalid_format()
    })?;
    if !value.is_object() {
        return Err(invalid_format());
    }

    let checkout: CheckoutSession = serde_json::from_value(value).map_err(|e| {
        tracing::warn!("Stored checkout has an unexpected shape: {}", e);
        invalid_format()
    })?;

    // Amounts may be any non-negative number; quantities must be whole.
    let unusable = checkout.line_items().iter().any(|item| {
        !item.unit_amount().is_some_and(|amount| amount >= Decimal::ZERO)
            || !item.quantity().is_some_and(|quantity| quantity >= 0)
    });
    if checkout.id.is_empty() || unusable {
        return Err(invalid_format());
    }

    Ok(checkout)
}

/// Sum of `unit_amount * quantity` in exact decimal arithmetic, absent
/// values counting as 0.
pub fn compute_amount(items: &[LineItem]) -> Result<Decimal> {
    items.iter().try_fold(Decimal::ZERO, |total, item| -> Result<Decimal> {
        let unit_amount = item.unit_amount().ok_or_else(invalid_format)?;
        let quantity = item.quantity().ok_or_else(invalid_format)?;
        unit_amount
            .checked_mul(Decimal::from(quantity))
            .and_then(|line| total.checked_add(line))
            .ok_or_else(|| AppError::InvalidRecord("Checkout amount is out of range".into()))
    })
}

/// One entry per line item, in order. Items without a product id are kept.
pub fn ordered_products(checkout: &CheckoutSession) -> Result<Vec<OrderedProduct>> {
    checkout
        .line_items()
        .iter()
        .map(|item| -> Result<OrderedProduct> {
            Ok(OrderedProduct {
                product_id: item.product_id().map(String::from),
                quantity: item.quantity().ok_or_else(invalid_format)?,
            })
        })
        .collect()
}

/// Drop cart entries for any of `product_ids`, keeping the rest in order.
pub fn prune_cart(carts: Vec<CartItem>, product_ids: &[&str]) -> Vec<CartItem> {
    carts
        .into_iter()
        .filter(|item| {
            !item
                .id
                .as_deref()
                .is_some_and(|id| product_ids.contains(&id))
        })
        .collect()
}

/// Commit a checkout as an order.
///
/// Returns `Ok(true)` when this call created the order and `Ok(false)` when
/// an order for `checkout.id` already existed, in which case nothing is
/// written.
///
/// The existence check, order insert, cart rewrite and counter batch share
/// one IMMEDIATE transaction: concurrent commits for the same checkout are
/// serialized, and a failure anywhere leaves the store untouched.
pub fn commit_order(conn: &mut Connection, checkout: &CheckoutSession) -> Result<bool> {
    if checkout.id.trim().is_empty() {
        return Err(AppError::BadRequest("Invalid Checkout Data".into()));
    }

    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

    if queries::get_order(&tx, &checkout.id)?.is_some() {
        tracing::info!("Order {} already exists, nothing to do", checkout.id);
        return Ok(false);
    }

    let uid = checkout.uid().map(String::from);
    let order = Order {
        id: checkout.id.clone(),
        checkout: checkout.clone(),
        payment: Payment {
            amount: compute_amount(checkout.line_items())?,
        },
        uid: uid.clone(),
        payment_mode: PaymentMode::Cod,
        timestamp_create: queries::now(),
    };

    if !queries::create_order(&tx, &order)? {
        return Ok(false);
    }

    let products = ordered_products(checkout)?;
    let mut increments = Vec::with_capacity(products.len());
    for product in &products {
        match product.product_id.as_deref() {
            Some(id) => increments.push((id, product.quantity)),
            None => tracing::warn!(
                "Order {}: line item without productId skipped for cart and counters",
                order.id
            ),
        }
    }
    let product_ids: Vec<&str> = increments.iter().map(|(id, _)| *id).collect();

    match uid.as_deref() {
        Some(uid) => {
            let carts = queries::get_user(&tx, uid)?
                .map(|user| user.carts)
                .unwrap_or_default();
            let remaining = prune_cart(carts, &product_ids);
            queries::update_user_carts(&tx, uid, &remaining)?;
        }
        None => tracing::warn!("Order {} has no uid, cart left unchanged", order.id),
    }

    queries::batch_increment_product_counters(&tx, &increments)?;

    tx.commit()?;

    tracing::info!(
        "COD order created: id={}, uid={:?}, amount={}, items={}",
        order.id,
        order.uid,
        order.payment.amount,
        products.len()
    );

    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn checkout(value: Value) -> CheckoutSession {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_amount_treats_missing_quantity_as_zero() {
        let checkout = checkout(json!({
            "id": "cs_amount",
            "line_items": [
                {"price_data": {"unit_amount": 1000}, "quantity": 2},
                {"price_data": {"unit_amount": 500}}
            ]
        }));
        assert_eq!(compute_amount(checkout.line_items()).unwrap(), Decimal::from(2000));
    }

    #[test]
    fn test_amount_of_no_line_items_is_zero() {
        assert_eq!(compute_amount(&[]).unwrap(), Decimal::ZERO);
    }

    #[test]
    fn test_amount_with_decimal_unit_price() {
        let checkout = checkout(json!({
            "id": "cs_decimal",
            "line_items": [{"price_data": {"unit_amount": 499.5}, "quantity": 2}]
        }));
        assert_eq!(compute_amount(checkout.line_items()).unwrap(), Decimal::from(999));
    }

    #[test]
    fn test_amount_with_float_written_integers() {
        let checkout = checkout(json!({
            "id": "cs_float",
            "line_items": [{"price_data": {"unit_amount": 1000.0}, "quantity": 2.0}]
        }));
        assert_eq!(compute_amount(checkout.line_items()).unwrap(), Decimal::from(2000));
    }

    #[test]
    fn test_amount_overflow_is_invalid_record() {
        let checkout = checkout(json!({
            "id": "cs_big",
            "line_items": [{"price_data": {"unit_amount": u64::MAX}, "quantity": i64::MAX}]
        }));
        assert!(matches!(
            compute_amount(checkout.line_items()),
            Err(AppError::InvalidRecord(_))
        ));
    }

    #[test]
    fn test_prune_cart_keeps_unrelated_entries_in_order() {
        let carts = vec![CartItem::new("A"), CartItem::new("B"), CartItem::new("C")];
        assert_eq!(prune_cart(carts, &["A", "C"]), vec![CartItem::new("B")]);
    }

    #[test]
    fn test_prune_cart_keeps_entries_without_id() {
        let anonymous: CartItem = serde_json::from_value(json!({"note": "gift wrap"})).unwrap();
        let carts = vec![anonymous.clone(), CartItem::new("A")];
        assert_eq!(prune_cart(carts, &["A"]), vec![anonymous]);
    }

    #[test]
    fn test_ordered_products_keeps_items_without_product_id() {
        let checkout = checkout(json!({
            "id": "cs_products",
            "line_items": [
                {"price_data": {"product_data": {"metadata": {"productId": "P1"}}}, "quantity": 3},
                {"quantity": 1}
            ]
        }));
        assert_eq!(
            ordered_products(&checkout).unwrap(),
            vec![
                OrderedProduct { product_id: Some("P1".into()), quantity: 3 },
                OrderedProduct { product_id: None, quantity: 1 },
            ]
        );
    }

    #[test]
    fn test_parse_rejects_non_object_payload() {
        for raw in ["[1, 2]", "\"cs_1\"", "null", "not json"] {
            assert!(
                matches!(parse_checkout(raw), Err(AppError::InvalidRecord(_))),
                "payload {} should be rejected",
                raw
            );
        }
    }

    #[test]
    fn test_parse_rejects_negative_quantity() {
        let raw = json!({"id": "cs_neg", "line_items": [{"quantity": -1}]}).to_string();
        assert!(matches!(parse_checkout(&raw), Err(AppError::InvalidRecord(_))));
    }

    #[test]
    fn test_parse_accepts_decimal_and_float_amounts() {
        for (unit_amount, expected) in [(json!(499.5), 999), (json!(1000.0), 2000)] {
            let raw = json!({
                "id": "cs_price",
                "line_items": [{"price_data": {"unit_amount": unit_amount}, "quantity": 2}]
            })
            .to_string();
            let checkout = parse_checkout(&raw).unwrap();
            assert_eq!(
                compute_amount(checkout.line_items()).unwrap(),
                Decimal::from(expected)
            );
        }
    }

    #[test]
    fn test_parse_rejects_negative_amount() {
        let raw = json!({"id": "cs_neg", "line_items": [{"price_data": {"unit_amount": -0.5}}]})
            .to_string();
        assert!(matches!(parse_checkout(&raw), Err(AppError::InvalidRecord(_))));
    }

    #[test]
    fn test_parse_rejects_fractional_quantity() {
        let raw = json!({"id": "cs_half", "line_items": [{"quantity": 1.5}]}).to_string();
        assert!(matches!(parse_checkout(&raw), Err(AppError::InvalidRecord(_))));
    }

    #[test]
    fn test_parse_rejects_non_numeric_amount() {
        let raw = json!({"id": "cs_text", "line_items": [{"price_data": {"unit_amount": "500"}}]})
            .to_string();
        assert!(matches!(parse_checkout(&raw), Err(AppError::InvalidRecord(_))));
    }
}
