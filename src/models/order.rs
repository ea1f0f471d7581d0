use serde::{Deserialize, Serialize};

use super::amount::{Decimal, json_number};
use super::{CheckoutSession, PaymentMode};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    /// Sum of unit_amount * quantity over all line items
    #[serde(with = "json_number")]
    pub amount: Decimal,
}

/// Order committed from a checkout session. Keyed by the checkout id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    pub checkout: CheckoutSession,
    pub payment: Payment,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
    #[serde(rename = "paymentMode")]
    pub payment_mode: PaymentMode,
    #[serde(rename = "timestampCreate")]
    pub timestamp_create: i64,
}

/// One `(productId, quantity)` pair derived from a line item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderedProduct {
    pub product_id: Option<String>,
    pub quantity: i64,
}
