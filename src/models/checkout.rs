use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use strum::{AsRefStr, EnumString};

use super::amount::{Decimal, decimal_from_number, integer_from_number};

/// Partition a checkout session was created under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, AsRefStr, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PaymentMode {
    /// Cash on delivery
    Cod,
    /// Card / hosted payment flow (never committed by this service)
    Online,
}

/// Checkout session as created by the storefront.
///
/// Every level keeps unknown fields in `extra` so the full record can be
/// embedded into an order unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckoutSession {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<CheckoutMetadata>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_items: Option<Vec<LineItem>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CheckoutMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_data: Option<PriceData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<Number>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceData {
    /// Unit price, integer or decimal. Kept as the stored number so the
    /// embedded checkout is written back unchanged.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_amount: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_data: Option<ProductData>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ProductMetadata>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductMetadata {
    #[serde(
        rename = "productId",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub product_id: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CheckoutSession {
    pub fn uid(&self) -> Option<&str> {
        self.metadata.as_ref().and_then(|m| m.uid.as_deref())
    }

    pub fn line_items(&self) -> &[LineItem] {
        self.line_items.as_deref().unwrap_or_default()
    }
}

impl LineItem {
    /// Unit price, 0 when absent. `None` when the number does not fit a decimal.
    pub fn unit_amount(&self) -> Option<Decimal> {
        match self.price_data.as_ref().and_then(|p| p.unit_amount.as_ref()) {
            Some(number) => decimal_from_number(number),
            None => Some(Decimal::ZERO),
        }
    }

    /// Quantity, 0 when absent. `None` when it is not a whole number.
    pub fn quantity(&self) -> Option<i64> {
        match &self.quantity {
            Some(number) => integer_from_number(number),
            None => Some(0),
        }
    }

    pub fn product_id(&self) -> Option<&str> {
        self.price_data
            .as_ref()
            .and_then(|p| p.product_data.as_ref())
            .and_then(|d| d.metadata.as_ref())
            .and_then(|m| m.product_id.as_deref())
    }
}

/// Input for storing a checkout session (dev tooling and tests).
#[derive(Debug, Deserialize)]
pub struct CreateCheckoutSession {
    #[serde(default = "default_payment_mode")]
    pub payment_mode: PaymentMode,
    /// Raw session payload; must carry a string `id`.
    pub session: Value,
}

fn default_payment_mode() -> PaymentMode {
    PaymentMode::Cod
}
