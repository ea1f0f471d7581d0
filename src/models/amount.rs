//! Money amounts.
//!
//! Checkout payloads carry prices as plain JSON numbers, integer or decimal
//! (`1000`, `1000.0`, `499.5`). Arithmetic runs on [`Decimal`] so totals are
//! exact; the payload itself keeps its original [`Number`] representation.

use std::str::FromStr;

pub use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde_json::Number;

/// Exact decimal value of a JSON number, `None` when it is out of range.
pub fn decimal_from_number(number: &Number) -> Option<Decimal> {
    if let Some(value) = number.as_i64() {
        return Some(Decimal::from(value));
    }
    if let Some(value) = number.as_u64() {
        return Some(Decimal::from(value));
    }
    let text = number.to_string();
    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .ok()
}

/// Whole-number value of a JSON number. Integer-valued floats such as `2.0`
/// are accepted; fractions are not.
pub fn integer_from_number(number: &Number) -> Option<i64> {
    decimal_from_number(number)
        .filter(|value| value.fract().is_zero())
        .and_then(|value| value.to_i64())
}

/// JSON number for an amount: whole values are written as integers.
pub fn decimal_to_number(amount: Decimal) -> Option<Number> {
    let amount = amount.normalize();
    if amount.fract().is_zero() {
        if let Some(value) = amount.to_i64() {
            return Some(Number::from(value));
        }
    }
    amount.to_f64().and_then(Number::from_f64)
}

/// Serde adapter writing a [`Decimal`] as a JSON number instead of a string.
pub mod json_number {
    use rust_decimal::Decimal;
    use serde::de::Error as _;
    use serde::ser::Error as _;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use serde_json::Number;

    pub fn serialize<S: Serializer>(amount: &Decimal, serializer: S) -> Result<S::Ok, S::Error> {
        let number = super::decimal_to_number(*amount)
            .ok_or_else(|| S::Error::custom(format!("amount {} is not representable", amount)))?;
        number.serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Decimal, D::Error> {
        let number = Number::deserialize(deserializer)?;
        super::decimal_from_number(&number)
            .ok_or_else(|| D::Error::custom(format!("amount {} is out of range", number)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn number(value: serde_json::Value) -> Number {
        match value {
            serde_json::Value::Number(n) => n,
            other => panic!("not a number: {}", other),
        }
    }

    #[test]
    fn test_decimal_from_integer_and_float() {
        assert_eq!(decimal_from_number(&number(json!(1000))), Some(Decimal::from(1000)));
        assert_eq!(decimal_from_number(&number(json!(1000.0))), Some(Decimal::from(1000)));
        assert_eq!(
            decimal_from_number(&number(json!(499.5))),
            Some(Decimal::new(4995, 1))
        );
    }

    #[test]
    fn test_integer_accepts_whole_floats_only() {
        assert_eq!(integer_from_number(&number(json!(2))), Some(2));
        assert_eq!(integer_from_number(&number(json!(2.0))), Some(2));
        assert_eq!(integer_from_number(&number(json!(2.5))), None);
    }

    #[test]
    fn test_whole_amounts_serialize_as_integers() {
        let whole = Decimal::new(9990, 1);
        assert_eq!(decimal_to_number(whole), Some(Number::from(999)));

        let fraction = Decimal::new(9995, 1);
        assert_eq!(decimal_to_number(fraction), Number::from_f64(999.5));
    }
}
