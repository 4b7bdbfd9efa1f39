//! Typed decoding of documents received from the remote data source
//!
//! Offer and order-line documents arrive as loosely typed JSON with camelCase
//! keys. Decoding fails closed: a missing or malformed field is reported as a
//! [`DecodeError`] naming the field instead of being replaced by a default.

use std::collections::BTreeSet;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::models::{DiscountOffer, OrderItem};
use crate::validation::{parse_offer_date, validate_discount_percentage};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("document is not an object")]
    NotAnObject,

    #[error("missing field `{0}`")]
    MissingField(&'static str),

    #[error("invalid field `{field}`: {reason}")]
    InvalidField { field: &'static str, reason: String },
}

fn invalid(field: &'static str, reason: impl Into<String>) -> DecodeError {
    DecodeError::InvalidField {
        field,
        reason: reason.into(),
    }
}

fn field<'a>(doc: &'a Map<String, Value>, name: &'static str) -> Result<&'a Value, DecodeError> {
    match doc.get(name) {
        Some(Value::Null) | None => Err(DecodeError::MissingField(name)),
        Some(value) => Ok(value),
    }
}

fn required_str<'a>(doc: &'a Map<String, Value>, name: &'static str) -> Result<&'a str, DecodeError> {
    field(doc, name)?
        .as_str()
        .ok_or_else(|| invalid(name, "expected a string"))
}

fn required_bool(doc: &Map<String, Value>, name: &'static str) -> Result<bool, DecodeError> {
    field(doc, name)?
        .as_bool()
        .ok_or_else(|| invalid(name, "expected a boolean"))
}

fn required_decimal(doc: &Map<String, Value>, name: &'static str) -> Result<Decimal, DecodeError> {
    match field(doc, name)? {
        Value::Number(n) => Decimal::from_str(&n.to_string())
            .or_else(|_| Decimal::from_scientific(&n.to_string()))
            .map_err(|e| invalid(name, e.to_string())),
        _ => Err(invalid(name, "expected a number")),
    }
}

fn string_set(doc: &Map<String, Value>, name: &'static str) -> Result<BTreeSet<String>, DecodeError> {
    let values = field(doc, name)?
        .as_array()
        .ok_or_else(|| invalid(name, "expected an array"))?;
    values
        .iter()
        .map(|v| {
            v.as_str()
                .map(str::to_string)
                .ok_or_else(|| invalid(name, "expected an array of strings"))
        })
        .collect()
}

/// Decode an offer document belonging to `producer_id`
pub fn decode_offer(producer_id: &str, value: &Value) -> Result<DiscountOffer, DecodeError> {
    let doc = value.as_object().ok_or(DecodeError::NotAnObject)?;

    let id = required_str(doc, "id")?;
    if id.trim().is_empty() {
        return Err(invalid("id", "must not be blank"));
    }

    let discount_value = required_decimal(doc, "discountValue")?;
    validate_discount_percentage(discount_value).map_err(|msg| invalid("discountValue", msg))?;

    let valid_till =
        parse_offer_date(required_str(doc, "validTill")?).map_err(|msg| invalid("validTill", msg))?;

    Ok(DiscountOffer {
        id: id.to_string(),
        producer_id: producer_id.to_string(),
        title: required_str(doc, "title")?.to_string(),
        discount_value,
        valid_till,
        promo_code: required_str(doc, "promoCode")?.trim().to_uppercase(),
        applies_to_all_crops: required_bool(doc, "appliesToAllCrops")?,
        crop_names: string_set(doc, "cropNames")?,
    })
}

/// Decode an order line document
pub fn decode_order_item(value: &Value) -> Result<OrderItem, DecodeError> {
    let doc = value.as_object().ok_or(DecodeError::NotAnObject)?;

    let quantity = field(doc, "quantity")?
        .as_u64()
        .ok_or_else(|| invalid("quantity", "expected a non-negative integer"))?;
    let quantity = u32::try_from(quantity).map_err(|_| invalid("quantity", "too large"))?;

    let unit_price = required_decimal(doc, "unitPrice")?;
    if unit_price.is_sign_negative() && !unit_price.is_zero() {
        return Err(invalid("unitPrice", "must not be negative"));
    }

    Ok(OrderItem {
        product_id: required_str(doc, "productId")?.to_string(),
        product_name: required_str(doc, "productName")?.to_string(),
        quantity,
        unit_price,
    })
}
