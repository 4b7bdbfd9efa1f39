//! Validation utilities for the GreenBasket marketplace

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::models::OrderItem;

// ============================================================================
// Pricing Validations
// ============================================================================

/// Validate an amount of money is not negative
pub fn validate_amount(amount: Decimal) -> Result<(), &'static str> {
    if amount < Decimal::ZERO {
        return Err("Amount cannot be negative");
    }
    Ok(())
}

/// Validate an offer percentage (greater than 0, at most 100)
pub fn validate_discount_percentage(value: Decimal) -> Result<(), &'static str> {
    if value <= Decimal::ZERO {
        return Err("Discount must be greater than 0%");
    }
    if value > Decimal::ONE_HUNDRED {
        return Err("Discount cannot exceed 100%");
    }
    Ok(())
}

// ============================================================================
// Offer Validations
// ============================================================================

/// Validate promo code format (3-20 alphanumeric characters after trimming)
pub fn validate_promo_code_format(code: &str) -> Result<(), &'static str> {
    let code = code.trim();
    if code.len() < 3 {
        return Err("Promo code must be at least 3 characters");
    }
    if code.len() > 20 {
        return Err("Promo code must be at most 20 characters");
    }
    if !code.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err("Promo code must be alphanumeric only");
    }
    Ok(())
}

/// Parse an offer expiry date in zero-padded `yyyy-MM-dd` form
pub fn parse_offer_date(value: &str) -> Result<NaiveDate, &'static str> {
    // Zero padding keeps stored dates ordered the same way as strings
    if value.len() != 10 {
        return Err("Date must be in yyyy-MM-dd format");
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| "Date must be in yyyy-MM-dd format")
}

// ============================================================================
// Order Validations
// ============================================================================

/// Validate cart lines before pricing or placing an order
pub fn validate_order_items(items: &[OrderItem]) -> Result<(), &'static str> {
    if items.is_empty() {
        return Err("Cart is empty");
    }
    for item in items {
        if item.product_id.trim().is_empty() {
            return Err("Product ID is required");
        }
        if item.quantity == 0 {
            return Err("Quantity must be at least 1");
        }
        validate_amount(item.unit_price).map_err(|_| "Unit price cannot be negative")?;
    }
    Ok(())
}

/// Validate crop name used for offer scoping
pub fn validate_crop_name(name: &str) -> Result<(), &'static str> {
    let name = name.trim();
    if name.is_empty() {
        return Err("Crop name is required");
    }
    if name.chars().count() > 80 {
        return Err("Crop name must be at most 80 characters");
    }
    Ok(())
}
