//! Offer applicability and manual promo code resolution

use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;

use crate::models::DiscountOffer;

/// Outcome of a rejected promo code, shown to the consumer
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CouponError {
    #[error("Please enter a promo code")]
    CodeBlank,
    #[error("Invalid promo code")]
    CodeNotFound,
    #[error("This promo code does not apply to the items in your cart")]
    CodeNotApplicable,
    #[error("This promo code is already applied")]
    CodeAlreadyApplied,
}

impl CouponError {
    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            CouponError::CodeBlank => "CODE_BLANK",
            CouponError::CodeNotFound => "CODE_NOT_FOUND",
            CouponError::CodeNotApplicable => "CODE_NOT_APPLICABLE",
            CouponError::CodeAlreadyApplied => "CODE_ALREADY_APPLIED",
        }
    }
}

/// Trim and uppercase user input
pub fn normalize_code(input: &str) -> String {
    input.trim().to_uppercase()
}

/// Offers usable today for a cart holding `crop_names_in_cart`.
/// Every qualifying offer is kept; an empty or not-yet-loaded list yields none.
pub fn filter_applicable_offers<'a, S: AsRef<str>>(
    offers: &'a [DiscountOffer],
    crop_names_in_cart: &[S],
    today: NaiveDate,
) -> Vec<&'a DiscountOffer> {
    offers
        .iter()
        .filter(|offer| offer.is_applicable(crop_names_in_cart, today))
        .collect()
}

/// Look up an offer by a typed promo code
pub fn find_by_code<'a>(
    offers: &'a [DiscountOffer],
    input: &str,
) -> Result<&'a DiscountOffer, CouponError> {
    let code = normalize_code(input);
    if code.is_empty() {
        return Err(CouponError::CodeBlank);
    }
    offers
        .iter()
        .find(|offer| offer.matches_code(&code))
        .ok_or(CouponError::CodeNotFound)
}

/// Resolve a typed promo code against the loaded offers and the current selection.
/// On success the caller adds the returned offer to its selection.
pub fn resolve_code<'a, S: AsRef<str>>(
    offers: &'a [DiscountOffer],
    selected: &[DiscountOffer],
    input: &str,
    crop_names_in_cart: &[S],
    today: NaiveDate,
) -> Result<&'a DiscountOffer, CouponError> {
    let offer = find_by_code(offers, input)?;
    if !offer.is_applicable(crop_names_in_cart, today) {
        return Err(CouponError::CodeNotApplicable);
    }
    if selected.iter().any(|s| s.id == offer.id) {
        return Err(CouponError::CodeAlreadyApplied);
    }
    Ok(offer)
}
