//! Producer discount offer models

use std::collections::BTreeSet;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::pricing::{percent_of, PricingError};
use crate::validation::{validate_discount_percentage, validate_promo_code_format};

/// A promotional percentage discount scoped to one producer
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DiscountOffer {
    pub id: String,
    pub producer_id: String,
    pub title: String,
    /// Percentage of the base amount, e.g. 10.0 means 10%
    pub discount_value: Decimal,
    /// Last day (inclusive) the offer can be used
    pub valid_till: NaiveDate,
    pub promo_code: String,
    pub applies_to_all_crops: bool,
    /// Crop names the offer is limited to when not universal
    pub crop_names: BTreeSet<String>,
}

impl DiscountOffer {
    /// Offer is still usable on `today`
    pub fn is_valid_on(&self, today: NaiveDate) -> bool {
        today <= self.valid_till
    }

    /// Offer covers at least one crop in the cart.
    /// A non-universal offer with no crop names covers nothing.
    pub fn covers_cart<S: AsRef<str>>(&self, crop_names_in_cart: &[S]) -> bool {
        self.applies_to_all_crops
            || crop_names_in_cart
                .iter()
                .any(|name| self.crop_names.contains(name.as_ref()))
    }

    pub fn is_applicable<S: AsRef<str>>(&self, crop_names_in_cart: &[S], today: NaiveDate) -> bool {
        self.is_valid_on(today) && self.covers_cart(crop_names_in_cart)
    }

    /// Case-insensitive match against an already normalized code
    pub fn matches_code(&self, normalized_code: &str) -> bool {
        self.promo_code.trim().to_uppercase() == normalized_code
    }

    /// Discount this offer grants on `base_amount`
    pub fn discount_on(&self, base_amount: Decimal) -> Result<Decimal, PricingError> {
        percent_of(base_amount, self.discount_value)
    }
}

/// Input for creating an offer
#[derive(Debug, Clone, Deserialize, Validate)]
#[validate(schema(function = "validate_offer_scope"))]
pub struct CreateOfferInput {
    #[validate(length(min = 1, max = 120))]
    pub title: String,
    #[validate(custom = "discount_value_rule")]
    pub discount_value: Decimal,
    pub valid_till: NaiveDate,
    #[validate(custom = "promo_code_rule")]
    pub promo_code: String,
    pub applies_to_all_crops: bool,
    #[serde(default)]
    pub crop_names: BTreeSet<String>,
}

impl CreateOfferInput {
    /// Build the stored record; promo codes are kept uppercase
    pub fn into_offer(self, id: String, producer_id: String) -> DiscountOffer {
        DiscountOffer {
            id,
            producer_id,
            title: self.title.trim().to_string(),
            discount_value: self.discount_value,
            valid_till: self.valid_till,
            promo_code: self.promo_code.trim().to_uppercase(),
            applies_to_all_crops: self.applies_to_all_crops,
            crop_names: self
                .crop_names
                .into_iter()
                .map(|name| name.trim().to_string())
                .filter(|name| !name.is_empty())
                .collect(),
        }
    }
}

fn to_validation_error(code: &'static str, message: &'static str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(message.into());
    error
}

fn discount_value_rule(value: &Decimal) -> Result<(), ValidationError> {
    validate_discount_percentage(*value).map_err(|msg| to_validation_error("discount_value", msg))
}

fn promo_code_rule(code: &str) -> Result<(), ValidationError> {
    validate_promo_code_format(code).map_err(|msg| to_validation_error("promo_code", msg))
}

fn validate_offer_scope(input: &CreateOfferInput) -> Result<(), ValidationError> {
    if !input.applies_to_all_crops && input.crop_names.iter().all(|n| n.trim().is_empty()) {
        return Err(to_validation_error(
            "crop_names",
            "Offer must apply to all crops or list at least one crop",
        ));
    }
    Ok(())
}
