//! Order pricing
//!
//! Computes what a consumer pays at checkout:
//! subtotal -> platform fee and GST (online payments only) -> offer discounts
//! -> final payable amount, floored at zero.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{DiscountOffer, OrderItem};
use crate::types::PaymentMethod;

/// Platform fee charged on online payments, in percent of the cart amount (2.5%)
pub const PLATFORM_FEE_PERCENT: Decimal = Decimal::from_parts(25, 0, 0, false, 1);

/// GST charged on the platform fee, in percent of the fee (18%)
pub const GST_ON_FEE_PERCENT: Decimal = Decimal::from_parts(18, 0, 0, false, 0);

/// Pricing failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PricingError {
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
}

/// Platform charges for a cart amount
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Charges {
    pub platform_fee: Decimal,
    pub gst_on_platform_fee: Decimal,
    pub total_payable: Decimal,
}

/// Full price breakdown shown at checkout and recorded on the order
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChargeBreakdown {
    pub subtotal: Decimal,
    pub platform_fee: Decimal,
    pub gst_on_platform_fee: Decimal,
    pub total_before_discount: Decimal,
    pub total_discount: Decimal,
    pub final_payable_amount: Decimal,
}

impl ChargeBreakdown {
    /// Values rounded to paise for display and for the payment gateway
    pub fn rounded(&self) -> Self {
        let r = |d: Decimal| d.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        Self {
            subtotal: r(self.subtotal),
            platform_fee: r(self.platform_fee),
            gst_on_platform_fee: r(self.gst_on_platform_fee),
            total_before_discount: r(self.total_before_discount),
            total_discount: r(self.total_discount),
            final_payable_amount: r(self.final_payable_amount),
        }
    }
}

/// Error for arithmetic that leaves the representable decimal range
pub(crate) fn out_of_range() -> PricingError {
    PricingError::InvalidAmount("amount out of range".to_string())
}

/// `amount * percent / 100`, failing instead of overflowing
pub(crate) fn percent_of(amount: Decimal, percent: Decimal) -> Result<Decimal, PricingError> {
    amount
        .checked_mul(percent)
        .and_then(|scaled| scaled.checked_div(Decimal::ONE_HUNDRED))
        .ok_or_else(out_of_range)
}

fn ensure_non_negative(amount: Decimal) -> Result<(), PricingError> {
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(PricingError::InvalidAmount(format!(
            "{} is negative",
            amount
        )));
    }
    Ok(())
}

/// Convert a float amount coming from an untyped boundary
pub fn amount_from_f64(amount: f64) -> Result<Decimal, PricingError> {
    if !amount.is_finite() {
        return Err(PricingError::InvalidAmount(format!("{} is not finite", amount)));
    }
    let decimal = Decimal::try_from(amount)
        .map_err(|e| PricingError::InvalidAmount(format!("{}: {}", amount, e)))?;
    ensure_non_negative(decimal)?;
    Ok(decimal)
}

/// Sum of quantity x unit price over all lines
pub fn subtotal(items: &[OrderItem]) -> Result<Decimal, PricingError> {
    items.iter().try_fold(Decimal::ZERO, |sum, item| {
        sum.checked_add(item.line_total()?).ok_or_else(out_of_range)
    })
}

/// Platform fee and GST for an online payment of `cart_amount`
pub fn compute_charges(cart_amount: Decimal) -> Result<Charges, PricingError> {
    ensure_non_negative(cart_amount)?;

    let platform_fee = percent_of(cart_amount, PLATFORM_FEE_PERCENT)?;
    let gst_on_platform_fee = percent_of(platform_fee, GST_ON_FEE_PERCENT)?;
    let total_payable = cart_amount
        .checked_add(platform_fee)
        .and_then(|total| total.checked_add(gst_on_platform_fee))
        .ok_or_else(out_of_range)?;

    Ok(Charges {
        platform_fee,
        gst_on_platform_fee,
        total_payable,
    })
}

/// Charges for the selected payment method; cash on delivery carries none
pub fn charges_for(method: PaymentMethod, cart_amount: Decimal) -> Result<Charges, PricingError> {
    match method {
        PaymentMethod::Online => compute_charges(cart_amount),
        PaymentMethod::CashOnDelivery => {
            ensure_non_negative(cart_amount)?;
            Ok(Charges {
                platform_fee: Decimal::ZERO,
                gst_on_platform_fee: Decimal::ZERO,
                total_payable: cart_amount,
            })
        }
    }
}

/// Total discount of the selected offers against `base_amount`.
/// Offers stack additively: two 10% offers remove 20% of the base.
pub fn aggregate_discount<'a, I>(base_amount: Decimal, offers: I) -> Result<Decimal, PricingError>
where
    I: IntoIterator<Item = &'a DiscountOffer>,
{
    offers.into_iter().try_fold(Decimal::ZERO, |sum, offer| {
        sum.checked_add(offer.discount_on(base_amount)?)
            .ok_or_else(out_of_range)
    })
}

/// Full breakdown for a subtotal, payment method and offer selection
pub fn resolve_breakdown<'a, I>(
    subtotal: Decimal,
    method: PaymentMethod,
    offers: I,
) -> Result<ChargeBreakdown, PricingError>
where
    I: IntoIterator<Item = &'a DiscountOffer>,
{
    let charges = charges_for(method, subtotal)?;
    let total_before_discount = charges.total_payable;
    let total_discount = aggregate_discount(total_before_discount, offers)?;
    let final_payable_amount = (total_before_discount - total_discount).max(Decimal::ZERO);

    Ok(ChargeBreakdown {
        subtotal,
        platform_fee: charges.platform_fee,
        gst_on_platform_fee: charges.gst_on_platform_fee,
        total_before_discount,
        total_discount,
        final_payable_amount,
    })
}

/// Final amount the consumer pays; never negative
pub fn resolve_total<'a, I>(
    subtotal: Decimal,
    method: PaymentMethod,
    offers: I,
) -> Result<Decimal, PricingError>
where
    I: IntoIterator<Item = &'a DiscountOffer>,
{
    resolve_breakdown(subtotal, method, offers).map(|b| b.final_payable_amount)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn offer(id: &str, value: &str) -> DiscountOffer {
        DiscountOffer {
            id: id.to_string(),
            producer_id: "producer-1".to_string(),
            title: format!("{} off", value),
            discount_value: dec(value),
            valid_till: NaiveDate::from_ymd_opt(2030, 1, 1).unwrap(),
            promo_code: id.to_uppercase(),
            applies_to_all_crops: true,
            crop_names: Default::default(),
        }
    }

    #[test]
    fn test_rates() {
        assert_eq!(PLATFORM_FEE_PERCENT, dec("2.5"));
        assert_eq!(GST_ON_FEE_PERCENT, dec("18"));
    }

    #[test]
    fn test_compute_charges_online() {
        let charges = compute_charges(dec("1000.0")).unwrap();
        assert_eq!(charges.platform_fee, dec("25.0"));
        assert_eq!(charges.gst_on_platform_fee, dec("4.5"));
        assert_eq!(charges.total_payable, dec("1029.5"));
    }

    #[test]
    fn test_compute_charges_zero() {
        let charges = compute_charges(Decimal::ZERO).unwrap();
        assert!(charges.platform_fee.is_zero());
        assert!(charges.gst_on_platform_fee.is_zero());
        assert!(charges.total_payable.is_zero());
    }

    #[test]
    fn test_compute_charges_negative_rejected() {
        assert!(matches!(
            compute_charges(dec("-1")),
            Err(PricingError::InvalidAmount(_))
        ));
        assert!(charges_for(PaymentMethod::CashOnDelivery, dec("-0.01")).is_err());
    }

    #[test]
    fn test_amount_from_f64_rejects_non_finite() {
        assert!(amount_from_f64(f64::NAN).is_err());
        assert!(amount_from_f64(f64::INFINITY).is_err());
        assert!(amount_from_f64(-5.0).is_err());
        assert_eq!(amount_from_f64(12.5).unwrap(), dec("12.5"));
    }

    #[test]
    fn test_cash_on_delivery_has_no_charges() {
        let total = resolve_total(dec("1000.0"), PaymentMethod::CashOnDelivery, []).unwrap();
        assert_eq!(total, dec("1000.0"));
    }

    #[test]
    fn test_online_with_single_offer() {
        let offers = [offer("save10", "10")];
        let breakdown = resolve_breakdown(dec("1000.0"), PaymentMethod::Online, &offers).unwrap();
        assert_eq!(breakdown.total_before_discount, dec("1029.5"));
        assert_eq!(breakdown.total_discount, dec("102.95"));
        assert_eq!(breakdown.final_payable_amount, dec("926.55"));
    }

    #[test]
    fn test_stacked_offers_clamp_to_zero() {
        let offers = [offer("a", "60"), offer("b", "60")];
        let breakdown =
            resolve_breakdown(dec("100.0"), PaymentMethod::CashOnDelivery, &offers).unwrap();
        assert_eq!(breakdown.total_discount, dec("120.0"));
        assert_eq!(breakdown.final_payable_amount, Decimal::ZERO);
    }

    #[test]
    fn test_stacking_is_additive() {
        let offers = [offer("a", "10"), offer("b", "10")];
        assert_eq!(aggregate_discount(dec("200"), &offers).unwrap(), dec("40"));
    }

    #[test]
    fn test_subtotal() {
        let items = vec![
            OrderItem {
                product_id: "c1".to_string(),
                product_name: "Tomato".to_string(),
                quantity: 2,
                unit_price: dec("30.00"),
            },
            OrderItem {
                product_id: "c2".to_string(),
                product_name: "Onion".to_string(),
                quantity: 0,
                unit_price: dec("45.00"),
            },
        ];
        assert_eq!(subtotal(&items).unwrap(), dec("60"));
        assert_eq!(subtotal(&[]).unwrap(), Decimal::ZERO);
    }

    #[test]
    fn test_amount_near_max_is_rejected() {
        assert_eq!(compute_charges(Decimal::MAX), Err(out_of_range()));
        let big = amount_from_f64(7.0e28).unwrap();
        assert!(resolve_total(big, PaymentMethod::Online, []).is_err());
        // No charges on cash on delivery, so the same amount still resolves
        assert_eq!(
            resolve_total(big, PaymentMethod::CashOnDelivery, []).unwrap(),
            big
        );
    }

    #[test]
    fn test_subtotal_overflow_is_rejected() {
        let line = OrderItem {
            product_id: "c1".to_string(),
            product_name: "Saffron".to_string(),
            quantity: 1,
            unit_price: Decimal::MAX,
        };
        assert!(subtotal(&[line.clone(), line]).is_err());
    }

    #[test]
    fn test_discount_overflow_is_rejected() {
        let offers = [offer("a", "100"), offer("b", "100")];
        assert!(aggregate_discount(Decimal::MAX, &offers).is_err());
    }

    #[test]
    fn test_rounded_breakdown() {
        let offers = [offer("a", "7")];
        let breakdown = resolve_breakdown(dec("333.33"), PaymentMethod::Online, &offers)
            .unwrap()
            .rounded();
        assert_eq!(breakdown.platform_fee, dec("8.33"));
        assert_eq!(breakdown.gst_on_platform_fee, dec("1.50"));
    }
}
