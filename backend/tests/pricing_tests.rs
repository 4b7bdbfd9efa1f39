//! Charge calculation and discount aggregation tests
//!
//! Tests for the order pricing core including:
//! - Property 1: Platform fee and GST formula for online payments
//! - Property 2: Cash on delivery carries no charges
//! - Property 3: Final payable amount is never negative

use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;
use shared::{
    aggregate_discount, amount_from_f64, charges_for, compute_charges, resolve_breakdown,
    resolve_total, DiscountOffer, PaymentMethod, PricingError,
};
use std::str::FromStr;

// Helper to create Decimal from string
fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn offer(id: &str, percent: Decimal) -> DiscountOffer {
    DiscountOffer {
        id: id.to_string(),
        producer_id: "farm-1".to_string(),
        title: format!("{}% off", percent),
        discount_value: percent,
        valid_till: NaiveDate::from_ymd_opt(2030, 1, 1).unwrap(),
        promo_code: id.to_uppercase(),
        applies_to_all_crops: true,
        crop_names: Default::default(),
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    /// 1000 online: fee 25, GST 4.5, total 1029.5
    #[test]
    fn test_online_charges_for_1000() {
        let charges = compute_charges(dec("1000")).unwrap();
        assert_eq!(charges.platform_fee, dec("25"));
        assert_eq!(charges.gst_on_platform_fee, dec("4.5"));
        assert_eq!(charges.total_payable, dec("1029.5"));
    }

    #[test]
    fn test_zero_cart_has_zero_charges() {
        let charges = compute_charges(Decimal::ZERO).unwrap();
        assert!(charges.platform_fee.is_zero());
        assert!(charges.gst_on_platform_fee.is_zero());
        assert!(charges.total_payable.is_zero());
    }

    #[test]
    fn test_negative_amount_rejected() {
        assert!(matches!(
            compute_charges(dec("-1")),
            Err(PricingError::InvalidAmount(_))
        ));
    }

    #[test]
    fn test_non_finite_float_rejected() {
        assert!(amount_from_f64(f64::NAN).is_err());
        assert!(amount_from_f64(f64::INFINITY).is_err());
        assert!(amount_from_f64(-3.0).is_err());
        assert_eq!(amount_from_f64(250.5).unwrap(), dec("250.5"));
    }

    /// 10% off 1029.5 leaves 926.55
    #[test]
    fn test_single_offer_online() {
        let offers = [offer("save10", dec("10"))];
        let total = resolve_total(dec("1000"), PaymentMethod::Online, &offers).unwrap();
        assert_eq!(total, dec("926.55"));
    }

    #[test]
    fn test_single_offer_cash_on_delivery() {
        let offers = [offer("save10", dec("10"))];
        let total = resolve_total(dec("1000"), PaymentMethod::CashOnDelivery, &offers).unwrap();
        assert_eq!(total, dec("900"));
    }

    #[test]
    fn test_no_offers_cash_on_delivery() {
        let no_offers: [DiscountOffer; 0] = [];
        let total = resolve_total(dec("1000"), PaymentMethod::CashOnDelivery, &no_offers).unwrap();
        assert_eq!(total, dec("1000"));
    }

    /// Offers stack additively and the total is clamped at zero
    #[test]
    fn test_stacked_offers_clamp_to_zero() {
        let offers = [offer("a", dec("60")), offer("b", dec("60"))];
        let breakdown = resolve_breakdown(dec("500"), PaymentMethod::Online, &offers).unwrap();
        assert!(breakdown.total_discount > breakdown.total_before_discount);
        assert_eq!(breakdown.final_payable_amount, Decimal::ZERO);
    }

    #[test]
    fn test_two_offers_add_up() {
        let offers = [offer("a", dec("10")), offer("b", dec("5"))];
        assert_eq!(aggregate_discount(dec("200"), &offers).unwrap(), dec("30"));
    }

    #[test]
    fn test_rounded_breakdown_two_places() {
        let offers = [offer("odd", dec("7"))];
        let breakdown = resolve_breakdown(dec("333.33"), PaymentMethod::Online, &offers)
            .unwrap()
            .rounded();
        assert!(breakdown.final_payable_amount.scale() <= 2);
        assert!(breakdown.platform_fee.scale() <= 2);
    }
}

// ============================================================================
// Property Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    /// Cart amounts in paise up to one crore rupees
    fn amount_strategy() -> impl Strategy<Value = Decimal> {
        (0i64..1_000_000_000).prop_map(|paise| Decimal::new(paise, 2))
    }

    fn percent_strategy() -> impl Strategy<Value = Decimal> {
        (1i64..=10_000).prop_map(|hundredths| Decimal::new(hundredths, 2))
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Property 1: fee is 2.5% of the cart and GST is 18% of the fee
        #[test]
        fn prop_online_charge_formula(amount in amount_strategy()) {
            let charges = compute_charges(amount).unwrap();
            prop_assert_eq!(charges.platform_fee * Decimal::from(40), amount);
            prop_assert_eq!(
                charges.gst_on_platform_fee * Decimal::ONE_HUNDRED,
                charges.platform_fee * Decimal::from(18)
            );
            prop_assert_eq!(
                charges.total_payable,
                amount + charges.platform_fee + charges.gst_on_platform_fee
            );
        }

        /// Property 2: cash on delivery pays exactly the cart amount
        #[test]
        fn prop_cash_on_delivery_no_charges(amount in amount_strategy()) {
            let charges = charges_for(PaymentMethod::CashOnDelivery, amount).unwrap();
            prop_assert!(charges.platform_fee.is_zero());
            prop_assert!(charges.gst_on_platform_fee.is_zero());
            prop_assert_eq!(charges.total_payable, amount);
        }

        /// A single offer removes its percentage of the charged total
        #[test]
        fn prop_single_offer_discount(
            amount in amount_strategy(),
            percent in percent_strategy(),
            online in any::<bool>(),
        ) {
            let method = if online { PaymentMethod::Online } else { PaymentMethod::CashOnDelivery };
            let offers = [offer("only", percent)];
            let breakdown = resolve_breakdown(amount, method, &offers).unwrap();
            let expected = breakdown.total_before_discount
                - breakdown.total_before_discount * percent / Decimal::ONE_HUNDRED;
            prop_assert_eq!(breakdown.final_payable_amount, expected.max(Decimal::ZERO));
        }

        /// Amounts of any magnitude either price or fail with InvalidAmount
        #[test]
        fn prop_large_amounts_never_panic(
            lo in any::<u32>(),
            mid in any::<u32>(),
            hi in any::<u32>(),
            scale in 0u32..=28,
            online in any::<bool>(),
        ) {
            let amount = Decimal::from_parts(lo, mid, hi, false, scale);
            let method = if online { PaymentMethod::Online } else { PaymentMethod::CashOnDelivery };
            let offers = [offer("all", Decimal::ONE_HUNDRED)];
            match resolve_breakdown(amount, method, &offers) {
                Ok(breakdown) => prop_assert!(breakdown.final_payable_amount >= Decimal::ZERO),
                Err(err) => prop_assert!(matches!(err, PricingError::InvalidAmount(_))),
            }
        }

        /// Property 3: any stack of offers leaves a total in [0, total before discount]
        #[test]
        fn prop_final_total_bounded(
            amount in amount_strategy(),
            percents in prop::collection::vec(percent_strategy(), 0..6),
            online in any::<bool>(),
        ) {
            let method = if online { PaymentMethod::Online } else { PaymentMethod::CashOnDelivery };
            let offers: Vec<DiscountOffer> = percents
                .iter()
                .enumerate()
                .map(|(i, p)| offer(&format!("o{}", i), *p))
                .collect();
            let breakdown = resolve_breakdown(amount, method, &offers).unwrap();
            prop_assert!(breakdown.final_payable_amount >= Decimal::ZERO);
            prop_assert!(breakdown.final_payable_amount <= breakdown.total_before_discount);
            prop_assert_eq!(
                breakdown.final_payable_amount,
                (breakdown.total_before_discount - breakdown.total_discount).max(Decimal::ZERO)
            );
        }
    }
}
