//! Checkout session state
//!
//! Holds the cart, payment method, loaded offers and the consumer's offer
//! selection for the duration of one checkout. Totals are never stored; they
//! are recomputed from the current inputs on every call to [`CheckoutSession::breakdown`].

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::coupon::{filter_applicable_offers, resolve_code, CouponError};
use crate::models::{DiscountOffer, OrderItem};
use crate::pricing::{self, ChargeBreakdown, PricingError};
use crate::types::PaymentMethod;

#[derive(Debug, Clone, Default)]
pub struct CheckoutSession {
    items: Vec<OrderItem>,
    payment_method: PaymentMethod,
    offers: Vec<DiscountOffer>,
    selected: Vec<DiscountOffer>,
}

impl CheckoutSession {
    pub fn new(items: Vec<OrderItem>, payment_method: PaymentMethod) -> Self {
        Self {
            items,
            payment_method,
            offers: Vec::new(),
            selected: Vec::new(),
        }
    }

    pub fn items(&self) -> &[OrderItem] {
        &self.items
    }

    pub fn payment_method(&self) -> PaymentMethod {
        self.payment_method
    }

    pub fn set_payment_method(&mut self, method: PaymentMethod) {
        self.payment_method = method;
    }

    /// Replace the offer list once the producer's offers arrive.
    /// Selected offers are swapped for their reloaded records; those missing
    /// from the new list are dropped.
    pub fn load_offers(&mut self, offers: Vec<DiscountOffer>) {
        self.selected = self
            .selected
            .iter()
            .filter_map(|s| offers.iter().find(|o| o.id == s.id).cloned())
            .collect();
        self.offers = offers;
    }

    pub fn selected_offers(&self) -> &[DiscountOffer] {
        &self.selected
    }

    pub fn is_selected(&self, offer_id: &str) -> bool {
        self.selected.iter().any(|s| s.id == offer_id)
    }

    fn cart_crop_names(&self) -> Vec<&str> {
        self.items.iter().map(|i| i.product_name.as_str()).collect()
    }

    /// Offers the consumer can pick from today
    pub fn applicable_offers(&self, today: NaiveDate) -> Vec<&DiscountOffer> {
        filter_applicable_offers(&self.offers, &self.cart_crop_names(), today)
    }

    /// Apply a manually entered promo code
    pub fn apply_code(&mut self, input: &str, today: NaiveDate) -> Result<&DiscountOffer, CouponError> {
        let offer = {
            let crops = self.cart_crop_names();
            resolve_code(&self.offers, &self.selected, input, &crops, today)?.clone()
        };
        self.selected.push(offer);
        Ok(&self.selected[self.selected.len() - 1])
    }

    /// Select an offer from the applicable list by id
    pub fn select_offer(&mut self, offer_id: &str, today: NaiveDate) -> Result<&DiscountOffer, CouponError> {
        if self.is_selected(offer_id) {
            return Err(CouponError::CodeAlreadyApplied);
        }
        let offer = {
            let crops = self.cart_crop_names();
            let offer = self
                .offers
                .iter()
                .find(|o| o.id == offer_id)
                .ok_or(CouponError::CodeNotFound)?;
            if !offer.is_applicable(&crops, today) {
                return Err(CouponError::CodeNotApplicable);
            }
            offer.clone()
        };
        self.selected.push(offer);
        Ok(&self.selected[self.selected.len() - 1])
    }

    /// Select or deselect an offer from the applicable list.
    /// Returns whether the offer is selected afterwards.
    pub fn toggle_offer(&mut self, offer_id: &str, today: NaiveDate) -> Result<bool, CouponError> {
        if self.remove_offer(offer_id) {
            return Ok(false);
        }
        self.select_offer(offer_id, today).map(|_| true)
    }

    pub fn remove_offer(&mut self, offer_id: &str) -> bool {
        let before = self.selected.len();
        self.selected.retain(|s| s.id != offer_id);
        self.selected.len() != before
    }

    pub fn clear_selection(&mut self) {
        self.selected.clear();
    }

    pub fn subtotal(&self) -> Result<Decimal, PricingError> {
        pricing::subtotal(&self.items)
    }

    pub fn breakdown(&self) -> Result<ChargeBreakdown, PricingError> {
        pricing::resolve_breakdown(self.subtotal()?, self.payment_method, &self.selected)
    }
}
