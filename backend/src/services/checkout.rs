//! Checkout service: price quotes for a cart

use chrono::NaiveDate;
use serde::Serialize;
use shared::{
    validate_order_items, ChargeBreakdown, CheckoutRequest, CheckoutSession, DiscountOffer,
    OrderItem,
};
use sqlx::PgPool;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::services::crop::{price_items, CropService};
use crate::services::offer::OfferService;

/// Checkout service computing what a cart will cost
#[derive(Clone)]
pub struct CheckoutService {
    offers: OfferService,
    crops: CropService,
}

/// Price quote returned to the checkout screen
#[derive(Debug, Clone, Serialize)]
pub struct CheckoutQuote {
    pub items: Vec<OrderItem>,
    pub breakdown: ChargeBreakdown,
    pub applied_offers: Vec<DiscountOffer>,
    pub applicable_offers: Vec<DiscountOffer>,
}

/// Validate the request shape before touching the database
pub fn validate_request(request: &CheckoutRequest) -> AppResult<()> {
    request.validate()?;
    validate_order_items(&request.items).map_err(|msg| AppError::Validation {
        field: "items".to_string(),
        message: msg.to_string(),
    })
}

/// Build a session from priced items and apply the requested offers.
/// Selected ids are applied before the typed promo code.
pub fn build_session(
    items: Vec<OrderItem>,
    request: &CheckoutRequest,
    offers: Vec<DiscountOffer>,
    today: NaiveDate,
) -> AppResult<CheckoutSession> {
    let mut session = CheckoutSession::new(items, request.payment_method);
    session.load_offers(offers);

    for offer_id in &request.offer_ids {
        session.select_offer(offer_id, today)?;
    }
    if let Some(code) = &request.promo_code {
        session.apply_code(code, today)?;
    }

    Ok(session)
}

impl CheckoutService {
    /// Create a new CheckoutService instance
    pub fn new(db: PgPool) -> Self {
        Self {
            offers: OfferService::new(db.clone()),
            crops: CropService::new(db),
        }
    }

    /// Quote a cart without reserving stock
    pub async fn quote(&self, request: CheckoutRequest, today: NaiveDate) -> AppResult<CheckoutQuote> {
        validate_request(&request)?;

        let crops = self.crops.find_for_cart(&request.producer_id, &request.items).await?;
        let items = price_items(&request.items, &crops)?;
        let offers = self.offers.list_for_producer(&request.producer_id).await?;

        let session = build_session(items, &request, offers, today)?;
        let breakdown = session.breakdown()?.rounded();

        tracing::debug!(
            producer_id = %request.producer_id,
            payment_method = %request.payment_method,
            final_payable = %breakdown.final_payable_amount,
            "Checkout quoted"
        );

        Ok(CheckoutQuote {
            applicable_offers: session.applicable_offers(today).into_iter().cloned().collect(),
            applied_offers: session.selected_offers().to_vec(),
            items: session.items().to_vec(),
            breakdown,
        })
    }
}
