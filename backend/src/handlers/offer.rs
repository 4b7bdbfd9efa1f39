//! Discount offer HTTP handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use shared::CreateOfferInput;

use crate::middleware::CurrentUser;
use crate::services::OfferService;
use crate::AppState;

/// Query for the applicable-offers listing
#[derive(Debug, Deserialize)]
pub struct ApplicableQuery {
    /// Comma separated crop names in the cart
    #[serde(default)]
    pub crops: String,
}

impl ApplicableQuery {
    fn crop_names(&self) -> Vec<String> {
        self.crops
            .split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .collect()
    }
}

/// List every offer a producer has published
pub async fn list_offers(
    State(state): State<AppState>,
    Path(producer_id): Path<String>,
) -> impl IntoResponse {
    let service = OfferService::new(state.db.clone());

    match service.list_for_producer(&producer_id).await {
        Ok(offers) => (StatusCode::OK, Json(serde_json::json!({ "offers": offers }))).into_response(),
        Err(e) => e.into_response(),
    }
}

/// List the offers usable today for the given cart crops
pub async fn list_applicable_offers(
    State(state): State<AppState>,
    Path(producer_id): Path<String>,
    Query(query): Query<ApplicableQuery>,
) -> impl IntoResponse {
    let service = OfferService::new(state.db.clone());
    let today = Utc::now().date_naive();

    match service
        .list_applicable(&producer_id, &query.crop_names(), today)
        .await
    {
        Ok(offers) => (StatusCode::OK, Json(serde_json::json!({ "offers": offers }))).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Publish a new offer (producers only)
pub async fn create_offer(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<CreateOfferInput>,
) -> impl IntoResponse {
    let producer_id = match current_user.0.require_producer() {
        Ok(id) => id.to_string(),
        Err(e) => return e.into_response(),
    };
    let service = OfferService::new(state.db.clone());

    match service.create_offer(&producer_id, input).await {
        Ok(offer) => (StatusCode::CREATED, Json(offer)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Withdraw one of the caller's offers (producers only)
pub async fn delete_offer(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(offer_id): Path<String>,
) -> impl IntoResponse {
    let producer_id = match current_user.0.require_producer() {
        Ok(id) => id.to_string(),
        Err(e) => return e.into_response(),
    };
    let service = OfferService::new(state.db.clone());

    match service.delete_offer(&producer_id, &offer_id).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => e.into_response(),
    }
}
