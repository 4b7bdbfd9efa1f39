//! Checkout quote handler

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use chrono::Utc;
use shared::CheckoutRequest;

use crate::middleware::CurrentUser;
use crate::services::CheckoutService;
use crate::AppState;

/// Price a cart with the chosen payment method and offers
pub async fn quote_checkout(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(request): Json<CheckoutRequest>,
) -> impl IntoResponse {
    let service = CheckoutService::new(state.db.clone());
    let today = Utc::now().date_naive();

    tracing::debug!(user_id = %current_user.0.user_id, "Checkout quote requested");

    match service.quote(request, today).await {
        Ok(quote) => (StatusCode::OK, Json(quote)).into_response(),
        Err(e) => e.into_response(),
    }
}
