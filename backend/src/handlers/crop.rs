//! Crop catalogue HTTP handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use crate::services::CropService;
use crate::AppState;

/// List a producer's crops with current prices and stock
pub async fn list_crops(
    State(state): State<AppState>,
    Path(producer_id): Path<String>,
) -> impl IntoResponse {
    let service = CropService::new(state.db.clone());

    match service.list_for_producer(&producer_id).await {
        Ok(crops) => (StatusCode::OK, Json(serde_json::json!({ "crops": crops }))).into_response(),
        Err(e) => e.into_response(),
    }
}
