//! Order HTTP handlers

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use shared::{CheckoutRequest, Pagination};
use uuid::Uuid;

use crate::middleware::CurrentUser;
use crate::services::{invoice::render_invoice_csv, OrderService};
use crate::AppState;

fn order_service(state: &AppState) -> OrderService {
    OrderService::new(state.db.clone(), state.events.clone())
}

/// Place an order for the current consumer (consumers only)
pub async fn place_order(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(request): Json<CheckoutRequest>,
) -> impl IntoResponse {
    let consumer_id = match current_user.0.require_consumer() {
        Ok(id) => id.to_string(),
        Err(e) => return e.into_response(),
    };
    let today = Utc::now().date_naive();

    match order_service(&state)
        .place_order(&consumer_id, request, today)
        .await
    {
        Ok(order) => (StatusCode::CREATED, Json(order)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// List the current consumer's orders, newest first
pub async fn list_orders(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(pagination): Query<Pagination>,
) -> impl IntoResponse {
    match order_service(&state)
        .list_orders(&current_user.0.user_id, pagination)
        .await
    {
        Ok(page) => (StatusCode::OK, Json(page)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Get a single order
pub async fn get_order(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(order_id): Path<Uuid>,
) -> impl IntoResponse {
    match order_service(&state)
        .get_order(&current_user.0.user_id, order_id)
        .await
    {
        Ok(order) => (StatusCode::OK, Json(order)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Download an order's invoice as CSV
pub async fn get_order_invoice(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(order_id): Path<Uuid>,
) -> impl IntoResponse {
    let order = match order_service(&state)
        .get_order(&current_user.0.user_id, order_id)
        .await
    {
        Ok(order) => order,
        Err(e) => return e.into_response(),
    };

    match render_invoice_csv(&order, &state.config.checkout.currency) {
        Ok(body) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"invoice-{}.csv\"", order.id),
                ),
            ],
            body,
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}
