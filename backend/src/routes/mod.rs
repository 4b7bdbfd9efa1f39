//! Route definitions for the GreenBasket API

use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};

use crate::{handlers, middleware::auth_middleware, AppState};

/// Create API routes
pub fn api_routes(state: AppState) -> Router<AppState> {
    Router::new()
        // Health check (public)
        .route("/health", get(handlers::health_check))
        // Producer catalogue (public)
        .nest("/producers", producer_routes())
        // Protected routes - offer management
        .nest("/offers", offer_routes(state.clone()))
        // Protected routes - checkout
        .nest("/checkout", checkout_routes(state.clone()))
        // Protected routes - orders
        .nest("/orders", order_routes(state))
}

/// Producer catalogue routes (public)
fn producer_routes() -> Router<AppState> {
    Router::new()
        .route("/:producer_id/crops", get(handlers::list_crops))
        .route("/:producer_id/offers", get(handlers::list_offers))
        .route(
            "/:producer_id/offers/applicable",
            get(handlers::list_applicable_offers),
        )
}

/// Offer management routes (protected, producers only)
fn offer_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", post(handlers::create_offer))
        .route("/:offer_id", delete(handlers::delete_offer))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// Checkout routes (protected)
fn checkout_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/quote", post(handlers::quote_checkout))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// Order routes (protected)
fn order_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_orders).post(handlers::place_order))
        .route("/:order_id", get(handlers::get_order))
        .route("/:order_id/invoice", get(handlers::get_order_invoice))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}
