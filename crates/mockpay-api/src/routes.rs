//! # Routes
//!
//! Axum router configuration for the mock payment gateway.

use crate::handlers;
use crate::state::AppState;
use axum::{
    routing::{get, patch, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

/// Create the main application router
///
/// Routes:
/// - Payment sessions:
///   - POST /api/create-mock-payment-session - Snapshot a cart into a session
///   - GET  /api/payment-session/{session_id} - Session status (lazy expiry)
///   - POST /api/complete-payment - Complete a session, issuing its order
///
/// - Orders:
///   - GET  /api/order/{order_id} - Full order record
///   - GET  /api/orders?email= - Orders for a customer
///
/// - Admin:
///   - GET   /api/admin/orders - All orders
///   - PATCH /api/admin/order/{order_id}/status - Update order status
pub fn create_router(state: AppState) -> Router {
    // CORS wide open: this is a demo storefront backend
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let payment_routes = Router::new()
        .route(
            "/create-mock-payment-session",
            post(handlers::create_session),
        )
        .route("/payment-session/{session_id}", get(handlers::get_session))
        .route("/complete-payment", post(handlers::complete_payment))
        .route("/order/{order_id}", get(handlers::get_order))
        .route("/orders", get(handlers::orders_by_email));

    let admin_routes = Router::new()
        .route("/orders", get(handlers::admin_list_orders))
        .route(
            "/order/{order_id}/status",
            patch(handlers::admin_update_order_status),
        );

    Router::new()
        .route("/health", get(handlers::health))
        .nest("/api", payment_routes)
        .nest("/api/admin", admin_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
