//! # Request Handlers
//!
//! Axum request handlers for the mock payment gateway API. All validation
//! runs before any mutation; every failure returns a structured
//! `{error, detail}` payload.

use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use mockpay_core::{
    CartItem, Currency, Customer, Money, Order, OrderStatus, PaymentError, SessionStatus,
};
use serde::{Deserialize, Serialize};
use tracing::{error, instrument};

// =============================================================================
// Request/Response Types
// =============================================================================

/// Create session request
#[derive(Debug, Deserialize)]
pub struct CreateSessionRequest {
    /// Cart line items
    #[serde(default)]
    pub cart: Vec<CartItem>,
    /// Customer identity
    #[serde(default)]
    pub customer: Option<CustomerPayload>,
}

/// Unvalidated customer fields from the wire
#[derive(Debug, Default, Deserialize)]
pub struct CustomerPayload {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

/// Create session response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionResponse {
    pub session_id: String,
    pub amount: Money,
    pub currency: Currency,
    pub status: SessionStatus,
}

/// Session status response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStatusResponse {
    pub session_id: String,
    pub status: SessionStatus,
    pub amount: Money,
    pub currency: Currency,
    pub expires_at: DateTime<Utc>,
}

/// Complete payment request
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletePaymentRequest {
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub payment_method: Option<String>,
    #[serde(default)]
    pub shipping_address: Option<serde_json::Value>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Complete payment response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletePaymentResponse {
    pub order_id: String,
    pub transaction_id: String,
    pub status: SessionStatus,
    pub amount: Money,
    pub currency: Currency,
    pub message: String,
}

/// Orders-by-customer query string
#[derive(Debug, Deserialize)]
pub struct OrdersQuery {
    #[serde(default)]
    pub email: Option<String>,
}

/// Admin order status update request
#[derive(Debug, Deserialize)]
pub struct UpdateOrderStatusRequest {
    #[serde(default)]
    pub status: Option<String>,
}

/// Admin order status update response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOrderStatusResponse {
    pub order_id: String,
    pub status: OrderStatus,
    pub message: String,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub detail: String,
}

type HandlerError = (StatusCode, Json<ErrorResponse>);

fn error_to_response(err: PaymentError) -> HandlerError {
    let code = err.status_code();
    if code >= 500 {
        // logged here; the caller only sees a generic payload
        error!("internal failure: {}", err);
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: "Internal server error".to_string(),
                detail: "An unexpected error occurred".to_string(),
            }),
        );
    }

    (
        StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        Json(ErrorResponse {
            error: err.to_string(),
            detail: err.detail(),
        }),
    )
}

// =============================================================================
// Handlers
// =============================================================================

/// Health check endpoint
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "OK",
        "service": "mockpay",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Create a mock payment session from a cart snapshot
#[instrument(skip(state, request), fields(items = request.cart.len()))]
pub async fn create_session(
    State(state): State<AppState>,
    Json(request): Json<CreateSessionRequest>,
) -> Result<Json<CreateSessionResponse>, HandlerError> {
    if request.cart.is_empty() {
        return Err(error_to_response(PaymentError::InvalidCart {
            detail: "Cart must be a non-empty array".to_string(),
        }));
    }

    let payload = request.customer.unwrap_or_default();
    let customer =
        Customer::validate(payload.email, payload.name).map_err(error_to_response)?;

    let session = state
        .gateway
        .create_session(request.cart, customer)
        .await
        .map_err(error_to_response)?;

    Ok(Json(CreateSessionResponse {
        session_id: session.session_id,
        amount: session.totals.total,
        currency: state.gateway.policy().currency,
        status: session.status,
    }))
}

/// Get payment session status (applies lazy expiry)
#[instrument(skip(state))]
pub async fn get_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<SessionStatusResponse>, HandlerError> {
    let session = state
        .gateway
        .session_status(&session_id)
        .await
        .map_err(error_to_response)?;

    Ok(Json(SessionStatusResponse {
        session_id: session.session_id,
        status: session.status,
        amount: session.totals.total,
        currency: state.gateway.policy().currency,
        expires_at: session.expires_at,
    }))
}

/// Complete a pending payment session, issuing its order
#[instrument(skip(state, request))]
pub async fn complete_payment(
    State(state): State<AppState>,
    Json(request): Json<CompletePaymentRequest>,
) -> Result<Json<CompletePaymentResponse>, HandlerError> {
    let session_id = request.session_id.as_deref().filter(|s| !s.is_empty()).ok_or_else(|| {
        error_to_response(PaymentError::InvalidRequest {
            detail: "sessionId is required".to_string(),
        })
    })?;

    let order = state
        .gateway
        .complete_session(
            session_id,
            request.payment_method,
            request.shipping_address,
            request.notes,
        )
        .await
        .map_err(error_to_response)?;

    Ok(Json(CompletePaymentResponse {
        order_id: order.order_id,
        transaction_id: order.transaction_id,
        status: SessionStatus::Completed,
        amount: order.totals.total,
        currency: state.gateway.policy().currency,
        message: "Payment completed successfully".to_string(),
    }))
}

/// Get full order details
#[instrument(skip(state))]
pub async fn get_order(
    State(state): State<AppState>,
    Path(order_id): Path<String>,
) -> Result<Json<Order>, HandlerError> {
    let order = state
        .gateway
        .order(&order_id)
        .await
        .map_err(error_to_response)?;
    Ok(Json(order))
}

/// List orders belonging to a customer email
#[instrument(skip(state))]
pub async fn orders_by_email(
    State(state): State<AppState>,
    Query(query): Query<OrdersQuery>,
) -> Result<Json<Vec<Order>>, HandlerError> {
    let email = query.email.filter(|e| !e.is_empty()).ok_or_else(|| {
        error_to_response(PaymentError::InvalidRequest {
            detail: "email query parameter is required".to_string(),
        })
    })?;

    let orders = state
        .gateway
        .orders_for(&email)
        .await
        .map_err(error_to_response)?;
    Ok(Json(orders))
}

/// Admin: list every order
#[instrument(skip(state))]
pub async fn admin_list_orders(
    State(state): State<AppState>,
) -> Result<Json<Vec<Order>>, HandlerError> {
    let orders = state.gateway.all_orders().await.map_err(error_to_response)?;
    Ok(Json(orders))
}

/// Admin: update an order's management status
#[instrument(skip(state, request))]
pub async fn admin_update_order_status(
    State(state): State<AppState>,
    Path(order_id): Path<String>,
    Json(request): Json<UpdateOrderStatusRequest>,
) -> Result<Json<UpdateOrderStatusResponse>, HandlerError> {
    let raw = request.status.filter(|s| !s.is_empty()).ok_or_else(|| {
        error_to_response(PaymentError::InvalidRequest {
            detail: "status is required in request body".to_string(),
        })
    })?;

    let status: OrderStatus = raw.parse().map_err(|detail| {
        error_to_response(PaymentError::InvalidRequest { detail })
    })?;

    let order = state
        .gateway
        .update_order_status(&order_id, status)
        .await
        .map_err(error_to_response)?;

    Ok(Json(UpdateOrderStatusResponse {
        order_id: order.order_id,
        status: order.status,
        message: "Order status updated successfully".to_string(),
    }))
}
