//! # Payment Error Types
//!
//! Typed error handling for the mockpay gateway core.
//! All gateway operations return `Result<T, PaymentError>`.

use thiserror::Error;

/// Core error type for all gateway operations
#[derive(Debug, Error)]
pub enum PaymentError {
    /// Cart failed validation (empty, negative price, non-positive qty)
    #[error("Invalid cart data")]
    InvalidCart { detail: String },

    /// Customer failed validation (missing email)
    #[error("Invalid customer data")]
    InvalidCustomer { detail: String },

    /// Malformed or missing request fields
    #[error("Invalid request")]
    InvalidRequest { detail: String },

    /// No session with this id exists
    #[error("Payment session not found")]
    SessionNotFound { session_id: String },

    /// Session TTL elapsed before completion
    #[error("Payment session expired")]
    SessionExpired { session_id: String },

    /// Completion is exactly-once; a second attempt is rejected
    #[error("Payment already completed")]
    AlreadyCompleted { session_id: String },

    /// No order with this id exists
    #[error("Order not found")]
    OrderNotFound { order_id: String },

    /// Store I/O failure (logged, surfaced as 500 without internals)
    #[error("Storage error: {0}")]
    Storage(String),

    /// Internal error (should not happen)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl PaymentError {
    /// Returns the HTTP status code appropriate for this error
    pub fn status_code(&self) -> u16 {
        match self {
            PaymentError::InvalidCart { .. } => 400,
            PaymentError::InvalidCustomer { .. } => 400,
            PaymentError::InvalidRequest { .. } => 400,
            PaymentError::SessionNotFound { .. } => 404,
            PaymentError::SessionExpired { .. } => 400,
            PaymentError::AlreadyCompleted { .. } => 400,
            PaymentError::OrderNotFound { .. } => 404,
            PaymentError::Storage(_) => 500,
            PaymentError::Internal(_) => 500,
        }
    }

    /// Human-readable detail line for the `{error, detail}` wire payload
    pub fn detail(&self) -> String {
        match self {
            PaymentError::InvalidCart { detail } => detail.clone(),
            PaymentError::InvalidCustomer { detail } => detail.clone(),
            PaymentError::InvalidRequest { detail } => detail.clone(),
            PaymentError::SessionNotFound { .. } => "Invalid session ID".to_string(),
            PaymentError::SessionExpired { .. } => {
                "Session has expired, please create a new one".to_string()
            }
            PaymentError::AlreadyCompleted { .. } => {
                "This payment has already been processed".to_string()
            }
            PaymentError::OrderNotFound { .. } => "Invalid order ID".to_string(),
            PaymentError::Storage(_) | PaymentError::Internal(_) => {
                "An unexpected error occurred".to_string()
            }
        }
    }

    /// Returns true if the failure came from the storage layer
    pub fn is_storage(&self) -> bool {
        matches!(self, PaymentError::Storage(_))
    }
}

/// Result type alias for gateway operations
pub type PaymentResult<T> = Result<T, PaymentError>;
