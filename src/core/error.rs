use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use rust_decimal::Decimal;

/// Application-wide Result type
pub type Result<T> = std::result::Result<T, AppError>;

/// Main application error type
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    /// Schedule generation rejected its inputs (non-positive principal/tenure,
    /// negative rate)
    #[error("Invalid schedule input: {0}")]
    InvalidScheduleInput(String),

    /// Payment rejected before allocation (non-positive amount, or the loan
    /// is not open for payments)
    #[error("Invalid payment amount: {0}")]
    InvalidPaymentAmount(String),

    /// Payment exceeds what the ledger can absorb; the excess is rejected
    /// rather than silently capped
    #[error("Payment exceeds the collectible amount; maximum acceptable is {max_acceptable}")]
    OverpaymentAttempt { max_acceptable: Decimal },

    /// Optimistic concurrency check failed; caller must reload and retry
    #[error("Concurrency conflict: {0}")]
    ConcurrencyConflict(String),

    /// Validation errors for business rules
    #[error("Validation error: {0}")]
    Validation(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Database operation errors
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Internal server errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        let status_code = self.status_code();
        let error_message = self.to_string();

        let body = match self {
            AppError::OverpaymentAttempt { max_acceptable } => serde_json::json!({
                "error": {
                    "message": error_message,
                    "code": status_code.as_u16(),
                    "max_acceptable": max_acceptable.to_string(),
                }
            }),
            _ => serde_json::json!({
                "error": {
                    "message": error_message,
                    "code": status_code.as_u16(),
                }
            }),
        };

        HttpResponse::build(status_code).json(body)
    }

    fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidScheduleInput(_) => StatusCode::BAD_REQUEST,
            AppError::InvalidPaymentAmount(_) => StatusCode::BAD_REQUEST,
            AppError::OverpaymentAttempt { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::ConcurrencyConflict(_) => StatusCode::CONFLICT,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Json(_) => StatusCode::BAD_REQUEST,
            AppError::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

// Helper functions for common error scenarios
impl AppError {
    pub fn invalid_schedule(msg: impl Into<String>) -> Self {
        AppError::InvalidScheduleInput(msg.into())
    }

    pub fn invalid_payment(msg: impl Into<String>) -> Self {
        AppError::InvalidPaymentAmount(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        AppError::ConcurrencyConflict(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(msg.into())
    }

    pub fn not_found(resource: impl Into<String>) -> Self {
        AppError::NotFound(resource.into())
    }
}
