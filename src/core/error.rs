use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};

/// Application-wide Result type
pub type Result<T> = std::result::Result<T, AppError>;

/// Main application error type
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    /// Request signing failed. Fatal for the enclosing payment-creation
    /// call: no request may leave the process unsigned.
    #[error("Signing error: {0}")]
    Signing(String),

    /// The processor answered with HTTP >= 400. Never mapped to success.
    #[error("Gateway rejected request: HTTP {status}")]
    GatewayRejected { status: u16, body: String },

    /// Network-level failure talking to the processor or a rate feed.
    /// Retryable by the caller, never retried internally.
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Inbound webhook body could not be normalized. Answered with 400.
    #[error("Malformed callback: {0}")]
    MalformedCallback(String),

    /// Exchange-rate fetch failed. Non-fatal: conversion degrades to the
    /// cached or static rate.
    #[error("Rate fetch failed: {0}")]
    RateFetch(String),

    /// Validation errors for business rules
    #[error("Validation error: {0}")]
    Validation(String),

    /// Database operation errors
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Internal server errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        let status_code = self.status_code();
        let error_message = self.to_string();

        HttpResponse::build(status_code).json(serde_json::json!({
            "success": false,
            "error": {
                "message": error_message,
                "code": status_code.as_u16(),
            }
        }))
    }

    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Signing(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::GatewayRejected { .. } => StatusCode::BAD_GATEWAY,
            AppError::Transport(_) => StatusCode::BAD_GATEWAY,
            AppError::MalformedCallback(_) => StatusCode::BAD_REQUEST,
            AppError::RateFetch(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Json(_) => StatusCode::BAD_REQUEST,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

// Helper functions for common error scenarios
impl AppError {
    pub fn signing(msg: impl Into<String>) -> Self {
        AppError::Signing(msg.into())
    }

    pub fn malformed_callback(msg: impl Into<String>) -> Self {
        AppError::MalformedCallback(msg.into())
    }

    pub fn rate_fetch(msg: impl Into<String>) -> Self {
        AppError::RateFetch(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(msg.into())
    }

    pub fn not_found(resource: impl Into<String>) -> Self {
        AppError::NotFound(resource.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        AppError::Internal(msg.into())
    }
}
