// SPDX-License-Identifier: MIT

//! Application error types with consistent API responses.
//!
//! Domain-level negative outcomes (not found, conflict, invalid OTP) are
//! ordinary result values here, mapped to their response without
//! error-level logging. Only unexpected store/delivery failures log.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Application error type that converts to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Authentication required")]
    Unauthorized(String),

    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Invalid OTP")]
    InvalidOtp,

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Failed to send OTP: {0}")]
    Delivery(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// JSON error response body. The HTTP-like code is duplicated in the
/// body, matching the envelope the frontend consumes.
#[derive(Serialize)]
struct ErrorResponse {
    status: u16,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            AppError::InvalidToken => (
                StatusCode::FORBIDDEN,
                "Invalid or expired JWT token".to_string(),
            ),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
            AppError::InvalidOtp => (StatusCode::BAD_REQUEST, "Invalid OTP".to_string()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Delivery(msg) => {
                tracing::error!(error = %msg, "OTP delivery failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to send OTP".to_string(),
                )
            }
            AppError::Database(msg) => {
                tracing::error!(error = %msg, "Database error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error".to_string(),
                )
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "Internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error".to_string(),
                )
            }
        };

        let body = ErrorResponse {
            status: status.as_u16(),
            message,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;
