// SPDX-License-Identifier: MIT

//! Error-to-response mapping tests.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use rentnest::error::AppError;
use serde_json::Value;

async fn response_parts(err: AppError) -> (StatusCode, Value) {
    let response = err.into_response();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_not_found_maps_to_404() {
    let (status, body) = response_parts(AppError::NotFound("Post not found".to_string())).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["status"], 404);
    assert_eq!(body["message"], "Post not found");
}

#[tokio::test]
async fn test_conflict_maps_to_409() {
    let (status, body) =
        response_parts(AppError::Conflict("User already exists with this email".to_string()))
            .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["status"], 409);
}

#[tokio::test]
async fn test_invalid_otp_maps_to_400() {
    let (status, body) = response_parts(AppError::InvalidOtp).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid OTP");
}

#[tokio::test]
async fn test_unauthorized_maps_to_401_with_reason() {
    let (status, body) =
        response_parts(AppError::Unauthorized("User is not verified".to_string())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "User is not verified");
}

#[tokio::test]
async fn test_invalid_token_maps_to_403() {
    let (status, body) = response_parts(AppError::InvalidToken).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["status"], 403);
}

#[tokio::test]
async fn test_database_error_hides_details() {
    let (status, body) =
        response_parts(AppError::Database("password=secret123 leaked".to_string())).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["message"], "Internal Server Error");

    let raw = body.to_string();
    assert!(!raw.contains("secret123"));
}

#[tokio::test]
async fn test_delivery_failure_has_its_own_message() {
    let (status, body) =
        response_parts(AppError::Delivery("connection refused".to_string())).await;

    // Same 500 class as other internal failures, but the caller can
    // tell the code was persisted and only the email failed.
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["message"], "Failed to send OTP");
}

#[tokio::test]
async fn test_internal_error_hides_details() {
    let (status, body) =
        response_parts(AppError::Internal(anyhow::anyhow!("stack trace here"))).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(!body.to_string().contains("stack trace"));
}
