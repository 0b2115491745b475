//! OTP issuance and verification endpoints.

use axum::{extract::State, routing::post, Json, Router};
use serde::Deserialize;
use std::sync::Arc;

use crate::error::Result;
use crate::routes::{ok_message, MessageResponse};
use crate::services::otp;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/getVerificationCode", post(get_verification_code))
        .route("/verifyOTP", post(verify_otp))
}

#[derive(Deserialize)]
struct CodeRequest {
    email: String,
}

/// Issue a fresh OTP and email it. The record is persisted before the
/// send is attempted, so a delivery failure still leaves a verifiable
/// code behind.
async fn get_verification_code(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CodeRequest>,
) -> Result<Json<MessageResponse>> {
    otp::issue(&state.db, &state.mailer, &req.email).await?;
    Ok(ok_message("OTP sent successfully"))
}

#[derive(Deserialize)]
struct VerifyRequest {
    email: String,
    #[serde(rename = "userOTP")]
    user_otp: String,
}

/// Compare the candidate against the latest issued code for the email.
async fn verify_otp(
    State(state): State<Arc<AppState>>,
    Json(req): Json<VerifyRequest>,
) -> Result<Json<MessageResponse>> {
    otp::verify(&state.db, &req.email, &req.user_otp).await?;
    Ok(ok_message("OTP verification successful"))
}
