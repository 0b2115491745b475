// SPDX-License-Identifier: MIT

//! Registration, login and logout.

use axum::{
    extract::{Query, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::{AppError, Result};
use crate::middleware::auth::create_jwt;
use crate::models::{NewUser, User};
use crate::routes::{ok_message, MessageResponse};
use crate::time_utils::now_rfc3339;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", get(logout))
}

/// Envelope for register/login: the user record plus a fresh credential.
#[derive(Serialize)]
pub struct AuthResponse {
    pub status: u16,
    pub data: User,
    pub jwt: String,
}

#[derive(Deserialize)]
struct RegisterRequest {
    data: NewUser,
}

/// Create a user. Email uniqueness is checked first; a duplicate is
/// rejected before anything is written.
async fn register(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterRequest>,
) -> Result<Json<AuthResponse>> {
    if state
        .db
        .find_user_by_email(&req.data.email)
        .await?
        .is_some()
    {
        return Err(AppError::Conflict(
            "User already exists with this email".to_string(),
        ));
    }

    let user = req.data.into_user(now_rfc3339());
    state.db.insert_user(&user).await?;

    let jwt = create_jwt(&user.id, &state.config.jwt_signing_key)?;

    tracing::info!(user_id = %user.id, "User registered");

    Ok(Json(AuthResponse {
        status: 200,
        data: user,
        jwt,
    }))
}

#[derive(Deserialize)]
struct LoginRequest {
    email: String,
    password: String,
}

/// Exact (email, password) lookup. Only a stored `isVerified: false`
/// blocks login; an unset flag passes. Banned users never get a token.
async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<AuthResponse>> {
    let user = state
        .db
        .find_user_by_credentials(&req.email, &req.password)
        .await?
        .ok_or_else(|| {
            AppError::NotFound("User does not exist with this credentials".to_string())
        })?;

    if user.is_verified == Some(false) {
        return Err(AppError::Unauthorized("User is not verified".to_string()));
    }

    if user.is_banned == Some(true) {
        return Err(AppError::Unauthorized("User is banned".to_string()));
    }

    let jwt = create_jwt(&user.id, &state.config.jwt_signing_key)?;

    Ok(Json(AuthResponse {
        status: 200,
        data: user,
        jwt,
    }))
}

#[derive(Deserialize)]
struct LogoutParams {
    jwt: Option<String>,
}

/// Revoke the given credential. Idempotent.
async fn logout(
    State(state): State<Arc<AppState>>,
    Query(params): Query<LogoutParams>,
) -> Result<Json<MessageResponse>> {
    let token = params
        .jwt
        .ok_or_else(|| AppError::BadRequest("jwt query parameter missing".to_string()))?;

    state.revoked.revoke(token);

    Ok(ok_message("Logged out"))
}
