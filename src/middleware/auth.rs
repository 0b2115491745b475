// SPDX-License-Identifier: MIT

//! JWT authentication middleware and token revocation.

use crate::error::AppError;
use crate::AppState;
use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use dashmap::DashSet;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Credential validity window.
const TOKEN_TTL_SECS: usize = 60 * 60;

/// JWT claims structure.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (user id, ObjectId hex)
    pub sub: String,
    /// Expiration time (Unix timestamp)
    pub exp: usize,
    /// Issued at (Unix timestamp)
    pub iat: usize,
}

/// Authenticated user extracted from JWT.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: ObjectId,
}

/// Process-wide set of revoked credentials.
///
/// Injected capability, not a global: handlers reach it through
/// `AppState`. No eviction - token expiry bounds how long an entry
/// stays relevant, and the set does not survive a restart. Single
/// instance deployments only.
#[derive(Clone, Default)]
pub struct RevocationList {
    revoked: Arc<DashSet<String>>,
}

impl RevocationList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn revoke(&self, token: impl Into<String>) {
        self.revoked.insert(token.into());
    }

    pub fn contains(&self, token: &str) -> bool {
        self.revoked.contains(token)
    }
}

/// Middleware that requires a valid bearer credential.
///
/// The token travels in `Authorization` as-is; a conventional
/// `Bearer ` prefix is tolerated and stripped. Missing header is 401,
/// anything wrong with the token itself (bad signature, expired,
/// revoked) is 403.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let header_value = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized("Authorization token missing".to_string()))?;

    let token = header_value.strip_prefix("Bearer ").unwrap_or(header_value);

    // Revocation is consulted before signature checking.
    if state.revoked.contains(token) {
        return Err(AppError::InvalidToken);
    }

    let key = DecodingKey::from_secret(&state.config.jwt_signing_key);
    let validation = Validation::new(Algorithm::HS256);

    let token_data =
        decode::<Claims>(token, &key, &validation).map_err(|_| AppError::InvalidToken)?;

    let user_id =
        ObjectId::parse_str(&token_data.claims.sub).map_err(|_| AppError::InvalidToken)?;

    request.extensions_mut().insert(AuthUser { user_id });

    Ok(next.run(request).await)
}

/// Create a JWT for a user session. Always expires after one hour.
pub fn create_jwt(user_id: &ObjectId, signing_key: &[u8]) -> anyhow::Result<String> {
    use jsonwebtoken::{encode, EncodingKey, Header};
    use std::time::{SystemTime, UNIX_EPOCH};

    let now = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs() as usize;

    let claims = Claims {
        sub: user_id.to_hex(),
        iat: now,
        exp: now + TOKEN_TTL_SECS,
    };

    Ok(encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(signing_key),
    )?)
}
