// SPDX-License-Identifier: MIT

//! HTTP route handlers.

pub mod auth;
pub mod favorites;
pub mod notifications;
pub mod otp;
pub mod posts;
pub mod subscriptions;
pub mod uploads;
pub mod users;

use crate::middleware::auth::require_auth;
use crate::AppState;
use axum::http::{header, Method};
use axum::{middleware, routing::get, Json, Router};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

/// Standard success envelope: the HTTP-like code is duplicated in the
/// body, which is what the frontend consumes.
#[derive(Serialize)]
pub struct DataResponse<T> {
    pub status: u16,
    pub data: T,
}

/// Success envelope carrying only a human-readable message.
#[derive(Serialize)]
pub struct MessageResponse {
    pub status: u16,
    pub message: String,
}

pub fn ok<T: Serialize>(data: T) -> Json<DataResponse<T>> {
    Json(DataResponse { status: 200, data })
}

pub fn ok_message(message: impl Into<String>) -> Json<MessageResponse> {
    Json(MessageResponse {
        status: 200,
        message: message.into(),
    })
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
}

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

async fn root() -> &'static str {
    "Rentnest API"
}

/// Build the complete router with all routes.
pub fn create_router(state: Arc<AppState>) -> Router {
    // CORS layer - allow requests from frontend URL and localhost (for dev)
    let frontend_url = state.config.frontend_url.clone();
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::AllowOrigin::predicate(
            move |origin: &axum::http::HeaderValue, _request_parts: &axum::http::request::Parts| {
                let origin_str = origin.to_str().unwrap_or("");
                origin_str == frontend_url
                    || origin_str.starts_with("http://localhost")
                    || origin_str.starts_with("http://127.0.0.1")
            },
        ))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT]);

    // Public routes (no credential required)
    let public_routes = Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .merge(auth::routes());

    // Protected routes (credential required)
    let protected_routes = Router::new()
        .merge(users::routes())
        .merge(otp::routes())
        .merge(posts::routes())
        .merge(notifications::routes())
        .merge(favorites::routes())
        .merge(subscriptions::routes())
        .merge(uploads::routes())
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        // Uploaded images are served back as static files.
        .nest_service("/uploads", ServeDir::new(&state.config.upload_dir))
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .with_state(state)
}
