// SPDX-License-Identifier: MIT

//! Rentnest API Server
//!
//! REST backend for a rental/classifieds marketplace: registration with
//! OTP email verification, listings with moderation, favorites,
//! notifications, and paid ad promotion.

use rentnest::{
    config::Config, db::MarketDb, middleware::auth::RevocationList, services::Mailer, AppState,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();

    // Load configuration from environment
    let config = Config::from_env().expect("Failed to load configuration");
    tracing::info!(port = config.port, "Starting Rentnest API");

    // Connect to MongoDB
    let db = MarketDb::new(&config.mongodb_uri, &config.database_name)
        .await
        .expect("Failed to connect to MongoDB");

    // OTP delivery
    let mailer = Mailer::new(config.smtp_url.as_deref(), &config.smtp_from)
        .expect("Failed to initialize mailer");
    if config.smtp_url.is_none() {
        tracing::warn!("SMTP_URL not set; OTP codes will be logged, not emailed");
    }

    // Build shared state
    let state = Arc::new(AppState {
        config: config.clone(),
        db,
        mailer,
        revoked: RevocationList::new(),
    });

    // Build router
    let app = rentnest::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("rentnest=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}
