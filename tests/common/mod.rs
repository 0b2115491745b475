// SPDX-License-Identifier: MIT

use rentnest::config::Config;
use rentnest::db::MarketDb;
use rentnest::middleware::auth::RevocationList;
use rentnest::routes::create_router;
use rentnest::services::Mailer;
use rentnest::AppState;
use std::sync::Arc;

/// Check if a MongoDB instance is available via environment variable.
#[allow(dead_code)]
pub fn mongo_available() -> bool {
    std::env::var("MONGODB_URI").is_ok()
}

/// Skip test with message if MongoDB is not available.
#[macro_export]
macro_rules! require_mongo {
    () => {
        if !crate::common::mongo_available() {
            eprintln!("⚠️  Skipping: MONGODB_URI not set");
            return;
        }
    };
}

/// Create a test database connection.
#[allow(dead_code)]
pub async fn test_db() -> MarketDb {
    let uri = std::env::var("MONGODB_URI").expect("MONGODB_URI must be set");
    MarketDb::new(&uri, "rentnest_test")
        .await
        .expect("Failed to connect to MongoDB")
}

/// Create a mock database connection (offline).
#[allow(dead_code)]
pub fn test_db_offline() -> MarketDb {
    MarketDb::new_mock()
}

/// Create a test app with offline mock dependencies.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>) {
    build_app(test_db_offline())
}

/// Create a test app backed by a real MongoDB connection.
#[allow(dead_code)]
pub async fn create_test_app_with_db() -> (axum::Router, Arc<AppState>) {
    build_app(test_db().await)
}

fn build_app(db: MarketDb) -> (axum::Router, Arc<AppState>) {
    let state = Arc::new(AppState {
        config: Config::test_default(),
        db,
        mailer: Mailer::new_mock(),
        revoked: RevocationList::new(),
    });

    (create_router(state.clone()), state)
}
