//! Payment ledger: one record per checkout session, activating ad
//! status on exactly one post.

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use mongodb::bson::oid::ObjectId;
use std::sync::Arc;

use crate::error::{AppError, Result};
use crate::models::{PaymentRequest, Subscription};
use crate::routes::{ok, DataResponse};
use crate::time_utils::now_rfc3339;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/make-payment", post(make_payment))
        .route("/all-subscriptions", get(all_subscriptions))
}

/// Record a payment session and promote the post to ad status.
///
/// A replayed session id is rejected with Conflict before anything is
/// touched: the ledger stays append-only and the post is activated
/// exactly once per session. The response echoes the payload as
/// submitted, which is what the frontend consumes.
async fn make_payment(
    State(state): State<Arc<AppState>>,
    Json(req): Json<PaymentRequest>,
) -> Result<Json<DataResponse<PaymentRequest>>> {
    if state
        .db
        .find_subscription_by_session(&req.session_id)
        .await?
        .is_some()
    {
        return Err(AppError::Conflict(
            "Payment already recorded for this session".to_string(),
        ));
    }

    let post_id = ObjectId::parse_str(&req.post_id)
        .map_err(|_| AppError::BadRequest("Invalid post id".to_string()))?;

    // Activation is unconditional: a post already promoted stays
    // promoted. A miss means the post id does not resolve.
    let matched = state.db.set_post_ads(&post_id).await?;
    if !matched {
        return Err(AppError::NotFound("Post not found".to_string()));
    }

    let subscription = req.clone().into_subscription(now_rfc3339());
    state.db.insert_subscription(&subscription).await?;

    tracing::info!(
        session_id = %req.session_id,
        post_id = %req.post_id,
        "Payment recorded, post promoted to ad"
    );

    Ok(ok(req))
}

async fn all_subscriptions(
    State(state): State<Arc<AppState>>,
) -> Result<Json<DataResponse<Vec<Subscription>>>> {
    Ok(ok(state.db.list_subscriptions().await?))
}
