//! Directional notifications with two-phase delivery visibility.
//!
//! A record is only "delivered" to a side while that side's sender-tag
//! holds its sentinel value; toggling the tag via the PATCH endpoint is
//! how a counterpart claims or releases visibility.

use axum::{
    extract::{Path, State},
    routing::{delete, get, patch, post},
    Json, Router,
};
use mongodb::bson::oid::ObjectId;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::error::{AppError, Result};
use crate::models::{NewNotification, Notification, NotificationPatch};
use crate::routes::{ok, DataResponse};
use crate::time_utils::now_rfc3339;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/create-notification", post(create_notification))
        .route("/to-notifications/{id}", get(to_notifications))
        .route("/from-notifications/{id}", get(from_notifications))
        .route("/post-notifications/{id}", get(post_notifications))
        .route("/all-notifications", get(all_notifications))
        .route("/update-notification/{id}", patch(update_notification))
        .route("/delete-notification/{id}", delete(delete_notification))
}

fn parse_notification_id(id: &str) -> Result<ObjectId> {
    ObjectId::parse_str(id)
        .map_err(|_| AppError::BadRequest("Invalid notification id".to_string()))
}

async fn create_notification(
    State(state): State<Arc<AppState>>,
    Json(req): Json<NewNotification>,
) -> Result<Json<DataResponse<Notification>>> {
    let notification = req.into_notification(now_rfc3339());
    state.db.insert_notification(&notification).await?;
    Ok(ok(notification))
}

/// Inbox: `to` matches AND the receiver-side tag is still active.
async fn to_notifications(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<DataResponse<Vec<Notification>>>> {
    Ok(ok(state.db.notifications_to(&id).await?))
}

/// Outbox: `from` matches AND the sender-side tag is still active.
async fn from_notifications(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<DataResponse<Vec<Notification>>>> {
    Ok(ok(state.db.notifications_from(&id).await?))
}

async fn post_notifications(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<DataResponse<Vec<Notification>>>> {
    Ok(ok(state.db.notifications_by_post(&id).await?))
}

async fn all_notifications(
    State(state): State<Arc<AppState>>,
) -> Result<Json<DataResponse<Vec<Notification>>>> {
    Ok(ok(state.db.list_notifications().await?))
}

#[derive(Deserialize)]
struct UpdateNotificationRequest {
    data: NotificationPatch,
}

async fn update_notification(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<UpdateNotificationRequest>,
) -> Result<Json<DataResponse<Notification>>> {
    let id = parse_notification_id(&id)?;

    let matched = state
        .db
        .update_notification(&id, req.data.into_set_document(now_rfc3339()))
        .await?;
    if !matched {
        return Err(AppError::NotFound("Notification not found".to_string()));
    }

    let notification = state
        .db
        .get_notification(&id)
        .await?
        .ok_or_else(|| AppError::NotFound("Notification not found".to_string()))?;
    Ok(ok(notification))
}

async fn delete_notification(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<DataResponse<Value>>> {
    let id = parse_notification_id(&id)?;
    let deleted = state.db.delete_notification(&id).await?;
    Ok(ok(json!({ "deleted": deleted })))
}
