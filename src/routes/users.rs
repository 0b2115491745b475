//! User CRUD for admins and profile updates.

use axum::{
    extract::{Path, State},
    routing::{delete, get, put},
    Json, Router,
};
use mongodb::bson::{doc, oid::ObjectId};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::error::{AppError, Result};
use crate::models::{User, UserPatch};
use crate::routes::{ok, ok_message, DataResponse, MessageResponse};
use crate::time_utils::now_rfc3339;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/all-users", get(all_users))
        .route("/single-user/{id}", get(single_user))
        .route("/update-user/{id}", put(update_user))
        .route("/delete-user/{id}", delete(delete_user))
        .route("/reset-password/{id}", put(reset_password))
}

fn parse_user_id(id: &str) -> Result<ObjectId> {
    ObjectId::parse_str(id).map_err(|_| AppError::BadRequest("Invalid user id".to_string()))
}

async fn all_users(State(state): State<Arc<AppState>>) -> Result<Json<DataResponse<Vec<User>>>> {
    let users = state.db.list_users().await?;
    Ok(ok(users))
}

async fn single_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<DataResponse<User>>> {
    let id = parse_user_id(&id)?;
    let user = state
        .db
        .get_user(&id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
    Ok(ok(user))
}

#[derive(Deserialize)]
struct UpdateUserRequest {
    data: UserPatch,
    /// Blob reference from a prior `/upload`; takes precedence over any
    /// `image` inside `data`.
    image: Option<String>,
}

/// Sparse merge: only fields present and non-null in `data` are written,
/// `updatedAt` is always refreshed.
async fn update_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<UpdateUserRequest>,
) -> Result<Json<DataResponse<User>>> {
    let id = parse_user_id(&id)?;

    let mut patch = req.data;
    if req.image.is_some() {
        patch.image = req.image;
    }

    let matched = state
        .db
        .update_user(&id, patch.into_set_document(now_rfc3339()))
        .await?;
    if !matched {
        return Err(AppError::NotFound("User not found".to_string()));
    }

    let user = state
        .db
        .get_user(&id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
    Ok(ok(user))
}

/// Unconditional delete. No cascade: posts, notifications and favorite
/// references to this user are left dangling and readers skip them.
async fn delete_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<DataResponse<Value>>> {
    let id = parse_user_id(&id)?;
    let deleted = state.db.delete_user(&id).await?;
    Ok(ok(json!({ "deleted": deleted })))
}

#[derive(Deserialize)]
struct ResetPasswordRequest {
    data: ResetPasswordData,
}

#[derive(Deserialize)]
struct ResetPasswordData {
    password: String,
}

async fn reset_password(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<ResetPasswordRequest>,
) -> Result<Json<MessageResponse>> {
    let id = parse_user_id(&id)?;

    let matched = state
        .db
        .update_user(
            &id,
            doc! { "password": req.data.password, "updatedAt": now_rfc3339() },
        )
        .await?;
    if !matched {
        return Err(AppError::NotFound("User not found".to_string()));
    }

    Ok(ok_message("Password updated"))
}
