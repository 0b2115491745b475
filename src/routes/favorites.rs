//! Per-user favorites over the listings.
//!
//! The stored sequence is conceptually a set but the store does not
//! deduplicate: adding twice leaves two entries, removing pulls every
//! occurrence. Mutations go through the store's atomic array
//! primitives, never read-then-rewrite.

use axum::{
    extract::{Path, State},
    routing::{get, patch, post},
    Json, Router,
};
use mongodb::bson::oid::ObjectId;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::error::{AppError, Result};
use crate::models::Post;
use crate::routes::{ok, ok_message, DataResponse, MessageResponse};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/create-favorite", post(create_favorite))
        .route("/user-favorites/{id}", get(user_favorites))
        .route("/update-favorite/{id}", patch(update_favorite))
        .route(
            "/specific-favorite/{user_id}/{post_id}",
            get(specific_favorite),
        )
}

fn parse_user_id(id: &str) -> Result<ObjectId> {
    ObjectId::parse_str(id).map_err(|_| AppError::BadRequest("Invalid user id".to_string()))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct FavoriteRequest {
    user_id: String,
    post_id: String,
}

async fn create_favorite(
    State(state): State<Arc<AppState>>,
    Json(req): Json<FavoriteRequest>,
) -> Result<Json<MessageResponse>> {
    let user_id = parse_user_id(&req.user_id)?;

    let matched = state.db.push_favorite(&user_id, &req.post_id).await?;
    if !matched {
        return Err(AppError::NotFound("User not found".to_string()));
    }

    Ok(ok_message("Favorite added"))
}

/// Resolve the favorites sequence to full posts, preserving order.
/// Ids that no longer resolve (deleted posts, malformed ids) are
/// silently skipped.
async fn user_favorites(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<DataResponse<Vec<Post>>>> {
    let user_id = parse_user_id(&id)?;
    let user = state
        .db
        .get_user(&user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    let mut posts = Vec::new();
    for post_id in user.favorite_posts.unwrap_or_default() {
        let Ok(oid) = ObjectId::parse_str(&post_id) else {
            continue;
        };
        if let Some(post) = state.db.get_post(&oid).await? {
            posts.push(post);
        }
    }

    Ok(ok(posts))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RemoveFavoriteRequest {
    post_id: String,
}

/// Remove ALL occurrences of the post from the user's favorites.
async fn update_favorite(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<RemoveFavoriteRequest>,
) -> Result<Json<MessageResponse>> {
    let user_id = parse_user_id(&id)?;

    let matched = state.db.pull_favorite(&user_id, &req.post_id).await?;
    if !matched {
        return Err(AppError::NotFound("User not found".to_string()));
    }

    Ok(ok_message("Favorite removed"))
}

/// Membership test. A user without a favorites list is NotFound, not an
/// empty result.
async fn specific_favorite(
    State(state): State<Arc<AppState>>,
    Path((user_id, post_id)): Path<(String, String)>,
) -> Result<Json<DataResponse<Value>>> {
    let user_id = parse_user_id(&user_id)?;
    let user = state
        .db
        .get_user(&user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    let favorites = user
        .favorite_posts
        .ok_or_else(|| AppError::NotFound("User has no favorites".to_string()))?;

    let is_favorite = favorites.iter().any(|id| id == &post_id);
    Ok(ok(json!({ "isFavorite": is_favorite })))
}
