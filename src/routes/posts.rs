//! Listing CRUD and the moderation/search views.

use axum::{
    extract::{Path, State},
    routing::{delete, get, post, put},
    Extension, Json, Router,
};
use mongodb::bson::oid::ObjectId;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::{NewPost, Post, PostPatch};
use crate::routes::{ok, DataResponse};
use crate::time_utils::now_rfc3339;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/create-post", post(create_post))
        .route("/all-posts", get(all_posts))
        .route("/pending-posts", get(pending_posts))
        .route("/approved-posts", get(approved_posts))
        .route("/nearest-posts/{location}", get(nearest_posts))
        .route("/single-post/{id}", get(single_post))
        .route("/single-post-by-userId/{id}", get(posts_by_user))
        .route("/update-post/{id}", put(update_post))
        .route("/delete-post/{id}", delete(delete_post))
}

fn parse_post_id(id: &str) -> Result<ObjectId> {
    ObjectId::parse_str(id).map_err(|_| AppError::BadRequest("Invalid post id".to_string()))
}

#[derive(Deserialize)]
struct CreatePostRequest {
    data: NewPost,
    /// Blob reference from a prior `/upload`; takes precedence over any
    /// `image` inside `data`.
    image: Option<String>,
}

/// Submit a listing. Ownership comes from the credential, not the
/// payload; the post starts unapproved and stays out of the approved
/// view until a moderator flips it.
async fn create_post(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Json(req): Json<CreatePostRequest>,
) -> Result<Json<DataResponse<Post>>> {
    let mut data = req.data;
    if req.image.is_some() {
        data.image = req.image;
    }

    let post = data.into_post(auth.user_id.to_hex(), now_rfc3339());
    state.db.insert_post(&post).await?;

    tracing::info!(post_id = %post.id, owner = %post.user_id, "Post created");

    Ok(ok(post))
}

async fn all_posts(State(state): State<Arc<AppState>>) -> Result<Json<DataResponse<Vec<Post>>>> {
    Ok(ok(state.db.list_posts().await?))
}

async fn pending_posts(
    State(state): State<Arc<AppState>>,
) -> Result<Json<DataResponse<Vec<Post>>>> {
    Ok(ok(state.db.list_pending_posts().await?))
}

async fn approved_posts(
    State(state): State<Arc<AppState>>,
) -> Result<Json<DataResponse<Vec<Post>>>> {
    Ok(ok(state.db.list_approved_posts().await?))
}

/// Case-insensitive substring match on location, approved posts only.
async fn nearest_posts(
    State(state): State<Arc<AppState>>,
    Path(location): Path<String>,
) -> Result<Json<DataResponse<Vec<Post>>>> {
    Ok(ok(state.db.nearest_posts(&location).await?))
}

async fn single_post(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<DataResponse<Post>>> {
    let id = parse_post_id(&id)?;
    let post = state
        .db
        .get_post(&id)
        .await?
        .ok_or_else(|| AppError::NotFound("Post not found".to_string()))?;
    Ok(ok(post))
}

/// All posts owned by a user. The id is compared as a plain string.
async fn posts_by_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<DataResponse<Vec<Post>>>> {
    Ok(ok(state.db.posts_by_owner(&id).await?))
}

#[derive(Deserialize)]
struct UpdatePostRequest {
    data: PostPatch,
}

async fn update_post(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<UpdatePostRequest>,
) -> Result<Json<DataResponse<Post>>> {
    let id = parse_post_id(&id)?;

    let matched = state
        .db
        .update_post(&id, req.data.into_set_document(now_rfc3339()))
        .await?;
    if !matched {
        return Err(AppError::NotFound("Post not found".to_string()));
    }

    let post = state
        .db
        .get_post(&id)
        .await?
        .ok_or_else(|| AppError::NotFound("Post not found".to_string()))?;
    Ok(ok(post))
}

async fn delete_post(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<DataResponse<Value>>> {
    let id = parse_post_id(&id)?;
    let deleted = state.db.delete_post(&id).await?;
    Ok(ok(json!({ "deleted": deleted })))
}
