//! Multi-file image upload into the local blob directory.

use axum::{extract::Multipart, extract::State, routing::post, Json, Router};
use serde::Serialize;
use std::path::Path as FsPath;
use std::sync::Arc;

use crate::error::{AppError, Result};
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/upload", post(upload))
}

#[derive(Serialize)]
pub struct UploadResponse {
    pub status: u16,
    #[serde(rename = "fileNames")]
    pub file_names: Vec<String>,
}

/// Store every part of the multipart body and return the generated file
/// names. Files are served back under `/uploads/{name}`.
async fn upload(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>> {
    tokio::fs::create_dir_all(&state.config.upload_dir)
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("creating upload dir: {}", e)))?;

    let mut file_names = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("malformed multipart body: {}", e)))?
    {
        let original = field
            .file_name()
            .unwrap_or("upload")
            // The stored name must never escape the upload directory.
            .replace(['/', '\\'], "_");

        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(format!("reading upload: {}", e)))?;

        let name = format!("{}_{}", nanoid::nanoid!(10), original);
        let dest = FsPath::new(&state.config.upload_dir).join(&name);

        tokio::fs::write(&dest, &bytes)
            .await
            .map_err(|e| AppError::Internal(anyhow::anyhow!("writing upload: {}", e)))?;

        tracing::debug!(name = %name, size = bytes.len(), "File uploaded");
        file_names.push(name);
    }

    Ok(Json(UploadResponse {
        status: 200,
        file_names,
    }))
}
