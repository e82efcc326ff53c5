//! Axum route handlers for application file metadata and downloads.

use axum::{
    extract::{Path, State},
    response::Response,
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::errors::AppError;
use crate::files::service::{delete_file, download_file, get_file};
use crate::files::transfer::attachment;
use crate::models::file::ApplicationFile;
use crate::state::AppState;

/// GET /api/files/:id
pub async fn handle_get_file(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApplicationFile>, AppError> {
    Ok(Json(get_file(state.docs.as_ref(), id).await?))
}

/// GET /api/files/:id/download
pub async fn handle_download_file(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    let (file, bytes) = download_file(
        state.docs.as_ref(),
        state.blobs.as_ref(),
        &state.config.application_files_bucket,
        id,
    )
    .await?;
    Ok(attachment(&file.file_name, file.content_type.as_deref(), bytes))
}

/// DELETE /api/files/:id
pub async fn handle_delete_file(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    delete_file(
        state.docs.as_ref(),
        state.blobs.as_ref(),
        &state.config.application_files_bucket,
        id,
    )
    .await?;
    Ok(Json(json!({ "message": "File deleted" })))
}
