//! Axum route handlers for the Applications API.

use axum::{
    extract::{Multipart, Path, State},
    Json,
};
use serde::Serialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::applications::lifecycle::{
    create_application, delete_application, get_application, list_applications,
    update_application,
};
use crate::errors::AppError;
use crate::files::service::{attach_file, list_files_for_application};
use crate::files::transfer::read_form;
use crate::models::application::{Application, ApplicationCreate, ApplicationUpdate};
use crate::models::file::{ApplicationFile, FileType};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub message: String,
    pub file_path: String,
}

/// GET /api/applications
pub async fn handle_list_applications(
    State(state): State<AppState>,
) -> Result<Json<Vec<Application>>, AppError> {
    Ok(Json(list_applications(state.docs.as_ref()).await?))
}

/// POST /api/applications
pub async fn handle_create_application(
    State(state): State<AppState>,
    Json(request): Json<ApplicationCreate>,
) -> Result<Json<Application>, AppError> {
    Ok(Json(create_application(state.docs.as_ref(), request).await?))
}

/// GET /api/applications/:id
pub async fn handle_get_application(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Application>, AppError> {
    Ok(Json(get_application(state.docs.as_ref(), id).await?))
}

/// PUT /api/applications/:id
///
/// Partial update. A status change appends to the status history.
pub async fn handle_update_application(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<ApplicationUpdate>,
) -> Result<Json<Application>, AppError> {
    Ok(Json(update_application(state.docs.as_ref(), id, request).await?))
}

/// DELETE /api/applications/:id
pub async fn handle_delete_application(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    delete_application(
        state.docs.as_ref(),
        state.blobs.as_ref(),
        &state.config.application_files_bucket,
        id,
    )
    .await?;
    Ok(Json(json!({ "message": "Application deleted" })))
}

/// POST /api/applications/:id/files
///
/// Multipart form with a `file` part and a `file_type` field
/// (`resume` or `cover_letter`).
pub async fn handle_upload_application_file(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    let form = read_form(multipart).await?;
    let file_type: FileType = form.require_text("file_type")?.parse()?;
    let file = form.require_file()?;

    let stored = attach_file(
        state.docs.as_ref(),
        state.blobs.as_ref(),
        &state.config.application_files_bucket,
        id,
        file_type,
        file,
    )
    .await?;

    Ok(Json(UploadResponse {
        message: "File uploaded".to_string(),
        file_path: stored.file_path,
    }))
}

/// GET /api/applications/:id/files
pub async fn handle_list_application_files(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<ApplicationFile>>, AppError> {
    Ok(Json(
        list_files_for_application(state.docs.as_ref(), id).await?,
    ))
}
