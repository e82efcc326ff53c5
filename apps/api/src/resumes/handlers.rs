//! Axum route handlers for the Resume Versions API.

use axum::{
    extract::{Multipart, Path, State},
    response::Response,
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::applications::handlers::UploadResponse;
use crate::errors::AppError;
use crate::files::transfer::{attachment, read_form};
use crate::models::resume::{ResumeVersion, ResumeVersionCreate, ResumeVersionUpdate};
use crate::resumes::service::{
    create_resume, delete_resume, download_resume, get_resume, list_resumes, replace_resume_file,
    update_resume,
};
use crate::state::AppState;

/// GET /api/resumes
pub async fn handle_list_resumes(
    State(state): State<AppState>,
) -> Result<Json<Vec<ResumeVersion>>, AppError> {
    Ok(Json(list_resumes(state.docs.as_ref()).await?))
}

/// POST /api/resumes
///
/// Multipart form: `name` (required), `description`, `target_roles`,
/// `content`, and an optional `file`.
pub async fn handle_create_resume(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<ResumeVersion>, AppError> {
    let form = read_form(multipart).await?;
    let input = ResumeVersionCreate {
        name: form.require_text("name")?,
        description: form.text("description"),
        target_roles: form.text("target_roles"),
        content: form.text("content"),
    };

    let resume = create_resume(
        state.docs.as_ref(),
        state.blobs.as_ref(),
        &state.config.resumes_bucket,
        input,
        form.file,
    )
    .await?;
    Ok(Json(resume))
}

/// GET /api/resumes/:id
pub async fn handle_get_resume(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ResumeVersion>, AppError> {
    Ok(Json(get_resume(state.docs.as_ref(), id).await?))
}

/// PUT /api/resumes/:id
pub async fn handle_update_resume(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<ResumeVersionUpdate>,
) -> Result<Json<ResumeVersion>, AppError> {
    Ok(Json(update_resume(state.docs.as_ref(), id, request).await?))
}

/// DELETE /api/resumes/:id
pub async fn handle_delete_resume(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    delete_resume(
        state.docs.as_ref(),
        state.blobs.as_ref(),
        &state.config.resumes_bucket,
        id,
    )
    .await?;
    Ok(Json(json!({ "message": "Resume deleted" })))
}

/// GET /api/resumes/:id/download
pub async fn handle_download_resume(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    let (resume, bytes) = download_resume(
        state.docs.as_ref(),
        state.blobs.as_ref(),
        &state.config.resumes_bucket,
        id,
    )
    .await?;
    let file_name = resume.file_name.as_deref().unwrap_or("resume.pdf");
    Ok(attachment(file_name, resume.content_type.as_deref(), bytes))
}

/// POST /api/resumes/:id/upload
///
/// Replaces the stored file with the multipart `file` part.
pub async fn handle_upload_resume_file(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    let file = read_form(multipart).await?.require_file()?;
    let updated = replace_resume_file(
        state.docs.as_ref(),
        state.blobs.as_ref(),
        &state.config.resumes_bucket,
        id,
        file,
    )
    .await?;

    Ok(Json(UploadResponse {
        message: "File uploaded".to_string(),
        file_path: updated.file_path.unwrap_or_default(),
    }))
}
