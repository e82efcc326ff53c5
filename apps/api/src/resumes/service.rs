use bytes::Bytes;
use chrono::Utc;
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::files::transfer::UploadedFile;
use crate::models::resume::{ResumeVersion, ResumeVersionCreate, ResumeVersionUpdate};
use crate::store::{
    blob_key, delete_blob_best_effort, find_all, find_by_id, insert_record, patch_fields,
    update_one, BlobStore, Collection, DocumentStore, Filter, Query,
};

pub async fn list_resumes(docs: &dyn DocumentStore) -> Result<Vec<ResumeVersion>, AppError> {
    find_all(
        docs,
        Collection::ResumeVersions,
        &Query::all().newest_first("created_at"),
    )
    .await
}

pub async fn get_resume(docs: &dyn DocumentStore, id: Uuid) -> Result<ResumeVersion, AppError> {
    find_by_id(docs, Collection::ResumeVersions, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Resume {id} not found")))
}

pub async fn create_resume(
    docs: &dyn DocumentStore,
    blobs: &dyn BlobStore,
    bucket: &str,
    input: ResumeVersionCreate,
    file: Option<UploadedFile>,
) -> Result<ResumeVersion, AppError> {
    if input.name.trim().is_empty() {
        return Err(AppError::Validation("name cannot be empty".to_string()));
    }

    let id = Uuid::new_v4();
    let now = Utc::now();
    let mut resume = ResumeVersion {
        id,
        name: input.name,
        description: input.description,
        target_roles: input.target_roles,
        content: input.content,
        file_path: None,
        file_name: None,
        content_type: None,
        created_at: now,
        updated_at: now,
    };

    if let Some(file) = file {
        let key = blob_key("resumes", id, None, &file.file_name)?;
        blobs.put(bucket, &key, file.bytes, &file.content_type).await?;
        resume.file_path = Some(key);
        resume.file_name = Some(file.file_name);
        resume.content_type = Some(file.content_type);
    }

    let stored = insert_record(docs, Collection::ResumeVersions, &resume).await?;
    info!(id = %stored.id, name = %stored.name, has_file = stored.file_path.is_some(), "Created resume");
    Ok(stored)
}

pub async fn update_resume(
    docs: &dyn DocumentStore,
    id: Uuid,
    patch: ResumeVersionUpdate,
) -> Result<ResumeVersion, AppError> {
    if patch.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
        return Err(AppError::Validation("name cannot be empty".to_string()));
    }

    let mut fields = patch_fields(&patch)?;
    fields.insert("updated_at".to_string(), json!(Utc::now()));

    update_one(docs, Collection::ResumeVersions, &Filter::by_id(id), fields)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Resume {id} not found")))
}

pub async fn delete_resume(
    docs: &dyn DocumentStore,
    blobs: &dyn BlobStore,
    bucket: &str,
    id: Uuid,
) -> Result<(), AppError> {
    let resume = get_resume(docs, id).await?;
    if let Some(path) = &resume.file_path {
        delete_blob_best_effort(blobs, bucket, path).await;
    }
    docs.delete(Collection::ResumeVersions, &Filter::by_id(id))
        .await?;
    info!(%id, "Deleted resume");
    Ok(())
}

pub async fn download_resume(
    docs: &dyn DocumentStore,
    blobs: &dyn BlobStore,
    bucket: &str,
    id: Uuid,
) -> Result<(ResumeVersion, Bytes), AppError> {
    let resume = get_resume(docs, id).await?;
    let path = resume
        .file_path
        .as_deref()
        .ok_or_else(|| AppError::NotFound(format!("Resume {id} has no file")))?;
    let bytes = blobs.get(bucket, path).await?;
    Ok((resume, bytes))
}

/// Replaces the resume's file.
///
/// The new blob is written and the record repointed before the previous blob
/// is removed (best-effort), so a failed upload leaves the old file in place.
pub async fn replace_resume_file(
    docs: &dyn DocumentStore,
    blobs: &dyn BlobStore,
    bucket: &str,
    id: Uuid,
    file: UploadedFile,
) -> Result<ResumeVersion, AppError> {
    let existing = get_resume(docs, id).await?;

    let key = blob_key("resumes", id, None, &file.file_name)?;
    blobs.put(bucket, &key, file.bytes, &file.content_type).await?;

    let mut fields = serde_json::Map::new();
    fields.insert("file_path".to_string(), json!(key));
    fields.insert("file_name".to_string(), json!(file.file_name));
    fields.insert("content_type".to_string(), json!(file.content_type));
    fields.insert("updated_at".to_string(), json!(Utc::now()));

    let updated: Option<ResumeVersion> =
        update_one(docs, Collection::ResumeVersions, &Filter::by_id(id), fields).await?;
    let Some(updated) = updated else {
        // Deleted while uploading.
        delete_blob_best_effort(blobs, bucket, &key).await;
        return Err(AppError::NotFound(format!("Resume {id} not found")));
    };

    if let Some(old_path) = existing.file_path.filter(|old| *old != key) {
        delete_blob_best_effort(blobs, bucket, &old_path).await;
    }
    info!(%id, path = %key, "Replaced resume file");
    Ok(updated)
}
