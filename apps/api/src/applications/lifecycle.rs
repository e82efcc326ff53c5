//! Application lifecycle: creation, partial updates with status history, and
//! cascading deletes.
//!
//! Status history is append-only and owned by the server. An entry is added
//! exactly when an update moves `status` to a value different from the stored
//! one, so the last entry always mirrors the current status.
//!
//! Updates are a read-modify-write guarded by the record's `revision`: the
//! write only lands if the revision is still the one that was read. A lost
//! race re-reads and recomputes the history against the fresh record.

use chrono::{DateTime, Utc};
use serde_json::{json, Map, Value};
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::files::service::delete_files_for_application;
use crate::models::application::{
    Application, ApplicationCreate, ApplicationUpdate, StatusHistoryEntry, DEFAULT_STATUS,
};
use crate::store::{
    find_all, find_by_id, insert_record, patch_fields, update_one, BlobStore, Collection,
    DocumentStore, Filter, Query,
};

/// Attempts before a contended update gives up with `Conflict`.
pub const MAX_UPDATE_ATTEMPTS: usize = 3;

fn require_non_blank(field: &str, value: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

/// Builds the record for a new application. Blank or missing status falls back to "Applied".
pub fn new_application(input: ApplicationCreate, now: DateTime<Utc>) -> Result<Application, AppError> {
    require_non_blank("company", &input.company)?;
    require_non_blank("title", &input.title)?;

    let status = input
        .status
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_STATUS.to_string());

    Ok(Application {
        id: Uuid::new_v4(),
        company: input.company,
        title: input.title,
        location: input.location,
        region: input.region,
        job_url: input.job_url,
        salary: input.salary,
        company_type: input.company_type,
        modality: input.modality,
        date_applied: input.date_applied,
        status_history: vec![StatusHistoryEntry {
            status: status.clone(),
            date: now,
            notes: None,
        }],
        status,
        job_description: input.job_description,
        ai_analysis: None,
        interview_prep: None,
        quality: None,
        tags: input.tags,
        notes: input.notes,
        referral: input.referral,
        application_source: input.application_source,
        resume_version: input.resume_version,
        created_at: now,
        updated_at: now,
        revision: 0,
    })
}

/// Rejects supplied fields that may not be blank. Needs no stored record.
pub fn validate_update(patch: &ApplicationUpdate) -> Result<(), AppError> {
    for (field, value) in [
        ("company", &patch.company),
        ("title", &patch.title),
        ("status", &patch.status),
    ] {
        if let Some(value) = value {
            require_non_blank(field, value)?;
        }
    }
    Ok(())
}

/// Computes the field set an update writes on top of `existing`.
///
/// Contains only the supplied keys, plus `updated_at`, the next `revision`,
/// and `status_history` when the status actually changes.
pub fn plan_update(
    existing: &Application,
    patch: &ApplicationUpdate,
    now: DateTime<Utc>,
) -> Result<Map<String, Value>, AppError> {
    validate_update(patch)?;

    let mut fields = patch_fields(patch)?;
    // Never move backwards, even if the clock does.
    let updated_at = now.max(existing.updated_at);
    fields.insert("updated_at".to_string(), json!(updated_at));
    fields.insert("revision".to_string(), json!(existing.revision + 1));

    if let Some(status) = patch.status.as_deref() {
        if status != existing.status {
            let mut history = existing.status_history.clone();
            history.push(StatusHistoryEntry {
                status: status.to_string(),
                date: updated_at,
                notes: patch.status_note.clone(),
            });
            fields.insert("status_history".to_string(), serde_json::to_value(history)?);
        }
    }

    Ok(fields)
}

pub async fn create_application(
    docs: &dyn DocumentStore,
    input: ApplicationCreate,
) -> Result<Application, AppError> {
    let application = new_application(input, Utc::now())?;
    let stored = insert_record(docs, Collection::Applications, &application).await?;
    info!(id = %stored.id, status = %stored.status, "Created application");
    Ok(stored)
}

pub async fn get_application(docs: &dyn DocumentStore, id: Uuid) -> Result<Application, AppError> {
    find_by_id(docs, Collection::Applications, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Application {id} not found")))
}

/// All applications, newest first.
pub async fn list_applications(docs: &dyn DocumentStore) -> Result<Vec<Application>, AppError> {
    find_all(
        docs,
        Collection::Applications,
        &Query::all().newest_first("created_at"),
    )
    .await
}

pub async fn update_application(
    docs: &dyn DocumentStore,
    id: Uuid,
    patch: ApplicationUpdate,
) -> Result<Application, AppError> {
    validate_update(&patch)?;

    for attempt in 1..=MAX_UPDATE_ATTEMPTS {
        let existing = get_application(docs, id).await?;
        let fields = plan_update(&existing, &patch, Utc::now())?;
        let guard = Filter::by_id(id).and("revision", existing.revision);

        if let Some(updated) =
            update_one::<Application>(docs, Collection::Applications, &guard, fields).await?
        {
            if updated.status != existing.status {
                info!(%id, from = %existing.status, to = %updated.status, "Application status changed");
            }
            return Ok(updated);
        }
        warn!(%id, attempt, "Application changed during update, retrying");
    }

    Err(AppError::Conflict(format!(
        "Application {id} is being modified concurrently, try again"
    )))
}

/// Deletes an application together with its file rows and their blobs.
/// Blob removal is best-effort; metadata rows are always removed.
pub async fn delete_application(
    docs: &dyn DocumentStore,
    blobs: &dyn BlobStore,
    files_bucket: &str,
    id: Uuid,
) -> Result<(), AppError> {
    get_application(docs, id).await?;

    let removed_files = delete_files_for_application(docs, blobs, files_bucket, id).await?;
    docs.delete(Collection::Applications, &Filter::by_id(id))
        .await?;

    info!(%id, removed_files, "Deleted application");
    Ok(())
}
