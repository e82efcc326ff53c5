use bytes::Bytes;
use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use crate::applications::lifecycle::get_application;
use crate::errors::AppError;
use crate::files::transfer::UploadedFile;
use crate::models::file::{ApplicationFile, FileType};
use crate::store::{
    blob_key, delete_blob_best_effort, find_all, find_by_id, insert_record, BlobStore, Collection,
    DocumentStore, Filter, Query,
};

/// Uploads `file` for an application and records its metadata row.
/// The blob is written first so a stored row always points at an uploaded object.
pub async fn attach_file(
    docs: &dyn DocumentStore,
    blobs: &dyn BlobStore,
    bucket: &str,
    application_id: Uuid,
    file_type: FileType,
    file: UploadedFile,
) -> Result<ApplicationFile, AppError> {
    get_application(docs, application_id).await?;

    let file_path = blob_key(
        "applications",
        application_id,
        Some(file_type.as_str()),
        &file.file_name,
    )?;
    blobs
        .put(bucket, &file_path, file.bytes, &file.content_type)
        .await?;

    let record = ApplicationFile {
        id: Uuid::new_v4(),
        application_id,
        file_type,
        file_name: file.file_name,
        file_path,
        content_type: Some(file.content_type),
        created_at: Utc::now(),
    };
    let stored = insert_record(docs, Collection::ApplicationFiles, &record).await?;
    info!(%application_id, file_id = %stored.id, path = %stored.file_path, "Attached file");
    Ok(stored)
}

pub async fn list_files_for_application(
    docs: &dyn DocumentStore,
    application_id: Uuid,
) -> Result<Vec<ApplicationFile>, AppError> {
    find_all(
        docs,
        Collection::ApplicationFiles,
        &Query::filtered(Filter::eq("application_id", application_id)),
    )
    .await
}

pub async fn get_file(docs: &dyn DocumentStore, id: Uuid) -> Result<ApplicationFile, AppError> {
    find_by_id(docs, Collection::ApplicationFiles, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("File {id} not found")))
}

pub async fn download_file(
    docs: &dyn DocumentStore,
    blobs: &dyn BlobStore,
    bucket: &str,
    id: Uuid,
) -> Result<(ApplicationFile, Bytes), AppError> {
    let file = get_file(docs, id).await?;
    let bytes = blobs.get(bucket, &file.file_path).await?;
    Ok((file, bytes))
}

pub async fn delete_file(
    docs: &dyn DocumentStore,
    blobs: &dyn BlobStore,
    bucket: &str,
    id: Uuid,
) -> Result<(), AppError> {
    let file = get_file(docs, id).await?;
    delete_blob_best_effort(blobs, bucket, &file.file_path).await;
    docs.delete(Collection::ApplicationFiles, &Filter::by_id(id))
        .await?;
    info!(file_id = %id, "Deleted file");
    Ok(())
}

/// Removes every file row of an application, deleting each blob first on a
/// best-effort basis. Returns how many rows were removed.
pub async fn delete_files_for_application(
    docs: &dyn DocumentStore,
    blobs: &dyn BlobStore,
    bucket: &str,
    application_id: Uuid,
) -> Result<usize, AppError> {
    for file in list_files_for_application(docs, application_id).await? {
        delete_blob_best_effort(blobs, bucket, &file.file_path).await;
    }
    let removed = docs
        .delete(
            Collection::ApplicationFiles,
            &Filter::eq("application_id", application_id),
        )
        .await?;
    Ok(removed.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::applications::lifecycle::{create_application, delete_application};
    use crate::store::memory::{MemoryBlobStore, MemoryDocumentStore};

    const BUCKET: &str = "application-files";

    fn upload(name: &str) -> UploadedFile {
        UploadedFile {
            file_name: name.to_string(),
            content_type: "application/pdf".to_string(),
            bytes: Bytes::from(format!("contents of {name}")),
        }
    }

    async fn seeded() -> (MemoryDocumentStore, MemoryBlobStore, Uuid) {
        let docs = MemoryDocumentStore::new();
        let blobs = MemoryBlobStore::new();
        let input = serde_json::from_value(serde_json::json!({
            "company": "Globex",
            "title": "Platform Engineer"
        }))
        .unwrap();
        let app = create_application(&docs, input).await.unwrap();
        (docs, blobs, app.id)
    }

    #[tokio::test]
    async fn test_attach_file_uses_application_key_layout() {
        let (docs, blobs, app_id) = seeded().await;
        let file = attach_file(&docs, &blobs, BUCKET, app_id, FileType::CoverLetter, upload("letter.pdf"))
            .await
            .unwrap();
        assert_eq!(
            file.file_path,
            format!("applications/{app_id}/cover_letter/letter.pdf")
        );
        let (_, bytes) = download_file(&docs, &blobs, BUCKET, file.id).await.unwrap();
        assert_eq!(bytes, Bytes::from("contents of letter.pdf"));
    }

    #[tokio::test]
    async fn test_attach_file_requires_application() {
        let (docs, blobs, _) = seeded().await;
        let result = attach_file(&docs, &blobs, BUCKET, Uuid::new_v4(), FileType::Resume, upload("cv.pdf")).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_attach_file_rejects_name_without_base() {
        let (docs, blobs, app_id) = seeded().await;
        let result = attach_file(&docs, &blobs, BUCKET, app_id, FileType::Resume, upload("drafts/")).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
        assert!(list_files_for_application(&docs, app_id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_file_tolerates_missing_blob() {
        let (docs, blobs, app_id) = seeded().await;
        let file = attach_file(&docs, &blobs, BUCKET, app_id, FileType::Resume, upload("cv.pdf"))
            .await
            .unwrap();
        blobs.delete(BUCKET, &file.file_path).await.unwrap();

        delete_file(&docs, &blobs, BUCKET, file.id).await.unwrap();
        assert!(matches!(
            get_file(&docs, file.id).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_application_delete_cascades_to_files() {
        let (docs, blobs, app_id) = seeded().await;
        let input = serde_json::from_value(serde_json::json!({
            "company": "Initech",
            "title": "SRE"
        }))
        .unwrap();
        let other_app = create_application(&docs, input).await.unwrap().id;

        let mut paths = Vec::new();
        for name in ["a.pdf", "b.pdf", "c.pdf"] {
            let file = attach_file(&docs, &blobs, BUCKET, app_id, FileType::Resume, upload(name))
                .await
                .unwrap();
            paths.push(file.file_path);
        }
        attach_file(&docs, &blobs, BUCKET, other_app, FileType::Resume, upload("keep.pdf"))
            .await
            .unwrap();
        // One blob already gone: the cascade must still finish.
        blobs.delete(BUCKET, &paths[0]).await.unwrap();

        delete_application(&docs, &blobs, BUCKET, app_id).await.unwrap();

        assert!(list_files_for_application(&docs, app_id).await.unwrap().is_empty());
        for path in &paths {
            assert!(matches!(
                blobs.get(BUCKET, path).await,
                Err(AppError::NotFound(_))
            ));
        }
        assert_eq!(
            list_files_for_application(&docs, other_app).await.unwrap().len(),
            1
        );
        assert!(matches!(
            get_application(&docs, app_id).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_missing_application_is_not_found() {
        let (docs, blobs, _) = seeded().await;
        let result = delete_application(&docs, &blobs, BUCKET, Uuid::new_v4()).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
