//! Storage seams. Every record lives in a [`DocumentStore`] collection and every
//! uploaded file in a [`BlobStore`] bucket.
//!
//! Both are carried in `AppState` as trait objects, so handlers and the
//! lifecycle code never know whether they talk to Postgres/S3 or to the
//! in-memory backends.

pub mod memory;
pub mod postgres;
pub mod s3;

use async_trait::async_trait;
use bytes::Bytes;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};
use tracing::warn;
use uuid::Uuid;

use crate::errors::AppError;

/// The four logical collections of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Applications,
    ResumeVersions,
    TargetCompanies,
    ApplicationFiles,
}

impl Collection {
    pub const ALL: [Collection; 4] = [
        Collection::Applications,
        Collection::ResumeVersions,
        Collection::TargetCompanies,
        Collection::ApplicationFiles,
    ];

    /// Table name. Static, so it is safe to splice into SQL.
    pub fn table(self) -> &'static str {
        match self {
            Collection::Applications => "applications",
            Collection::ResumeVersions => "resume_versions",
            Collection::TargetCompanies => "target_companies",
            Collection::ApplicationFiles => "application_files",
        }
    }
}

/// Conjunction of top-level field equalities. The empty filter matches everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter(Map<String, Value>);

impl Filter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn by_id(id: Uuid) -> Self {
        Self::eq("id", id)
    }

    pub fn eq(field: &str, value: impl Serialize) -> Self {
        Self::all().and(field, value)
    }

    pub fn and(mut self, field: &str, value: impl Serialize) -> Self {
        // Uuid, strings and integers always serialize.
        let value = serde_json::to_value(value).unwrap_or(Value::Null);
        self.0.insert(field.to_string(), value);
        self
    }

    pub fn matches(&self, record: &Value) -> bool {
        self.0
            .iter()
            .all(|(field, expected)| record.get(field) == Some(expected))
    }

    pub fn to_json(&self) -> Value {
        Value::Object(self.0.clone())
    }
}

/// How an ordering key is compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    /// Plain JSON value: numbers numerically, strings lexically.
    Value,
    /// RFC 3339 timestamp string, compared as an instant.
    Timestamp,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    pub field: &'static str,
    pub descending: bool,
    pub key: SortKey,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    pub filter: Filter,
    pub order_by: Option<OrderBy>,
}

impl Query {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn filtered(filter: Filter) -> Self {
        Self {
            filter,
            order_by: None,
        }
    }

    /// Latest first by a timestamp field.
    pub fn newest_first(mut self, field: &'static str) -> Self {
        self.order_by = Some(OrderBy {
            field,
            descending: true,
            key: SortKey::Timestamp,
        });
        self
    }

    /// Highest first by a plain value field.
    pub fn highest_first(mut self, field: &'static str) -> Self {
        self.order_by = Some(OrderBy {
            field,
            descending: true,
            key: SortKey::Value,
        });
        self
    }
}

/// Schemaless record storage addressed by collection and filter.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Stores `record` (a JSON object carrying an `id`) and returns it as stored.
    async fn insert(&self, collection: Collection, record: Value) -> Result<Value, AppError>;

    async fn select(&self, collection: Collection, query: &Query) -> Result<Vec<Value>, AppError>;

    /// Shallow-merges `fields` into every matching record and returns the merged records.
    async fn update(
        &self,
        collection: Collection,
        filter: &Filter,
        fields: Map<String, Value>,
    ) -> Result<Vec<Value>, AppError>;

    /// Removes every matching record and returns what was removed.
    async fn delete(&self, collection: Collection, filter: &Filter) -> Result<Vec<Value>, AppError>;
}

/// Key-addressed binary object storage.
#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn put(
        &self,
        bucket: &str,
        key: &str,
        body: Bytes,
        content_type: &str,
    ) -> Result<(), AppError>;

    /// Fails with `AppError::NotFound` when the key does not exist.
    async fn get(&self, bucket: &str, key: &str) -> Result<Bytes, AppError>;

    async fn delete(&self, bucket: &str, key: &str) -> Result<(), AppError>;
}

// ────────────────────────────────────────────────────────────────────────────
// Typed helpers over the JSON seam
// ────────────────────────────────────────────────────────────────────────────

pub async fn find_by_id<T: DeserializeOwned>(
    docs: &dyn DocumentStore,
    collection: Collection,
    id: Uuid,
) -> Result<Option<T>, AppError> {
    let rows = docs
        .select(collection, &Query::filtered(Filter::by_id(id)))
        .await?;
    Ok(rows
        .into_iter()
        .next()
        .map(serde_json::from_value)
        .transpose()?)
}

pub async fn find_all<T: DeserializeOwned>(
    docs: &dyn DocumentStore,
    collection: Collection,
    query: &Query,
) -> Result<Vec<T>, AppError> {
    docs.select(collection, query)
        .await?
        .into_iter()
        .map(|row| serde_json::from_value(row).map_err(AppError::from))
        .collect()
}

pub async fn insert_record<T: Serialize + DeserializeOwned + Sync>(
    docs: &dyn DocumentStore,
    collection: Collection,
    record: &T,
) -> Result<T, AppError> {
    let stored = docs
        .insert(collection, serde_json::to_value(record)?)
        .await?;
    Ok(serde_json::from_value(stored)?)
}

/// Applies `fields` to the first record matching `filter`. `None` when nothing matched.
pub async fn update_one<T: DeserializeOwned>(
    docs: &dyn DocumentStore,
    collection: Collection,
    filter: &Filter,
    fields: Map<String, Value>,
) -> Result<Option<T>, AppError> {
    let rows = docs.update(collection, filter, fields).await?;
    Ok(rows
        .into_iter()
        .next()
        .map(serde_json::from_value)
        .transpose()?)
}

/// Serializes a partial-update payload into the field set to merge.
/// Payload types skip `None` fields, so only supplied keys survive.
pub fn patch_fields<T: Serialize>(patch: &T) -> Result<Map<String, Value>, AppError> {
    match serde_json::to_value(patch)? {
        Value::Object(fields) => Ok(fields),
        _ => Ok(Map::new()),
    }
}

/// Builds `<kind>/<id>/[<subtype>/]<file_name>`, keeping only the last path
/// component of the client-supplied file name. Fails when that component is blank.
pub fn blob_key(
    kind: &str,
    id: Uuid,
    subtype: Option<&str>,
    file_name: &str,
) -> Result<String, AppError> {
    let base = file_name
        .rsplit(|c: char| c == '/' || c == '\\')
        .next()
        .map(str::trim)
        .unwrap_or_default();
    if base.is_empty() {
        return Err(AppError::Validation(format!(
            "file name '{file_name}' has no usable base name"
        )));
    }
    Ok(match subtype {
        Some(subtype) => format!("{kind}/{id}/{subtype}/{base}"),
        None => format!("{kind}/{id}/{base}"),
    })
}

/// Deletes a blob, logging and swallowing any failure (a missing blob included).
pub async fn delete_blob_best_effort(blobs: &dyn BlobStore, bucket: &str, key: &str) {
    if let Err(e) = blobs.delete(bucket, key).await {
        warn!(bucket, key, "Ignoring blob delete failure: {e}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_filter_matches_all_fields() {
        let id = Uuid::new_v4();
        let filter = Filter::by_id(id).and("revision", 2);
        assert!(filter.matches(&json!({"id": id, "revision": 2, "x": 1})));
        assert!(!filter.matches(&json!({"id": id, "revision": 3})));
        assert!(!filter.matches(&json!({"id": id})));
        assert!(Filter::all().matches(&json!({"anything": true})));
    }

    #[test]
    fn test_blob_key_layout() {
        let id = Uuid::nil();
        assert_eq!(
            blob_key("applications", id, Some("resume"), "cv.pdf").unwrap(),
            format!("applications/{id}/resume/cv.pdf")
        );
        assert_eq!(
            blob_key("resumes", id, None, "../../etc/passwd").unwrap(),
            format!("resumes/{id}/passwd")
        );
        assert_eq!(
            blob_key("resumes", id, None, "C:\\Users\\me\\cv.docx").unwrap(),
            format!("resumes/{id}/cv.docx")
        );
    }

    #[test]
    fn test_blob_key_rejects_empty_base_name() {
        let id = Uuid::nil();
        for name in ["dir/", "a\\", "/", "nested/ "] {
            assert!(
                matches!(
                    blob_key("applications", id, Some("resume"), name),
                    Err(AppError::Validation(_))
                ),
                "{name:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_patch_fields_keeps_only_present_keys() {
        #[derive(Serialize)]
        struct Patch {
            #[serde(skip_serializing_if = "Option::is_none")]
            a: Option<i32>,
            #[serde(skip_serializing_if = "Option::is_none")]
            b: Option<String>,
        }
        let fields = patch_fields(&Patch {
            a: Some(1),
            b: None,
        })
        .unwrap();
        assert_eq!(fields.len(), 1);
        assert_eq!(fields["a"], json!(1));
    }
}
