use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A named resume variant, optionally backed by a file in the resumes bucket.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResumeVersion {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub target_roles: Option<String>,
    pub content: Option<String>,
    pub file_path: Option<String>,
    pub file_name: Option<String>,
    #[serde(default)]
    pub content_type: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Text fields of a resume creation form.
#[derive(Debug, Clone, Default)]
pub struct ResumeVersionCreate {
    pub name: String,
    pub description: Option<String>,
    pub target_roles: Option<String>,
    pub content: Option<String>,
}

/// Text-field update. The stored file is only changed through a file upload,
/// so `file_path`/`file_name` keys in the payload are dropped during decoding.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResumeVersionUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_roles: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}
