use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Status given to applications created without one.
pub const DEFAULT_STATUS: &str = "Applied";
/// Status reported for stored records that carry none.
pub const UNKNOWN_STATUS: &str = "Unknown";

fn unknown_status() -> String {
    UNKNOWN_STATUS.to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StatusHistoryEntry {
    pub status: String,
    pub date: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// A job application as stored in the `applications` collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Application {
    pub id: Uuid,
    pub company: String,
    pub title: String,
    pub location: Option<String>,
    pub region: Option<String>,
    pub job_url: Option<String>,
    pub salary: Option<String>,
    pub company_type: Option<String>,
    #[serde(default)]
    pub modality: Vec<String>,
    pub date_applied: Option<String>,
    #[serde(default = "unknown_status")]
    pub status: String,
    #[serde(default)]
    pub status_history: Vec<StatusHistoryEntry>,
    pub job_description: Option<String>,
    pub ai_analysis: Option<Value>,
    pub interview_prep: Option<Value>,
    pub quality: Option<Value>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub notes: Option<String>,
    pub referral: Option<String>,
    pub application_source: Option<String>,
    pub resume_version: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Optimistic-concurrency token, bumped by every update.
    #[serde(default)]
    pub revision: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApplicationCreate {
    pub company: String,
    pub title: String,
    pub location: Option<String>,
    pub region: Option<String>,
    pub job_url: Option<String>,
    pub salary: Option<String>,
    pub company_type: Option<String>,
    #[serde(default)]
    pub modality: Vec<String>,
    pub date_applied: Option<String>,
    pub status: Option<String>,
    pub job_description: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub notes: Option<String>,
    pub referral: Option<String>,
    pub application_source: Option<String>,
    pub resume_version: Option<String>,
}

/// Partial update. Absent and `null` keys are both left untouched.
///
/// There is no `status_history` field: history is derived from status
/// changes, so a client-supplied value is dropped during decoding.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApplicationUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub salary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modality: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_applied: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Note attached to the history entry when `status` changes. Not stored on the record.
    #[serde(skip_serializing)]
    pub status_note: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_analysis: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interview_prep: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quality: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub referral: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub application_source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resume_version: Option<String>,
}
