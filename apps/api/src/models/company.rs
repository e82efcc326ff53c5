use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

pub const DEFAULT_PRIORITY: i32 = 3;
pub const DEFAULT_COMPANY_STATUS: &str = "Researching";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetCompany {
    pub id: Uuid,
    pub name: String,
    pub category: Option<String>,
    pub priority: Option<i32>,
    pub status: Option<String>,
    pub careers_url: Option<String>,
    pub notes: Option<String>,
    pub research: Option<Value>,
    #[serde(default)]
    pub connections: Vec<Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TargetCompanyCreate {
    pub name: String,
    pub category: Option<String>,
    pub priority: Option<i32>,
    pub status: Option<String>,
    pub careers_url: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TargetCompanyUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub careers_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub research: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connections: Option<Vec<Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}
