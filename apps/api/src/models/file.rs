use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FileType {
    Resume,
    CoverLetter,
}

impl FileType {
    pub fn as_str(self) -> &'static str {
        match self {
            FileType::Resume => "resume",
            FileType::CoverLetter => "cover_letter",
        }
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FileType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "resume" => Ok(FileType::Resume),
            "cover_letter" => Ok(FileType::CoverLetter),
            other => Err(AppError::Validation(format!(
                "file_type must be 'resume' or 'cover_letter', got '{other}'"
            ))),
        }
    }
}

/// Metadata row for a blob attached to an application.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationFile {
    pub id: Uuid,
    pub application_id: Uuid,
    pub file_type: FileType,
    pub file_name: String,
    pub file_path: String,
    pub content_type: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_type_parse() {
        assert_eq!("resume".parse::<FileType>().unwrap(), FileType::Resume);
        assert_eq!(
            " cover_letter ".parse::<FileType>().unwrap(),
            FileType::CoverLetter
        );
        assert!(matches!(
            "portfolio".parse::<FileType>(),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_file_type_wire_format() {
        assert_eq!(
            serde_json::to_value(FileType::CoverLetter).unwrap(),
            serde_json::json!("cover_letter")
        );
    }
}
