//! Multipart intake and attachment responses shared by the file and resume routes.

use std::collections::HashMap;

use axum::extract::Multipart;
use axum::http::header;
use axum::response::{IntoResponse, Response};
use bytes::Bytes;

use crate::errors::AppError;

pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Bytes,
}

/// A decoded multipart form: text fields by name plus at most one `file` part.
#[derive(Debug, Default)]
pub struct UploadForm {
    fields: HashMap<String, String>,
    pub file: Option<UploadedFile>,
}

impl UploadForm {
    /// Text field value, `None` when absent or blank.
    pub fn text(&self, name: &str) -> Option<String> {
        self.fields
            .get(name)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    }

    pub fn require_text(&self, name: &str) -> Result<String, AppError> {
        self.text(name)
            .ok_or_else(|| AppError::Validation(format!("{name} is required")))
    }

    pub fn require_file(self) -> Result<UploadedFile, AppError> {
        self.file
            .ok_or_else(|| AppError::Validation("file is required".to_string()))
    }
}

fn malformed(e: impl std::fmt::Display) -> AppError {
    AppError::Validation(format!("Malformed multipart body: {e}"))
}

pub async fn read_form(mut multipart: Multipart) -> Result<UploadForm, AppError> {
    let mut form = UploadForm::default();

    while let Some(field) = multipart.next_field().await.map_err(malformed)? {
        let name = field.name().unwrap_or_default().to_string();
        if name == "file" {
            let file_name = field
                .file_name()
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .map(str::to_string)
                .ok_or_else(|| AppError::Validation("file must have a file name".to_string()))?;
            let content_type = field
                .content_type()
                .unwrap_or(DEFAULT_CONTENT_TYPE)
                .to_string();
            let bytes = field.bytes().await.map_err(malformed)?;
            form.file = Some(UploadedFile {
                file_name,
                content_type,
                bytes,
            });
        } else {
            let value = field.text().await.map_err(malformed)?;
            form.fields.insert(name, value);
        }
    }

    Ok(form)
}

/// Download response carrying the file name in `Content-Disposition`.
pub fn attachment(file_name: &str, content_type: Option<&str>, bytes: Bytes) -> Response {
    let disposition = format!(
        "attachment; filename=\"{}\"",
        file_name.replace(['"', '\r', '\n'], "_")
    );
    (
        [
            (
                header::CONTENT_TYPE,
                content_type.unwrap_or(DEFAULT_CONTENT_TYPE).to_string(),
            ),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_form_text_treats_blank_as_absent() {
        let mut form = UploadForm::default();
        form.fields.insert("name".into(), "  Staff SWE v3 ".into());
        form.fields.insert("description".into(), "   ".into());
        assert_eq!(form.text("name").as_deref(), Some("Staff SWE v3"));
        assert!(form.text("description").is_none());
        assert!(matches!(
            form.require_text("description"),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_attachment_headers() {
        let response = attachment("my \"cv\".pdf", Some("application/pdf"), Bytes::from_static(b"x"));
        let headers = response.headers();
        assert_eq!(headers[header::CONTENT_TYPE], "application/pdf");
        assert_eq!(
            headers[header::CONTENT_DISPOSITION],
            "attachment; filename=\"my _cv_.pdf\""
        );
    }
}
