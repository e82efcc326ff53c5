use anyhow::{bail, Context, Result};

use crate::report::StatusVocabulary;

/// Which pair of store implementations backs the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    /// PostgreSQL JSONB collections plus an S3-compatible bucket service.
    Postgres,
    /// Process-local maps. Data is lost on restart.
    Memory,
}

impl StoreBackend {
    fn parse(raw: &str) -> Result<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "postgres" => Ok(StoreBackend::Postgres),
            "memory" => Ok(StoreBackend::Memory),
            other => bail!("STORE_BACKEND must be 'postgres' or 'memory', got '{other}'"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct S3Settings {
    pub endpoint: String,
    pub region: String,
    pub access_key_id: String,
    pub secret_access_key: String,
}

/// Application configuration loaded from environment variables.
/// Fails at startup if variables required by the chosen backend are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub store_backend: StoreBackend,
    pub database_url: Option<String>,
    pub s3: Option<S3Settings>,
    pub application_files_bucket: String,
    pub resumes_bucket: String,
    pub port: u16,
    pub rust_log: String,
    pub cors_origins: Vec<String>,
    pub max_upload_bytes: usize,
    pub statuses: StatusVocabulary,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let store_backend = StoreBackend::parse(&env_or("STORE_BACKEND", "postgres"))?;

        let (database_url, s3) = match store_backend {
            StoreBackend::Postgres => (
                Some(require_env("DATABASE_URL")?),
                Some(S3Settings {
                    endpoint: require_env("S3_ENDPOINT")?,
                    region: env_or("S3_REGION", "us-east-1"),
                    access_key_id: require_env("AWS_ACCESS_KEY_ID")?,
                    secret_access_key: require_env("AWS_SECRET_ACCESS_KEY")?,
                }),
            ),
            StoreBackend::Memory => (None, None),
        };

        let mut statuses = StatusVocabulary::default();
        if let Ok(raw) = std::env::var("REPORT_ACTIVE_STATUSES") {
            statuses.active = split_list(&raw);
        }
        if let Ok(raw) = std::env::var("REPORT_INTERVIEW_STATUSES") {
            statuses.interview = split_list(&raw);
        }

        Ok(Config {
            store_backend,
            database_url,
            s3,
            application_files_bucket: env_or("APPLICATION_FILES_BUCKET", "application-files"),
            resumes_bucket: env_or("RESUMES_BUCKET", "resumes"),
            port: env_or("PORT", "8000")
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: env_or("RUST_LOG", "info"),
            cors_origins: split_list(&env_or(
                "CORS_ORIGINS",
                "http://localhost:5173,http://localhost:3000",
            )),
            max_upload_bytes: env_or("MAX_UPLOAD_BYTES", "10485760")
                .parse::<usize>()
                .context("MAX_UPLOAD_BYTES must be a byte count")?,
            statuses,
        })
    }
}

#[cfg(test)]
impl Config {
    pub fn in_memory() -> Self {
        Config {
            store_backend: StoreBackend::Memory,
            database_url: None,
            s3: None,
            application_files_bucket: "application-files".to_string(),
            resumes_bucket: "resumes".to_string(),
            port: 0,
            rust_log: "debug".to_string(),
            cors_origins: vec!["http://localhost:5173".to_string()],
            max_upload_bytes: 1024 * 1024,
            statuses: StatusVocabulary::default(),
        }
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
