mod applications;
mod companies;
mod config;
mod db;
mod errors;
mod files;
mod models;
mod report;
mod resumes;
mod routes;
mod state;
mod store;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::http::{HeaderValue, Method};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{Config, StoreBackend};
use crate::db::{create_pool, ensure_collections};
use crate::routes::build_router;
use crate::state::AppState;
use crate::store::memory::{MemoryBlobStore, MemoryDocumentStore};
use crate::store::postgres::PgDocumentStore;
use crate::store::s3::S3BlobStore;
use crate::store::{BlobStore, DocumentStore};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Jobdesk API v{}", env!("CARGO_PKG_VERSION"));

    let (docs, blobs) = build_stores(&config).await?;

    let state = AppState {
        docs,
        blobs,
        config: config.clone(),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(build_cors(&config)?);

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Constructs the document and blob stores for the configured backend.
async fn build_stores(
    config: &Config,
) -> Result<(Arc<dyn DocumentStore>, Arc<dyn BlobStore>)> {
    match config.store_backend {
        StoreBackend::Postgres => {
            let database_url = config
                .database_url
                .as_deref()
                .context("DATABASE_URL is required for the postgres backend")?;
            let pool = create_pool(database_url).await?;
            ensure_collections(&pool).await?;

            let s3 = config
                .s3
                .as_ref()
                .context("S3 settings are required for the postgres backend")?;
            let blobs = S3BlobStore::connect(s3).await;
            info!("S3 client initialized (endpoint: {})", s3.endpoint);

            Ok((Arc::new(PgDocumentStore::new(pool)), Arc::new(blobs)))
        }
        StoreBackend::Memory => {
            warn!("Using in-memory stores; data is lost on restart");
            Ok((
                Arc::new(MemoryDocumentStore::new()),
                Arc::new(MemoryBlobStore::new()),
            ))
        }
    }
}

fn build_cors(config: &Config) -> Result<CorsLayer> {
    let origins = config
        .cors_origins
        .iter()
        .map(|origin| {
            origin
                .parse::<HeaderValue>()
                .with_context(|| format!("Invalid CORS origin '{origin}'"))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any))
}
