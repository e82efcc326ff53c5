use std::sync::Arc;

use crate::config::Config;
use crate::store::{BlobStore, DocumentStore};

/// Shared application state injected into all route handlers via Axum extractors.
/// The stores are built once in `main` and handed to every request.
#[derive(Clone)]
pub struct AppState {
    pub docs: Arc<dyn DocumentStore>,
    pub blobs: Arc<dyn BlobStore>,
    pub config: Config,
}

#[cfg(test)]
impl AppState {
    /// State over fresh in-memory stores.
    pub fn in_memory() -> Self {
        use crate::store::memory::{MemoryBlobStore, MemoryDocumentStore};

        Self {
            docs: Arc::new(MemoryDocumentStore::new()),
            blobs: Arc::new(MemoryBlobStore::new()),
            config: Config::in_memory(),
        }
    }
}
