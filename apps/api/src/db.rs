use anyhow::Result;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

use crate::store::Collection;

/// Creates and returns a PostgreSQL connection pool.
pub async fn create_pool(database_url: &str) -> Result<PgPool> {
    info!("Connecting to PostgreSQL...");

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await?;

    info!("PostgreSQL connection pool established");
    Ok(pool)
}

/// Creates the JSONB collection tables if they do not exist yet.
/// Idempotent; there is no migration history.
pub async fn ensure_collections(pool: &PgPool) -> Result<()> {
    for collection in Collection::ALL {
        let table = collection.table();
        sqlx::query(&format!(
            "CREATE TABLE IF NOT EXISTS {table} (id UUID PRIMARY KEY, data JSONB NOT NULL)"
        ))
        .execute(pool)
        .await?;
        sqlx::query(&format!(
            "CREATE INDEX IF NOT EXISTS {table}_data_idx ON {table} USING GIN (data jsonb_path_ops)"
        ))
        .execute(pool)
        .await?;
    }
    info!("Collections ready: {}", Collection::ALL.len());
    Ok(())
}
