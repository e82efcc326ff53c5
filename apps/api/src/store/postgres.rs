//! PostgreSQL backend: one `(id UUID, data JSONB)` table per collection.
//!
//! Filters become JSONB containment (`data @> $1`) and updates JSONB
//! concatenation (`data || $2`), so a filtered update is a single
//! compare-and-set statement.

use async_trait::async_trait;
use serde_json::{Map, Value};
use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::AppError;
use crate::store::{Collection, DocumentStore, Filter, Query, SortKey};

#[derive(Clone)]
pub struct PgDocumentStore {
    pool: PgPool,
}

impl PgDocumentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn record_id(record: &Value) -> Result<Uuid, AppError> {
    record
        .get("id")
        .and_then(Value::as_str)
        .and_then(|s| Uuid::parse_str(s).ok())
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("record is missing a UUID id")))
}

fn select_sql(collection: Collection, query: &Query) -> String {
    let mut sql = format!("SELECT data FROM {} WHERE data @> $1", collection.table());
    if let Some(order) = &query.order_by {
        let direction = if order.descending { "DESC" } else { "ASC" };
        let key = match order.key {
            SortKey::Value => "data -> $2",
            SortKey::Timestamp => "(data ->> $2)::timestamptz",
        };
        sql.push_str(&format!(" ORDER BY {key} {direction} NULLS LAST"));
    }
    sql
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    async fn insert(&self, collection: Collection, record: Value) -> Result<Value, AppError> {
        let id = record_id(&record)?;
        let stored = sqlx::query_scalar::<_, Value>(&format!(
            "INSERT INTO {} (id, data) VALUES ($1, $2) RETURNING data",
            collection.table()
        ))
        .bind(id)
        .bind(&record)
        .fetch_one(&self.pool)
        .await?;
        Ok(stored)
    }

    async fn select(&self, collection: Collection, query: &Query) -> Result<Vec<Value>, AppError> {
        let sql = select_sql(collection, query);
        let mut statement = sqlx::query_scalar::<_, Value>(&sql).bind(query.filter.to_json());
        if let Some(order) = &query.order_by {
            statement = statement.bind(order.field);
        }
        Ok(statement.fetch_all(&self.pool).await?)
    }

    async fn update(
        &self,
        collection: Collection,
        filter: &Filter,
        fields: Map<String, Value>,
    ) -> Result<Vec<Value>, AppError> {
        Ok(sqlx::query_scalar::<_, Value>(&format!(
            "UPDATE {} SET data = data || $2 WHERE data @> $1 RETURNING data",
            collection.table()
        ))
        .bind(filter.to_json())
        .bind(Value::Object(fields))
        .fetch_all(&self.pool)
        .await?)
    }

    async fn delete(&self, collection: Collection, filter: &Filter) -> Result<Vec<Value>, AppError> {
        Ok(sqlx::query_scalar::<_, Value>(&format!(
            "DELETE FROM {} WHERE data @> $1 RETURNING data",
            collection.table()
        ))
        .bind(filter.to_json())
        .fetch_all(&self.pool)
        .await?)
    }
}
