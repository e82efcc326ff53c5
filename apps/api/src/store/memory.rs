//! Process-local backends. Used with `STORE_BACKEND=memory` for local
//! development and by the test suite.

use std::cmp::Ordering;
use std::collections::HashMap;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use tokio::sync::RwLock;

use crate::errors::AppError;
use crate::store::{BlobStore, Collection, DocumentStore, Filter, Query, SortKey};

/// Records are kept in insertion order, which is the order `select`
/// returns when the query has no ordering key.
#[derive(Default)]
pub struct MemoryDocumentStore {
    collections: RwLock<HashMap<Collection, Vec<Value>>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Orders JSON scalars the way the Postgres backend does for the keys we sort
/// on: numbers numerically, strings lexically, missing/null values last.
fn compare_json(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    let a = a.filter(|v| !v.is_null());
    let b = b.filter(|v| !v.is_null());
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(x), Some(y)) => x.to_string().cmp(&y.to_string()),
    }
}

fn as_instant(value: Option<&Value>) -> Option<DateTime<Utc>> {
    value
        .and_then(Value::as_str)
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|t| t.with_timezone(&Utc))
}

/// Same as [`compare_json`] but for RFC 3339 strings, compared as instants.
/// Unparseable values sort with the missing ones.
fn compare_instants(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (as_instant(a), as_instant(b)) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(x), Some(y)) => x.cmp(&y),
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn insert(&self, collection: Collection, record: Value) -> Result<Value, AppError> {
        let mut collections = self.collections.write().await;
        collections
            .entry(collection)
            .or_default()
            .push(record.clone());
        Ok(record)
    }

    async fn select(&self, collection: Collection, query: &Query) -> Result<Vec<Value>, AppError> {
        let collections = self.collections.read().await;
        let mut rows: Vec<Value> = collections
            .get(&collection)
            .map(|rows| {
                rows.iter()
                    .filter(|row| query.filter.matches(row))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        if let Some(order) = &query.order_by {
            rows.sort_by(|a, b| {
                let (x, y) = (a.get(order.field), b.get(order.field));
                let (ordering, nulls) = match order.key {
                    SortKey::Value => (
                        compare_json(x, y),
                        x.map_or(true, Value::is_null) || y.map_or(true, Value::is_null),
                    ),
                    SortKey::Timestamp => (
                        compare_instants(x, y),
                        as_instant(x).is_none() || as_instant(y).is_none(),
                    ),
                };
                if order.descending && !nulls {
                    ordering.reverse()
                } else {
                    ordering
                }
            });
        }
        Ok(rows)
    }

    async fn update(
        &self,
        collection: Collection,
        filter: &Filter,
        fields: Map<String, Value>,
    ) -> Result<Vec<Value>, AppError> {
        let mut collections = self.collections.write().await;
        let mut updated = Vec::new();
        for row in collections.entry(collection).or_default().iter_mut() {
            if !filter.matches(row) {
                continue;
            }
            if let Value::Object(existing) = row {
                for (key, value) in &fields {
                    existing.insert(key.clone(), value.clone());
                }
            }
            updated.push(row.clone());
        }
        Ok(updated)
    }

    async fn delete(&self, collection: Collection, filter: &Filter) -> Result<Vec<Value>, AppError> {
        let mut collections = self.collections.write().await;
        let rows = collections.entry(collection).or_default();
        let (removed, kept): (Vec<Value>, Vec<Value>) =
            rows.drain(..).partition(|row| filter.matches(row));
        *rows = kept;
        Ok(removed)
    }
}

#[derive(Default)]
pub struct MemoryBlobStore {
    objects: RwLock<HashMap<(String, String), Bytes>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn put(
        &self,
        bucket: &str,
        key: &str,
        body: Bytes,
        _content_type: &str,
    ) -> Result<(), AppError> {
        self.objects
            .write()
            .await
            .insert((bucket.to_string(), key.to_string()), body);
        Ok(())
    }

    async fn get(&self, bucket: &str, key: &str) -> Result<Bytes, AppError> {
        self.objects
            .read()
            .await
            .get(&(bucket.to_string(), key.to_string()))
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Object {key} not found")))
    }

    async fn delete(&self, bucket: &str, key: &str) -> Result<(), AppError> {
        self.objects
            .write()
            .await
            .remove(&(bucket.to_string(), key.to_string()))
            .map(|_| ())
            .ok_or_else(|| AppError::NotFound(format!("Object {key} not found")))
    }
}
