use chrono::Utc;
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::company::{
    TargetCompany, TargetCompanyCreate, TargetCompanyUpdate, DEFAULT_COMPANY_STATUS,
    DEFAULT_PRIORITY,
};
use crate::store::{
    find_all, find_by_id, insert_record, patch_fields, update_one, Collection, DocumentStore,
    Filter, Query,
};

/// Highest priority first.
pub async fn list_companies(docs: &dyn DocumentStore) -> Result<Vec<TargetCompany>, AppError> {
    find_all(
        docs,
        Collection::TargetCompanies,
        &Query::all().highest_first("priority"),
    )
    .await
}

pub async fn get_company(docs: &dyn DocumentStore, id: Uuid) -> Result<TargetCompany, AppError> {
    find_by_id(docs, Collection::TargetCompanies, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Company {id} not found")))
}

pub async fn create_company(
    docs: &dyn DocumentStore,
    input: TargetCompanyCreate,
) -> Result<TargetCompany, AppError> {
    if input.name.trim().is_empty() {
        return Err(AppError::Validation("name cannot be empty".to_string()));
    }

    let now = Utc::now();
    let company = TargetCompany {
        id: Uuid::new_v4(),
        name: input.name,
        category: input.category,
        priority: Some(input.priority.unwrap_or(DEFAULT_PRIORITY)),
        status: Some(
            input
                .status
                .unwrap_or_else(|| DEFAULT_COMPANY_STATUS.to_string()),
        ),
        careers_url: input.careers_url,
        notes: input.notes,
        research: Some(json!({})),
        connections: Vec::new(),
        created_at: now,
        updated_at: now,
    };

    let stored = insert_record(docs, Collection::TargetCompanies, &company).await?;
    info!(id = %stored.id, name = %stored.name, "Created target company");
    Ok(stored)
}

pub async fn update_company(
    docs: &dyn DocumentStore,
    id: Uuid,
    patch: TargetCompanyUpdate,
) -> Result<TargetCompany, AppError> {
    if patch.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
        return Err(AppError::Validation("name cannot be empty".to_string()));
    }

    let mut fields = patch_fields(&patch)?;
    fields.insert("updated_at".to_string(), json!(Utc::now()));

    update_one(docs, Collection::TargetCompanies, &Filter::by_id(id), fields)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Company {id} not found")))
}

pub async fn delete_company(docs: &dyn DocumentStore, id: Uuid) -> Result<(), AppError> {
    let removed = docs
        .delete(Collection::TargetCompanies, &Filter::by_id(id))
        .await?;
    if removed.is_empty() {
        return Err(AppError::NotFound(format!("Company {id} not found")));
    }
    info!(%id, "Deleted target company");
    Ok(())
}
