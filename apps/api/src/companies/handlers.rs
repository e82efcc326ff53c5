//! Axum route handlers for the Target Companies API.

use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::companies::service::{
    create_company, delete_company, get_company, list_companies, update_company,
};
use crate::errors::AppError;
use crate::models::company::{TargetCompany, TargetCompanyCreate, TargetCompanyUpdate};
use crate::state::AppState;

/// GET /api/companies
pub async fn handle_list_companies(
    State(state): State<AppState>,
) -> Result<Json<Vec<TargetCompany>>, AppError> {
    Ok(Json(list_companies(state.docs.as_ref()).await?))
}

/// POST /api/companies
pub async fn handle_create_company(
    State(state): State<AppState>,
    Json(request): Json<TargetCompanyCreate>,
) -> Result<Json<TargetCompany>, AppError> {
    Ok(Json(create_company(state.docs.as_ref(), request).await?))
}

/// GET /api/companies/:id
pub async fn handle_get_company(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<TargetCompany>, AppError> {
    Ok(Json(get_company(state.docs.as_ref(), id).await?))
}

/// PUT /api/companies/:id
pub async fn handle_update_company(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<TargetCompanyUpdate>,
) -> Result<Json<TargetCompany>, AppError> {
    Ok(Json(update_company(state.docs.as_ref(), id, request).await?))
}

/// DELETE /api/companies/:id
pub async fn handle_delete_company(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    delete_company(state.docs.as_ref(), id).await?;
    Ok(Json(json!({ "message": "Company deleted" })))
}
