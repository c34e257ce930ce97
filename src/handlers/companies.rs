use std::collections::HashMap;

use axum::extract::{rejection::JsonRejection, Path, Query, State};
use axum::Json;
use serde_json::Value;

use super::{query_params, validated};
use crate::database::models::{Company, CompanyCreate, CompanyDetail, CompanyFilters, CompanySummary, CompanyUpdate};
use crate::middleware::{ApiResponse, ApiResult, RequireAdmin, RequireIdentity};
use crate::services::CompanyService;
use crate::state::AppState;

/// GET /companies - `{ companies: [{ handle, name }, ...] }`
///
/// Optional query filters: `search` (name substring, case-insensitive),
/// `min_employees`, `max_employees`.
pub async fn list(
    State(state): State<AppState>,
    RequireIdentity(_): RequireIdentity,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult<Vec<CompanySummary>> {
    let params = query_params(params, CompanyFilters::KEYS);
    let filters = CompanyFilters::from_query(&params)?;
    let companies = CompanyService::all(state.db(), &filters).await?;
    Ok(ApiResponse::new("companies", companies))
}

/// GET /companies/:handle - `{ company: { ..., jobs: [{ id, title, date_posted }] } }`
pub async fn get(
    State(state): State<AppState>,
    RequireIdentity(_): RequireIdentity,
    Path(handle): Path<String>,
) -> ApiResult<CompanyDetail> {
    let company = CompanyService::get(state.db(), &handle).await?;
    Ok(ApiResponse::new("company", company))
}

/// POST /companies - admin only
pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Company> {
    let values = validated::<CompanyCreate>(body)?;
    let company = CompanyService::create(state.db(), values).await?;
    Ok(ApiResponse::created("company", company))
}

/// PATCH /companies/:handle - admin only
pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    Path(handle): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Company> {
    let values = validated::<CompanyUpdate>(body)?;
    let company = CompanyService::update(state.db(), &handle, &values).await?;
    Ok(ApiResponse::new("company", company))
}

/// DELETE /companies/:handle - admin only
pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    Path(handle): Path<String>,
) -> ApiResult<&'static str> {
    let message = CompanyService::delete(state.db(), &handle).await?;
    Ok(ApiResponse::new("message", message))
}
