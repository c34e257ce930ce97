use std::collections::HashMap;

use axum::extract::{rejection::JsonRejection, Path, Query, State};
use axum::Json;
use serde_json::Value;

use super::{query_params, validated};
use crate::database::models::{Job, JobCreate, JobFilters, JobSummary, JobUpdate};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, RequireAdmin, RequireIdentity};
use crate::services::JobService;
use crate::state::AppState;

/// Ids are serial integers; anything else cannot name a job
fn job_id(raw: &str) -> Result<i32, ApiError> {
    raw.parse().map_err(|_| ApiError::not_found("Job not found"))
}

/// GET /jobs - filters: `search` (title), `min_salary`, `min_equity`
pub async fn list(
    State(state): State<AppState>,
    RequireIdentity(_): RequireIdentity,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult<Vec<JobSummary>> {
    let params = query_params(params, JobFilters::KEYS);
    let filters = JobFilters::from_query(&params)?;
    let jobs = JobService::all(state.db(), &filters).await?;
    Ok(ApiResponse::new("jobs", jobs))
}

pub async fn get(
    State(state): State<AppState>,
    RequireIdentity(_): RequireIdentity,
    Path(id): Path<String>,
) -> ApiResult<Job> {
    let job = JobService::get(state.db(), job_id(&id)?).await?;
    Ok(ApiResponse::new("job", job))
}

pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Job> {
    let values = validated::<JobCreate>(body)?;
    let job = JobService::create(state.db(), &values).await?;
    Ok(ApiResponse::created("job", job))
}

pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Job> {
    let id = job_id(&id)?;
    let values = validated::<JobUpdate>(body)?;
    let job = JobService::update(state.db(), id, &values).await?;
    Ok(ApiResponse::new("job", job))
}

pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    Path(id): Path<String>,
) -> ApiResult<&'static str> {
    let message = JobService::delete(state.db(), job_id(&id)?).await?;
    Ok(ApiResponse::new("message", message))
}
