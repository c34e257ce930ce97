use serde_json::{json, Map, Value};
use tracing::debug;

use super::{decode_row, decode_rows, first_row, ServiceError, ServiceResult};
use crate::database::executor::QueryExecutor;
use crate::database::models::{Company, CompanyDetail, CompanyFilters, CompanyJob, CompanySummary};
use crate::database::query_builder::{build_delete, build_insert, build_partial_update, build_select, build_select_by_key};
use crate::database::tables::{COMPANIES, JOBS};
use crate::filter::FilterParser;

const NOT_FOUND: &str = "Company not found";

/// Company CRUD over an injected executor
pub struct CompanyService;

impl CompanyService {
    /// Insert a company. `values` is already projected onto the accepted
    /// fields; an absent or null `logo_url` is stored as `""`.
    pub async fn create(db: &dyn QueryExecutor, mut values: Map<String, Value>) -> ServiceResult<Company> {
        for required in ["handle", "name"] {
            if !values.get(required).is_some_and(Value::is_string) {
                return Err(ServiceError::Validation(vec![format!("{} is required", required)]));
            }
        }
        if values.get("logo_url").map_or(true, Value::is_null) {
            values.insert("logo_url".to_string(), json!(""));
        }

        let descriptor = build_insert(&values, &COMPANIES, COMPANIES.columns)?;
        let rows = db.fetch_rows(&descriptor).await?;
        decode_row(first_row(rows, NOT_FOUND)?)
    }

    /// Handle and name of every company matching `filters`
    pub async fn all(db: &dyn QueryExecutor, filters: &CompanyFilters) -> ServiceResult<Vec<CompanySummary>> {
        // Reject before any query is built
        filters.check_range()?;

        let predicates = FilterParser::parse_filters(&filters.to_filter_map())?;
        let descriptor = build_select(&predicates, &["handle", "name"], &COMPANIES)?;
        let rows = db.fetch_rows(&descriptor).await?;
        decode_rows(rows)
    }

    /// A company plus its jobs.
    ///
    /// Two separate reads: a job added or a company deleted in between is not
    /// reflected consistently.
    pub async fn get(db: &dyn QueryExecutor, handle: &str) -> ServiceResult<CompanyDetail> {
        let descriptor = build_select_by_key(&COMPANIES, COMPANIES.columns, "handle", json!(handle))?;
        let company: Company = decode_row(first_row(db.fetch_rows(&descriptor).await?, NOT_FOUND)?)?;

        let descriptor = build_select_by_key(&JOBS, &["id", "title", "date_posted"], "company_handle", json!(handle))?;
        let jobs: Vec<CompanyJob> = decode_rows(db.fetch_rows(&descriptor).await?)?;

        Ok(CompanyDetail { company, jobs })
    }

    /// Apply the given fields. A null `logo_url` is stored as `""`, as on create.
    pub async fn update(db: &dyn QueryExecutor, handle: &str, values: &Map<String, Value>) -> ServiceResult<Company> {
        super::require_changes(values)?;
        let mut values = values.clone();
        if values.get("logo_url").is_some_and(Value::is_null) {
            values.insert("logo_url".to_string(), json!(""));
        }
        let descriptor = build_partial_update(&COMPANIES, &values, "handle", json!(handle))?;
        let rows = db.fetch_rows(&descriptor).await?;
        decode_row(first_row(rows, NOT_FOUND)?)
    }

    pub async fn delete(db: &dyn QueryExecutor, handle: &str) -> ServiceResult<&'static str> {
        let descriptor = build_delete(&COMPANIES, "handle", json!(handle))?;
        first_row(db.fetch_rows(&descriptor).await?, NOT_FOUND)?;
        debug!("Deleted company {}", handle);
        Ok("Company deleted")
    }
}
