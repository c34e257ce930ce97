use serde_json::{json, Map, Value};
use tracing::debug;

use super::{decode_row, decode_rows, first_row, require_changes, ServiceError, ServiceResult};
use crate::database::executor::QueryExecutor;
use crate::database::models::{Job, JobFilters, JobSummary};
use crate::database::query_builder::{build_delete, build_insert, build_partial_update, build_select, build_select_by_key};
use crate::database::tables::JOBS;
use crate::filter::FilterParser;

const NOT_FOUND: &str = "Job not found";

pub struct JobService;

impl JobService {
    pub async fn create(db: &dyn QueryExecutor, values: &Map<String, Value>) -> ServiceResult<Job> {
        for required in ["title", "salary", "equity", "company_handle"] {
            if values.get(required).map_or(true, Value::is_null) {
                return Err(ServiceError::Validation(vec![format!("{} is required", required)]));
            }
        }

        let descriptor = build_insert(values, &JOBS, JOBS.columns)?;
        let rows = db.fetch_rows(&descriptor).await?;
        decode_row(first_row(rows, NOT_FOUND)?)
    }

    pub async fn all(db: &dyn QueryExecutor, filters: &JobFilters) -> ServiceResult<Vec<JobSummary>> {
        let predicates = FilterParser::parse_filters(&filters.to_filter_map())?;
        let descriptor = build_select(&predicates, &["id", "title", "company_handle"], &JOBS)?;
        decode_rows(db.fetch_rows(&descriptor).await?)
    }

    pub async fn get(db: &dyn QueryExecutor, id: i32) -> ServiceResult<Job> {
        let descriptor = build_select_by_key(&JOBS, JOBS.columns, "id", json!(id))?;
        decode_row(first_row(db.fetch_rows(&descriptor).await?, NOT_FOUND)?)
    }

    pub async fn update(db: &dyn QueryExecutor, id: i32, values: &Map<String, Value>) -> ServiceResult<Job> {
        require_changes(values)?;
        let descriptor = build_partial_update(&JOBS, values, "id", json!(id))?;
        decode_row(first_row(db.fetch_rows(&descriptor).await?, NOT_FOUND)?)
    }

    pub async fn delete(db: &dyn QueryExecutor, id: i32) -> ServiceResult<&'static str> {
        let descriptor = build_delete(&JOBS, "id", json!(id))?;
        first_row(db.fetch_rows(&descriptor).await?, NOT_FOUND)?;
        debug!("Deleted job {}", id);
        Ok("Job deleted")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedExecutor;

    fn job_row() -> Value {
        json!({
            "id": 1,
            "title": "J1",
            "salary": 100000.0,
            "equity": 0.05,
            "company_handle": "c1",
            "date_posted": "2024-01-02T03:04:05+00:00"
        })
    }

    #[tokio::test]
    async fn create_returns_the_stored_job() {
        let db = ScriptedExecutor::new(vec![vec![job_row()]]);
        let values = json!({ "title": "J1", "salary": 100000, "equity": 0.05, "company_handle": "c1" });

        let job = JobService::create(&db, values.as_object().unwrap()).await.unwrap();
        assert_eq!(job.id, 1);
        assert_eq!(job.company_handle, "c1");
        assert_eq!(
            db.seen()[0].query,
            "INSERT INTO jobs (title, salary, equity, company_handle) VALUES ($1, $2, $3, $4) \
             RETURNING id, title, salary, equity, company_handle, date_posted"
        );
    }

    #[tokio::test]
    async fn all_uses_title_search_and_lower_bounds() {
        let db = ScriptedExecutor::new(vec![vec![json!({ "id": 1, "title": "J1", "company_handle": "c1" })]]);
        let filters = JobFilters {
            search: Some("j".to_string()),
            min_salary: Some(50000.into()),
            min_equity: None,
        };

        let jobs = JobService::all(&db, &filters).await.unwrap();
        assert_eq!(jobs.len(), 1);
        assert_eq!(
            db.seen()[0].query,
            "SELECT id, title, company_handle FROM jobs WHERE title ILIKE $1 AND salary >= $2"
        );
    }

    #[tokio::test]
    async fn missing_job_is_not_found() {
        let db = ScriptedExecutor::default();
        assert!(matches!(JobService::get(&db, 99).await, Err(ServiceError::NotFound(m)) if m == "Job not found"));
        assert!(matches!(JobService::delete(&db, 99).await, Err(ServiceError::NotFound(_))));
    }

    #[tokio::test]
    async fn empty_update_is_rejected() {
        let db = ScriptedExecutor::default();
        let err = JobService::update(&db, 1, &Map::new()).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
        assert!(db.seen().is_empty());
    }
}
