use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Number, Value};
use validator::Validate;

use super::{numeric_param, text_param, Payload};
use crate::services::ServiceError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: i32,
    pub title: String,
    pub salary: f64,
    pub equity: f64,
    pub company_handle: String,
    pub date_posted: DateTime<Utc>,
}

/// Listing entry for `GET /jobs`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobSummary {
    pub id: i32,
    pub title: String,
    pub company_handle: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct JobCreate {
    #[validate(
        required(message = "title is required"),
        length(min = 1, message = "title must not be empty")
    )]
    pub title: Option<String>,
    #[validate(
        required(message = "salary is required"),
        range(min = 0.0, message = "salary must be at least 0")
    )]
    pub salary: Option<f64>,
    #[validate(
        required(message = "equity is required"),
        range(min = 0.0, max = 1.0, message = "equity must be between 0 and 1")
    )]
    pub equity: Option<f64>,
    #[validate(
        required(message = "company_handle is required"),
        length(min = 1, message = "company_handle must not be empty")
    )]
    pub company_handle: Option<String>,
}

impl Payload for JobCreate {
    const FIELDS: &'static [&'static str] = &["title", "salary", "equity", "company_handle"];
}

/// A job cannot move to another company
#[derive(Debug, Deserialize, Validate)]
pub struct JobUpdate {
    #[validate(length(min = 1, message = "title must not be empty"))]
    pub title: Option<String>,
    #[validate(range(min = 0.0, message = "salary must be at least 0"))]
    pub salary: Option<f64>,
    #[validate(range(min = 0.0, max = 1.0, message = "equity must be between 0 and 1"))]
    pub equity: Option<f64>,
}

impl Payload for JobUpdate {
    const FIELDS: &'static [&'static str] = &["title", "salary", "equity"];
    const NOT_NULL: &'static [&'static str] = &["title", "salary", "equity"];
}

/// Query parameters accepted by `GET /jobs`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JobFilters {
    pub search: Option<String>,
    pub min_salary: Option<Number>,
    pub min_equity: Option<Number>,
}

impl JobFilters {
    pub const KEYS: &'static [&'static str] = &["search", "min_salary", "min_equity"];

    pub fn from_query(params: &Map<String, Value>) -> Result<Self, ServiceError> {
        let min_salary = numeric_param(params, "min_salary");
        let min_equity = numeric_param(params, "min_equity");
        let errors: Vec<String> = [&min_salary, &min_equity]
            .into_iter()
            .filter_map(|r| r.as_ref().err().cloned())
            .collect();
        if !errors.is_empty() {
            return Err(ServiceError::Validation(errors));
        }

        Ok(Self {
            search: text_param(params, "search"),
            min_salary: min_salary.unwrap_or_default(),
            min_equity: min_equity.unwrap_or_default(),
        })
    }

    /// Rename onto `{verb}_{column}` filter keys for the jobs table
    pub fn to_filter_map(&self) -> Map<String, Value> {
        let mut filters = Map::new();
        filters.insert("search_title".to_string(), json!(self.search));
        filters.insert("min_salary".to_string(), json!(self.min_salary));
        filters.insert("min_equity".to_string(), json!(self.min_equity));
        filters
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_checks_every_field() {
        let err = JobCreate::from_json(&json!({ "title": "", "salary": -5, "equity": 1.5 })).unwrap_err();
        match err {
            ServiceError::Validation(messages) => assert_eq!(
                messages,
                vec![
                    "title must not be empty",
                    "salary must be at least 0",
                    "equity must be between 0 and 1",
                    "company_handle is required",
                ]
            ),
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn update_accepts_partial_bodies() {
        assert!(JobUpdate::from_json(&json!({ "salary": 120000 })).is_ok());
        assert!(JobUpdate::from_json(&json!({})).is_ok());
    }

    #[test]
    fn update_refuses_nulls() {
        let err = JobUpdate::from_json(&json!({ "title": null, "salary": null })).unwrap_err();
        match err {
            ServiceError::Validation(messages) => {
                assert_eq!(messages, vec!["title must not be null", "salary must not be null"])
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn filters_map_search_onto_title() {
        let params = json!({ "search": "engineer", "min_equity": "0.05" });
        let filters = JobFilters::from_query(params.as_object().unwrap()).unwrap();
        let map = filters.to_filter_map();
        assert_eq!(map["search_title"], json!("engineer"));
        assert_eq!(map["min_equity"].as_f64(), Some(0.05));
        assert_eq!(map["min_salary"], Value::Null);
    }
}
