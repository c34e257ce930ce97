use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Number, Value};
use validator::Validate;

use super::{numeric_param, text_param, Payload};
use crate::services::ServiceError;

/// Full company row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Company {
    pub handle: String,
    pub name: String,
    pub employees: Option<i32>,
    pub description: Option<String>,
    pub logo_url: Option<String>,
}

/// Listing entry for `GET /companies`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanySummary {
    pub handle: String,
    pub name: String,
}

/// Job as listed under its company
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyJob {
    pub id: i32,
    pub title: String,
    pub date_posted: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompanyDetail {
    #[serde(flatten)]
    pub company: Company,
    pub jobs: Vec<CompanyJob>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CompanyCreate {
    #[validate(
        required(message = "handle is required"),
        length(min = 1, max = 25, message = "handle must be 1 to 25 characters")
    )]
    pub handle: Option<String>,
    #[validate(
        required(message = "name is required"),
        length(min = 1, message = "name must not be empty")
    )]
    pub name: Option<String>,
    #[validate(range(min = 0, message = "employees must be at least 0"))]
    pub employees: Option<i64>,
    pub description: Option<String>,
    #[validate(url(message = "logo_url must be a valid URL"))]
    pub logo_url: Option<String>,
}

impl Payload for CompanyCreate {
    const FIELDS: &'static [&'static str] = &["handle", "name", "employees", "description", "logo_url"];
}

/// The handle is the key and cannot be changed
#[derive(Debug, Deserialize, Validate)]
pub struct CompanyUpdate {
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub name: Option<String>,
    #[validate(range(min = 0, message = "employees must be at least 0"))]
    pub employees: Option<i64>,
    pub description: Option<String>,
    #[validate(url(message = "logo_url must be a valid URL"))]
    pub logo_url: Option<String>,
}

impl Payload for CompanyUpdate {
    const FIELDS: &'static [&'static str] = &["name", "employees", "description", "logo_url"];
    const NOT_NULL: &'static [&'static str] = &["name"];
}

/// Query parameters accepted by `GET /companies`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompanyFilters {
    pub search: Option<String>,
    pub min_employees: Option<Number>,
    pub max_employees: Option<Number>,
}

impl CompanyFilters {
    pub const KEYS: &'static [&'static str] = &["search", "min_employees", "max_employees"];

    pub fn from_query(params: &Map<String, Value>) -> Result<Self, ServiceError> {
        let mut errors = Vec::new();
        let mut numeric = |key: &str| match numeric_param(params, key) {
            Ok(n) => n,
            Err(e) => {
                errors.push(e);
                None
            }
        };
        let min_employees = numeric("min_employees");
        let max_employees = numeric("max_employees");
        if !errors.is_empty() {
            return Err(ServiceError::Validation(errors));
        }

        Ok(Self {
            search: text_param(params, "search"),
            min_employees,
            max_employees,
        })
    }

    pub fn check_range(&self) -> Result<(), ServiceError> {
        if let (Some(min), Some(max)) = (&self.min_employees, &self.max_employees) {
            if min.as_f64() > max.as_f64() {
                return Err(ServiceError::Validation(vec![
                    "Min employees cannot be larger than max employees".to_string(),
                ]));
            }
        }
        Ok(())
    }

    /// Rename onto `{verb}_{column}` filter keys for the companies table
    pub fn to_filter_map(&self) -> Map<String, Value> {
        let mut filters = Map::new();
        filters.insert("search_name".to_string(), json!(self.search));
        filters.insert("min_employees".to_string(), json!(self.min_employees));
        filters.insert("max_employees".to_string(), json!(self.max_employees));
        filters
    }
}
