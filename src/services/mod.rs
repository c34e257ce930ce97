pub mod company_service;
pub mod job_service;
pub mod user_service;

use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::auth::PasswordError;
use crate::database::executor::Row;
use crate::database::manager::DatabaseError;
use crate::database::query_builder::{QueryError, RESERVED_PREFIX};
use crate::filter::FilterError;

pub use company_service::CompanyService;
pub use job_service::JobService;
pub use user_service::{AuthenticatedUser, UserService};

/// Errors from the entity layer
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    NotFound(String),

    #[error("Validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    #[error("Invalid username or password.")]
    InvalidCredentials,

    #[error(transparent)]
    Filter(#[from] FilterError),

    #[error(transparent)]
    Query(#[from] QueryError),

    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error(transparent)]
    Password(#[from] PasswordError),

    #[error("Failed to decode row: {0}")]
    Decode(#[from] serde_json::Error),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

fn decode_row<T: DeserializeOwned>(row: Row) -> ServiceResult<T> {
    Ok(serde_json::from_value(serde_json::Value::Object(row))?)
}

fn decode_rows<T: DeserializeOwned>(rows: Vec<Row>) -> ServiceResult<Vec<T>> {
    rows.into_iter().map(decode_row).collect()
}

/// First row, or `NotFound(message)` when the statement matched nothing
fn first_row(rows: Vec<Row>, not_found: &str) -> ServiceResult<Row> {
    rows.into_iter()
        .next()
        .ok_or_else(|| ServiceError::NotFound(not_found.to_string()))
}

/// An update with nothing to set would produce an empty SET list
fn require_changes(values: &serde_json::Map<String, serde_json::Value>) -> ServiceResult<()> {
    if values.keys().all(|k| k.starts_with(RESERVED_PREFIX)) {
        return Err(ServiceError::Validation(vec!["No fields to update".to_string()]));
    }
    Ok(())
}
