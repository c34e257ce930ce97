// HTTP API Error Types
use axum::{extract::rejection::JsonRejection, http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::auth::{JwtError, PasswordError};
use crate::database::manager::DatabaseError;
use crate::database::query_builder::QueryError;
use crate::filter::FilterError;
use crate::services::ServiceError;

/// HTTP API error with appropriate status codes and client-friendly messages
#[derive(Debug, Clone, PartialEq)]
pub enum ApiError {
    // 400 Bad Request
    BadRequest(String),
    ValidationFailed(Vec<String>),
    // Login failures are 400, not 401
    InvalidCredentials,

    // 401 Unauthorized
    Unauthorized(String),

    // 404 Not Found
    NotFound(String),

    // 409 Conflict
    Conflict(String),

    // 413 Payload Too Large
    PayloadTooLarge(String),

    // 500 Internal Server Error
    InternalServerError(String),

    // 503 Service Unavailable
    ServiceUnavailable(String),
}

impl ApiError {
    /// Get HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::BadRequest(_) => 400,
            ApiError::ValidationFailed(_) => 400,
            ApiError::InvalidCredentials => 400,
            ApiError::Unauthorized(_) => 401,
            ApiError::NotFound(_) => 404,
            ApiError::Conflict(_) => 409,
            ApiError::PayloadTooLarge(_) => 413,
            ApiError::InternalServerError(_) => 500,
            ApiError::ServiceUnavailable(_) => 503,
        }
    }

    /// Client-facing message: a string, or a list of strings for validation failures
    pub fn message(&self) -> Value {
        match self {
            ApiError::ValidationFailed(messages) => json!(messages),
            ApiError::InvalidCredentials => json!("Invalid username or password."),
            ApiError::BadRequest(msg)
            | ApiError::Unauthorized(msg)
            | ApiError::NotFound(msg)
            | ApiError::Conflict(msg)
            | ApiError::PayloadTooLarge(msg)
            | ApiError::InternalServerError(msg)
            | ApiError::ServiceUnavailable(msg) => json!(msg),
        }
    }

    /// Convert to JSON response body
    pub fn to_json(&self) -> Value {
        json!({
            "status": self.status_code(),
            "message": self.message()
        })
    }
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn validation_failed(messages: Vec<String>) -> Self {
        ApiError::ValidationFailed(messages)
    }

    pub fn unauthorized() -> Self {
        ApiError::Unauthorized("Unauthorized".to_string())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        ApiError::Conflict(message.into())
    }

    pub fn payload_too_large(message: impl Into<String>) -> Self {
        ApiError::PayloadTooLarge(message.into())
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        ApiError::InternalServerError(message.into())
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        ApiError::ServiceUnavailable(message.into())
    }
}

impl ApiError {
    /// Client errors for constraint violations reported by the store
    fn from_sql_state(code: &str) -> Option<Self> {
        match code {
            // not_null_violation
            "23502" => Some(ApiError::validation_failed(vec!["A required field is missing".to_string()])),
            // foreign_key_violation
            "23503" => Some(ApiError::conflict("Referenced record does not exist")),
            // unique_violation
            "23505" => Some(ApiError::conflict("A record with that key already exists")),
            // check_violation
            "23514" => Some(ApiError::bad_request("Value violates a table constraint")),
            _ => None,
        }
    }
}

// Convert other error types to ApiError
impl From<DatabaseError> for ApiError {
    fn from(err: DatabaseError) -> Self {
        if let Some(api_error) = err.sql_state().as_deref().and_then(ApiError::from_sql_state) {
            return api_error;
        }

        match err {
            DatabaseError::ConfigMissing(_) => {
                ApiError::service_unavailable("Database temporarily unavailable")
            }
            DatabaseError::Sqlx(sqlx::Error::PoolTimedOut) | DatabaseError::Sqlx(sqlx::Error::Io(_)) => {
                tracing::error!("Database connectivity error: {}", err);
                ApiError::service_unavailable("Database temporarily unavailable")
            }
            other => {
                // Don't expose internal SQL errors to clients
                tracing::error!("Database error: {}", other);
                ApiError::internal_server_error("An error occurred while processing your request")
            }
        }
    }
}

impl From<QueryError> for ApiError {
    fn from(err: QueryError) -> Self {
        // Identifiers come from code, so an unknown column is a bug rather than bad input
        tracing::error!("Query build error: {}", err);
        ApiError::internal_server_error("An error occurred while processing your request")
    }
}

impl From<FilterError> for ApiError {
    fn from(err: FilterError) -> Self {
        ApiError::validation_failed(vec![err.to_string()])
    }
}

impl From<JwtError> for ApiError {
    fn from(err: JwtError) -> Self {
        tracing::error!("Token error: {}", err);
        ApiError::internal_server_error("Failed to issue token")
    }
}

impl From<PasswordError> for ApiError {
    fn from(err: PasswordError) -> Self {
        tracing::error!("Password hashing error: {}", err);
        ApiError::internal_server_error("An error occurred while processing your request")
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::NotFound(msg) => ApiError::not_found(msg),
            ServiceError::Validation(messages) => ApiError::validation_failed(messages),
            ServiceError::InvalidCredentials => ApiError::InvalidCredentials,
            ServiceError::Filter(e) => e.into(),
            ServiceError::Query(e) => e.into(),
            ServiceError::Database(e) => e.into(),
            ServiceError::Password(e) => e.into(),
            ServiceError::Decode(e) => {
                tracing::error!("Row decode error: {}", e);
                ApiError::internal_server_error("An error occurred while processing your request")
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        match rejection {
            JsonRejection::BytesRejection(_) => ApiError::payload_too_large("Request body too large"),
            other => ApiError::bad_request(other.body_text()),
        }
    }
}

// Standard error trait implementations
impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.status_code(), self.message())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.to_json())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_failures_carry_a_list() {
        let err = ApiError::validation_failed(vec!["handle is required".to_string()]);
        assert_eq!(err.to_json(), json!({ "status": 400, "message": ["handle is required"] }));
    }

    #[test]
    fn invalid_credentials_is_a_400() {
        assert_eq!(
            ApiError::InvalidCredentials.to_json(),
            json!({ "status": 400, "message": "Invalid username or password." })
        );
    }

    #[test]
    fn not_found_from_service_error() {
        let err: ApiError = ServiceError::NotFound("Company not found".to_string()).into();
        assert_eq!(err.to_json(), json!({ "status": 404, "message": "Company not found" }));
    }

    #[test]
    fn constraint_violations_map_to_client_errors() {
        assert_eq!(ApiError::from_sql_state("23505").map(|e| e.status_code()), Some(409));
        assert_eq!(ApiError::from_sql_state("23503").map(|e| e.status_code()), Some(409));
        assert_eq!(
            ApiError::from_sql_state("23502"),
            Some(ApiError::validation_failed(vec!["A required field is missing".to_string()]))
        );
        assert_eq!(ApiError::from_sql_state("23514").map(|e| e.status_code()), Some(400));
        assert_eq!(ApiError::from_sql_state("42P01"), None);
    }

    #[test]
    fn internal_database_details_stay_hidden() {
        let err: ApiError = DatabaseError::QueryError("relation \"x\" does not exist".to_string()).into();
        assert_eq!(err.status_code(), 500);
        assert!(!err.message().to_string().contains("relation"));
    }
}
