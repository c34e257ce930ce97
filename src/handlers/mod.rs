pub mod auth;
pub mod companies;
pub mod jobs;
pub mod users;

use std::collections::HashMap;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::{json, Map, Value};

use crate::database::models::Payload;
use crate::error::ApiError;
use crate::filter::project;
use crate::state::AppState;

/// GET / - service description
pub async fn root() -> Json<Value> {
    Json(json!({
        "name": "Jobly API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "auth": "POST /auth/login (public)",
            "companies": "/companies[/:handle] (read: logged in, write: admin)",
            "jobs": "/jobs[/:id] (read: logged in, write: admin)",
            "users": "POST /users (public), /users[/:username] (logged in; self or admin to modify)",
            "health": "/health (public)"
        }
    }))
}

/// GET /health - 200 when the database answers, 503 otherwise
pub async fn health(State(state): State<AppState>) -> Response {
    match state.db().ping().await {
        Ok(()) => (StatusCode::OK, Json(json!({ "status": "ok", "database": "ok" }))).into_response(),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            ApiError::service_unavailable("Database unavailable").into_response()
        }
    }
}

/// Validate a JSON body against `P` and keep only the fields `P` accepts
pub(crate) fn validated<P: Payload>(
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Map<String, Value>, ApiError> {
    let Json(body) = body?;
    P::from_json(&body)?;
    let source = body.as_object().cloned().unwrap_or_default();
    Ok(project(&source, P::FIELDS))
}

/// Query-string pairs as a JSON map restricted to `keys`
pub(crate) fn query_params(params: HashMap<String, String>, keys: &[&str]) -> Map<String, Value> {
    let source: Map<String, Value> = params
        .into_iter()
        .map(|(k, v)| (k, Value::String(v)))
        .collect();
    project(&source, keys)
}
