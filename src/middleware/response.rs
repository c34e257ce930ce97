use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::ApiError;

/// Successful response body keyed by resource name, e.g. `{ "company": {...} }`
#[derive(Debug)]
pub struct ApiResponse<T: Serialize> {
    pub key: &'static str,
    pub data: T,
    pub status_code: Option<StatusCode>,
    extra: Map<String, Value>,
}

impl<T: Serialize> ApiResponse<T> {
    /// 200 OK
    pub fn new(key: &'static str, data: T) -> Self {
        Self {
            key,
            data,
            status_code: None,
            extra: Map::new(),
        }
    }

    /// 201 Created
    pub fn created(key: &'static str, data: T) -> Self {
        Self {
            status_code: Some(StatusCode::CREATED),
            ..Self::new(key, data)
        }
    }

    /// Add a sibling field next to the main key
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.extra.insert(key.to_string(), value.into());
        self
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let status = self.status_code.unwrap_or(StatusCode::OK);

        let data_value = match serde_json::to_value(&self.data) {
            Ok(value) => value,
            Err(e) => {
                tracing::error!("Failed to serialize response data: {}", e);
                return ApiError::internal_server_error("Failed to serialize response data").into_response();
            }
        };

        let mut envelope = Map::new();
        envelope.insert(self.key.to_string(), data_value);
        envelope.extend(self.extra);

        (status, Json(Value::Object(envelope))).into_response()
    }
}

pub type ApiResult<T> = Result<ApiResponse<T>, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use serde_json::json;

    async fn body_of(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn wraps_data_under_its_key() {
        let response = ApiResponse::new("message", "Company deleted").into_response();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_of(response).await, json!({ "message": "Company deleted" }));
    }

    #[tokio::test]
    async fn created_with_sibling_field() {
        let response = ApiResponse::created("user", json!({ "username": "u1" }))
            .with("token", "abc")
            .into_response();
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(body_of(response).await, json!({ "user": { "username": "u1" }, "token": "abc" }));
    }
}
