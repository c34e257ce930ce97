use axum::extract::{rejection::JsonRejection, State};
use axum::Json;
use serde_json::Value;

use crate::auth::{generate_jwt, Claims};
use crate::database::models::Login;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::UserService;
use crate::state::AppState;

/// POST /auth/login - exchange credentials for a token
///
/// Input: `{ "username": "...", "password": "..." }`
///
/// Output: `{ "token": "eyJhbGciOiJIUzI1NiI..." }`
///
/// Missing fields, unknown users and wrong passwords all answer
/// 400 "Invalid username or password.".
pub async fn login(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<String> {
    let Json(body) = body?;
    let login: Login = serde_json::from_value(body).unwrap_or_default();
    let (Some(username), Some(password)) = (login.username, login.password) else {
        return Err(ApiError::InvalidCredentials);
    };

    let user = UserService::authenticate(state.db(), state.credentials(), &username, &password).await?;
    let token = issue_token(&state, &user.username, user.is_admin)?;
    Ok(ApiResponse::new("token", token))
}

pub(crate) fn issue_token(state: &AppState, username: &str, is_admin: bool) -> Result<String, ApiError> {
    let security = &state.config.security;
    let claims = Claims::new(username, is_admin, security.jwt_expiry_hours);
    Ok(generate_jwt(&claims, &security.jwt_secret)?)
}
