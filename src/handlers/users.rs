use axum::extract::{rejection::JsonRejection, Path, State};
use axum::Json;
use serde_json::Value;

use super::auth::issue_token;
use super::validated;
use crate::database::models::{User, UserCreate, UserSummary, UserUpdate};
use crate::middleware::{ApiResponse, ApiResult, Authentication, RequireIdentity};
use crate::services::UserService;
use crate::state::AppState;

/**
 * POST /users - public registration
 *
 * Expected Input:
 * ```json
 * {
 *   "username": "string",
 *   "password": "string",
 *   "first_name": "string",
 *   "last_name": "string",
 *   "email": "string",
 *   "photo_url": "string"     // Optional
 * }
 * ```
 *
 * Expected Output (201):
 * ```json
 * {
 *   "user": { "username": "...", "first_name": "...", "last_name": "...", "email": "...", "photo_url": null },
 *   "token": "eyJhbGciOiJIUzI1NiI..."
 * }
 * ```
 *
 * New users are never admins; `is_admin` is not an accepted field.
 */
pub async fn register(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<User> {
    let values = validated::<UserCreate>(body)?;
    let user = UserService::create(state.db(), state.credentials(), values).await?;
    let token = issue_token(&state, &user.username, false)?;
    Ok(ApiResponse::created("user", user).with("token", token))
}

pub async fn list(
    State(state): State<AppState>,
    RequireIdentity(_): RequireIdentity,
) -> ApiResult<Vec<UserSummary>> {
    let users = UserService::all(state.db()).await?;
    Ok(ApiResponse::new("users", users))
}

pub async fn get(
    State(state): State<AppState>,
    RequireIdentity(_): RequireIdentity,
    Path(username): Path<String>,
) -> ApiResult<User> {
    let user = UserService::get(state.db(), &username).await?;
    Ok(ApiResponse::new("user", user))
}

/// PATCH /users/:username - the user themself or an admin
pub async fn update(
    State(state): State<AppState>,
    authentication: Authentication,
    Path(username): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<User> {
    authentication.require_self_or_privilege(&username)?;
    let values = validated::<UserUpdate>(body)?;
    let user = UserService::update(state.db(), state.credentials(), &username, values).await?;
    Ok(ApiResponse::new("user", user))
}

/// DELETE /users/:username - the user themself or an admin
pub async fn delete(
    State(state): State<AppState>,
    authentication: Authentication,
    Path(username): Path<String>,
) -> ApiResult<&'static str> {
    authentication.require_self_or_privilege(&username)?;
    let message = UserService::delete(state.db(), &username).await?;
    Ok(ApiResponse::new("message", message))
}
