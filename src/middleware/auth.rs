use std::collections::HashMap;
use std::convert::Infallible;

use axum::{
    async_trait,
    body::{to_bytes, Body},
    extract::{FromRequestParts, Query, Request, State},
    http::{header, request::Parts, HeaderMap, Uri},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::Value;
use tracing::debug;

use crate::auth::{verify_jwt, Claims};
use crate::error::ApiError;
use crate::state::AppState;

/// Request field carrying a token in the query string or JSON body
pub const TOKEN_FIELD: &str = "_token";

/// Caller identity decoded from a verified token
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Identity {
    pub username: String,
    pub is_admin: bool,
}

impl From<Claims> for Identity {
    fn from(claims: Claims) -> Self {
        Self {
            username: claims.username,
            is_admin: claims.is_admin,
        }
    }
}

/// Request-scoped authentication result, attached once by [`verify_token`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Authentication {
    Identified(Identity),
    Anonymous,
}

impl Authentication {
    pub fn identity(&self) -> Option<&Identity> {
        match self {
            Authentication::Identified(identity) => Some(identity),
            Authentication::Anonymous => None,
        }
    }

    /// 401 unless a valid token was presented
    pub fn require_identity(&self) -> Result<&Identity, ApiError> {
        self.identity().ok_or_else(ApiError::unauthorized)
    }

    /// 401 unless the caller is an admin. Checks for an identity itself, so it
    /// holds even when no other gate ran first.
    pub fn require_privilege(&self) -> Result<&Identity, ApiError> {
        let identity = self.require_identity()?;
        if !identity.is_admin {
            debug!("Rejected non-admin user {}", identity.username);
            return Err(ApiError::unauthorized());
        }
        Ok(identity)
    }

    /// 401 unless the caller is `username` or an admin
    pub fn require_self_or_privilege(&self, username: &str) -> Result<&Identity, ApiError> {
        let identity = self.require_identity()?;
        if !identity.is_admin && identity.username != username {
            debug!("Rejected {} acting on {}", identity.username, username);
            return Err(ApiError::unauthorized());
        }
        Ok(identity)
    }
}

/// Token verification middleware.
///
/// Looks for a token in the `_token` JSON body field, then the `_token` query
/// parameter, then an `Authorization: Bearer` header. The first one found is
/// the only one verified. A valid token attaches
/// [`Authentication::Identified`]; a missing or invalid one attaches
/// [`Authentication::Anonymous`]. Token problems never end the request here.
///
/// The body is buffered so it can be inspected and is handed on unchanged.
/// Bodies over `api.max_request_size_bytes` are answered with 413.
pub async fn verify_token(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let (mut parts, body) = request.into_parts();

    let bytes = match to_bytes(body, state.config.api.max_request_size_bytes).await {
        Ok(bytes) => bytes,
        Err(e) => {
            debug!("Failed to buffer request body: {}", e);
            return ApiError::payload_too_large("Request body too large").into_response();
        }
    };

    let token = token_from_body(&bytes)
        .or_else(|| token_from_query(&parts.uri))
        .or_else(|| token_from_header(&parts.headers));

    let authentication = match token {
        Some(token) => match verify_jwt(&token, &state.config.security.jwt_secret) {
            Ok(claims) => Authentication::Identified(claims.into()),
            Err(e) => {
                debug!("Ignoring token: {}", e);
                Authentication::Anonymous
            }
        },
        None => Authentication::Anonymous,
    };
    parts.extensions.insert(authentication);

    next.run(Request::from_parts(parts, Body::from(bytes))).await
}

fn token_from_query(uri: &Uri) -> Option<String> {
    let Query(params) = Query::<HashMap<String, String>>::try_from_uri(uri).ok()?;
    params.get(TOKEN_FIELD).filter(|t| !t.is_empty()).cloned()
}

fn token_from_body(bytes: &[u8]) -> Option<String> {
    if bytes.is_empty() {
        return None;
    }
    let body: Value = serde_json::from_slice(bytes).ok()?;
    body.get(TOKEN_FIELD)?.as_str().map(str::to_string)
}

fn token_from_header(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

/// Missing extension means `verify_token` never ran; that is treated as anonymous
fn attached(parts: &Parts) -> Authentication {
    parts
        .extensions
        .get::<Authentication>()
        .cloned()
        .unwrap_or(Authentication::Anonymous)
}

#[async_trait]
impl<S> FromRequestParts<S> for Authentication
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(attached(parts))
    }
}

/// Extractor for routes that need a logged-in caller
#[derive(Clone, Debug)]
pub struct RequireIdentity(pub Identity);

#[async_trait]
impl<S> FromRequestParts<S> for RequireIdentity
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        attached(parts).require_identity().cloned().map(RequireIdentity)
    }
}

/// Extractor for admin-only routes
#[derive(Clone, Debug)]
pub struct RequireAdmin(pub Identity);

#[async_trait]
impl<S> FromRequestParts<S> for RequireAdmin
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        attached(parts).require_privilege().cloned().map(RequireAdmin)
    }
}
