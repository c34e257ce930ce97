#![allow(dead_code)]

use std::sync::Arc;

use anyhow::Result;
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;

use jobly_api::auth::{generate_jwt, Argon2Verifier, Claims, CredentialVerifier};
use jobly_api::config::AppConfig;
pub use jobly_api::testing::ScriptedExecutor;
use jobly_api::{app, AppState};

pub struct TestApp {
    pub db: Arc<ScriptedExecutor>,
    pub config: AppConfig,
    router: Router,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_db(ScriptedExecutor::default())
    }

    pub fn with_db(db: ScriptedExecutor) -> Self {
        let db = Arc::new(db);
        let config = AppConfig::test();
        let state = AppState::new(db.clone(), Arc::new(verifier()), config.clone());
        Self {
            db,
            config,
            router: app(state),
        }
    }

    pub fn token(&self, username: &str, is_admin: bool) -> String {
        let claims = Claims::new(username, is_admin, 1);
        generate_jwt(&claims, &self.config.security.jwt_secret).expect("token")
    }

    pub fn admin_token(&self) -> String {
        self.token("admin", true)
    }

    pub fn user_token(&self) -> String {
        self.token("u1", false)
    }

    /// Send one request through the router; returns the status and JSON body
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> Result<(StatusCode, Value)> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&body)?))?,
            None => builder.body(Body::empty())?,
        };

        let response = self.router.clone().oneshot(request).await?;
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await?;
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)?
        };
        Ok((status, json))
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> Result<(StatusCode, Value)> {
        self.send(Method::GET, uri, token, None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> Result<(StatusCode, Value)> {
        self.send(Method::POST, uri, token, Some(body)).await
    }

    pub async fn patch(&self, uri: &str, token: Option<&str>, body: Value) -> Result<(StatusCode, Value)> {
        self.send(Method::PATCH, uri, token, Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: Option<&str>) -> Result<(StatusCode, Value)> {
        self.send(Method::DELETE, uri, token, None).await
    }
}

/// Same cheap argon2 parameters the test config uses
pub fn verifier() -> Argon2Verifier {
    let security = AppConfig::test().security;
    Argon2Verifier::from_config(&security).expect("argon2 params")
}

pub fn hash(password: &str) -> String {
    verifier().hash(password).expect("hash")
}
