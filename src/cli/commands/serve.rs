use std::sync::Arc;

use anyhow::Context;

use crate::app::app;
use crate::auth::Argon2Verifier;
use crate::config::config;
use crate::database::{DatabaseManager, PgExecutor};
use crate::state::AppState;

pub async fn handle(port: Option<u16>) -> anyhow::Result<()> {
    let mut config = config().clone();
    if let Some(port) = port {
        config.server.port = port;
    }
    tracing::info!("Starting Jobly API in {:?} mode", config.environment);

    if config.security.jwt_secret.is_empty() {
        anyhow::bail!("SECRET_KEY must be set");
    }

    let pool = DatabaseManager::connect(&config.database)
        .await
        .context("failed to connect to the database")?;
    let credentials = Argon2Verifier::from_config(&config.security)?;

    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    let db = PgExecutor::new(pool, config.database.enable_query_logging);
    let state = AppState::new(Arc::new(db), Arc::new(credentials), config);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;
    tracing::info!("Jobly API listening on http://{}", bind_addr);

    axum::serve(listener, app(state)).await?;
    Ok(())
}
