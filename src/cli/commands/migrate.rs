use anyhow::Context;

use crate::config::config;
use crate::database::DatabaseManager;

pub async fn handle() -> anyhow::Result<()> {
    let pool = DatabaseManager::connect(&config().database)
        .await
        .context("failed to connect to the database")?;
    DatabaseManager::migrate(&pool).await?;
    pool.close().await;
    Ok(())
}
