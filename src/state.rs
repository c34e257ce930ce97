use std::sync::Arc;

use crate::auth::CredentialVerifier;
use crate::config::AppConfig;
use crate::database::executor::QueryExecutor;

/// Shared handles passed to every handler
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<dyn QueryExecutor>,
    pub credentials: Arc<dyn CredentialVerifier>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(
        db: Arc<dyn QueryExecutor>,
        credentials: Arc<dyn CredentialVerifier>,
        config: AppConfig,
    ) -> Self {
        Self {
            db,
            credentials,
            config: Arc::new(config),
        }
    }

    pub fn db(&self) -> &dyn QueryExecutor {
        self.db.as_ref()
    }

    pub fn credentials(&self) -> &dyn CredentialVerifier {
        self.credentials.as_ref()
    }
}
