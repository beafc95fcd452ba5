use std::sync::Arc;
use tracing::warn;
use uuid::Uuid;

use crate::config::AppConfig;
use crate::database::DataStore;

/// Shared handler state: resolved configuration plus the store adapter.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<DataStore>,
}

impl AppState {
    pub fn new(mut config: AppConfig) -> Self {
        if config.security.jwt_secret.is_empty() {
            warn!("JWT_SECRET not set; using an ephemeral secret, tokens will not survive a restart");
            config.security.jwt_secret = format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple());
        }

        let store = DataStore::from_config(&config.store);
        Self {
            config: Arc::new(config),
            store: Arc::new(store),
        }
    }

    pub fn jwt_secret(&self) -> &str {
        &self.config.security.jwt_secret
    }
}
