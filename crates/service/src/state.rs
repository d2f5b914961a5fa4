use std::sync::Arc;

use http::HeaderValue;

use common::auth::{CredentialStore, UserEntry};
use common::storage::Storage;

use super::config::{Config, ConfigError};

/// Main service state shared across request handlers.
#[derive(Clone)]
pub struct State {
    storage: Storage,
    credentials: Arc<CredentialStore>,
    unique_artifacts: bool,
    cache_control_list: Option<HeaderValue>,
    cache_control_fetch: Option<HeaderValue>,
}

impl State {
    pub async fn from_config(config: &Config) -> Result<Self, StateSetupError> {
        // 1. Bring up the storage backend
        let storage = Storage::new(config.storage.clone()).await?;
        tracing::info!(backend = config.storage.kind(), "storage backend ready");

        // 2. Load the credential table
        let entries = config.load_credentials()?;
        let mut credentials = CredentialStore::new();
        credentials.add_all(entries.into_iter().map(UserEntry::into_user));
        tracing::info!(accounts = credentials.len(), "credential table loaded");

        // 3. Validate response-header configuration up front
        let cache_control_list = parse_cache_control(config.cache_control_list.as_deref())?;
        let cache_control_fetch = parse_cache_control(config.cache_control_fetch.as_deref())?;

        Ok(Self {
            storage,
            credentials: Arc::new(credentials),
            unique_artifacts: config.unique_artifacts,
            cache_control_list,
            cache_control_fetch,
        })
    }

    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    pub fn credentials(&self) -> &CredentialStore {
        &self.credentials
    }

    /// Whether uploads may overwrite existing non-metadata artifacts.
    pub fn unique_artifacts(&self) -> bool {
        self.unique_artifacts
    }

    pub fn cache_control_list(&self) -> Option<&HeaderValue> {
        self.cache_control_list.as_ref()
    }

    pub fn cache_control_fetch(&self) -> Option<&HeaderValue> {
        self.cache_control_fetch.as_ref()
    }
}

fn parse_cache_control(value: Option<&str>) -> Result<Option<HeaderValue>, StateSetupError> {
    value
        .map(|v| {
            HeaderValue::from_str(v).map_err(|_| StateSetupError::InvalidCacheControl(v.to_string()))
        })
        .transpose()
}

#[derive(Debug, thiserror::Error)]
pub enum StateSetupError {
    #[error("storage setup error: {0}")]
    Storage(#[from] common::storage::StorageError),
    #[error("credentials error: {0}")]
    Credentials(#[from] ConfigError),
    #[error("invalid cache-control value: {0}")]
    InvalidCacheControl(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn from_config_defaults_to_an_empty_table() {
        let state = State::from_config(&Config::default()).await.unwrap();
        assert!(state.credentials().is_empty());
        assert!(!state.unique_artifacts());
        assert!(state.cache_control_list().is_none());
    }

    #[tokio::test]
    async fn invalid_cache_control_is_rejected() {
        let config = Config {
            cache_control_fetch: Some("max-age=60\r\nX-Bad: value".to_string()),
            ..Config::default()
        };
        assert!(matches!(
            State::from_config(&config).await,
            Err(StateSetupError::InvalidCacheControl(_))
        ));
    }
}
