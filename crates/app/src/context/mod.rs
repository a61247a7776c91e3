//! Application context - dependency injection container

use std::path::PathBuf;
use std::sync::Arc;

use flowlab_common::KeyValueStore;
use flowlab_core::{FlowService, ProviderTransport};
use flowlab_domain::{AppConfig, FlowError, ProviderConfig, Result};
use flowlab_infra::{config, HttpClient, InfraError, JsonFileStore};
use tracing::info;

/// Application context - holds the configuration and the flow service
pub struct AppContext {
    pub config: AppConfig,
    pub service: FlowService,
}

impl AppContext {
    /// Load configuration and wire the production adapters
    ///
    /// `config_path` overrides the environment/file probing of
    /// [`config::load`].
    pub fn new(config_path: Option<PathBuf>) -> Result<Self> {
        let config = match config_path {
            Some(path) => {
                let config = config::load_from_file(Some(path))?;
                config.validate()?;
                config
            }
            None => config::load()?,
        };
        Self::from_config(config)
    }

    /// Wire the reqwest transport and the JSON session file
    pub fn from_config(config: AppConfig) -> Result<Self> {
        let store = JsonFileStore::open(&config.storage.session_path)
            .map_err(|e| FlowError::from(InfraError::from(e)))?;
        let transport = HttpClient::from_settings(&config.http)?;

        info!(
            base_url = %config.provider.base_url,
            session_path = %config.storage.session_path,
            confidential_client = config.provider.client_secret.is_some(),
            "application context initialized"
        );

        Ok(Self::from_parts(config, Arc::new(store), Arc::new(transport)))
    }

    /// Assemble a context from explicit adapters
    pub fn from_parts(
        config: AppConfig,
        store: Arc<dyn KeyValueStore>,
        transport: Arc<dyn ProviderTransport>,
    ) -> Self {
        let provider: Arc<ProviderConfig> = Arc::new(config.provider.clone());
        let service = FlowService::new(provider, store, transport);
        Self { config, service }
    }
}
