//! Config store service implementation

use crate::lanes::AppLanes;
use platform_config_models::ConfigResult;
use platform_config_settings::{BackendType, Settings, DEFAULT_APPLY_RETRIES};
use platform_config_storage::{ConfigRepository, MemoryConfigRepository, PostgresConfigRepository};
use std::sync::Arc;
use tracing::info;

/// Config store for managing per-application config histories
pub struct ConfigStore {
    pub(crate) repo: Arc<dyn ConfigRepository>,
    pub(crate) lanes: AppLanes,
    pub(crate) apply_retries: u32,
}

impl ConfigStore {
    /// Create a store over any repository
    pub fn new(repo: Arc<dyn ConfigRepository>) -> Self {
        Self {
            repo,
            lanes: AppLanes::default(),
            apply_retries: DEFAULT_APPLY_RETRIES,
        }
    }

    /// Create a store with in-memory storage
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryConfigRepository::new()))
    }

    /// Build the backend selected by `settings`
    pub async fn from_settings(settings: &Settings) -> ConfigResult<Self> {
        let repo: Arc<dyn ConfigRepository> = match settings.backend_type {
            BackendType::Memory => {
                info!("Using in-memory config storage");
                Arc::new(MemoryConfigRepository::new())
            }
            BackendType::Postgres => Arc::new(
                PostgresConfigRepository::connect(
                    &settings.database_url,
                    settings.max_connections,
                )
                .await?,
            ),
        };

        Ok(Self::new(repo).with_apply_retries(settings.apply_retries))
    }

    /// Number of re-reads `apply` performs after losing a version race
    pub fn with_apply_retries(mut self, retries: u32) -> Self {
        self.apply_retries = retries;
        self
    }

    pub fn repository(&self) -> &Arc<dyn ConfigRepository> {
        &self.repo
    }
}
