//! Config lookup operations

use crate::service::ConfigStore;
use platform_config_models::{AppRef, ConfigError, ConfigId, ConfigRecord, ConfigResult, NewConfig};
use tracing::{debug, info};

impl ConfigStore {
    /// Look up a config by id; `None` when no record matches
    pub async fn find_by_id(&self, id: ConfigId) -> ConfigResult<Option<ConfigRecord>> {
        self.repo.find_by_id(id).await
    }

    /// Look up a config by id, failing with `NotFound` when absent
    pub async fn get(&self, id: ConfigId) -> ConfigResult<ConfigRecord> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| ConfigError::NotFound { id: id.to_string() })
    }

    /// Current config for `app`, creating an empty first version if the
    /// application has none yet
    pub async fn current(&self, app: &AppRef) -> ConfigResult<ConfigRecord> {
        if let Some(latest) = self.repo.find_latest(app).await? {
            return Ok(latest);
        }

        let _lane = self.lanes.acquire(app).await;
        self.resolve_current(app).await
    }

    /// Records for `app`, newest first
    pub async fn history(
        &self,
        app: &AppRef,
        limit: Option<u32>,
    ) -> ConfigResult<Vec<ConfigRecord>> {
        self.repo.history(app, limit).await
    }

    /// Number of records in `app`'s history
    pub async fn count(&self, app: &AppRef) -> ConfigResult<u64> {
        self.repo.count(app).await
    }

    /// Latest record or a freshly bootstrapped one. Caller holds the lane.
    pub(crate) async fn resolve_current(&self, app: &AppRef) -> ConfigResult<ConfigRecord> {
        if let Some(latest) = self.repo.find_latest(app).await? {
            return Ok(latest);
        }

        match self.insert_record(NewConfig::initial(app.clone())).await {
            Ok(record) => {
                info!(app = %app, config_id = %record.id, "Bootstrapped empty config");
                Ok(record)
            }
            // Another process bootstrapped first
            Err(ConfigError::Conflict { .. }) => {
                debug!(app = %app, "Lost bootstrap race, re-reading current config");
                self.repo
                    .find_latest(app)
                    .await?
                    .ok_or_else(|| ConfigError::Storage {
                        reason: format!("config for {} conflicted but cannot be read", app),
                    })
            }
            Err(e) => Err(e),
        }
    }
}
