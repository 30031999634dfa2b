//! Config creation operations

use crate::service::ConfigStore;
use platform_config_models::{AppRef, ConfigError, ConfigRecord, ConfigResult, NewConfig, Vars};
use tracing::{info, warn};

impl ConfigStore {
    /// Persist a new immutable config record.
    ///
    /// `config.version` must be the next version of the app's history (1 for
    /// an empty one); any other version is a `Conflict`. Storage failures are
    /// returned unchanged.
    pub async fn create(&self, config: NewConfig) -> ConfigResult<ConfigRecord> {
        config.validate()?;
        let _lane = self.lanes.acquire(&config.app).await;

        let next = self.next_version(&config.app).await?;
        if config.version != next {
            warn!(
                app = %config.app,
                version = config.version,
                expected = next,
                "Rejected out of sequence config version"
            );
            return Err(ConfigError::Conflict {
                app: config.app.to_string(),
                version: config.version,
            });
        }

        self.insert_record(config).await
    }

    /// Persist `vars` as the next version of `app`'s config
    pub async fn create_for(&self, app: &AppRef, vars: Vars) -> ConfigResult<ConfigRecord> {
        let _lane = self.lanes.acquire(app).await;

        let version = self.next_version(app).await?;
        self.insert_record(NewConfig {
            app: app.clone(),
            version,
            vars,
        })
        .await
    }

    async fn next_version(&self, app: &AppRef) -> ConfigResult<u64> {
        Ok(self
            .repo
            .find_latest(app)
            .await?
            .map(|latest| latest.version + 1)
            .unwrap_or(1))
    }

    pub(crate) async fn insert_record(&self, config: NewConfig) -> ConfigResult<ConfigRecord> {
        let record = self.repo.insert(config).await?;

        info!(
            config_id = %record.id,
            app = %record.app,
            version = record.version,
            vars = record.vars.len(),
            "Created config"
        );

        Ok(record)
    }
}
