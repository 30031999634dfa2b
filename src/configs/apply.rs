//! Applying patches to an application's config

use crate::service::ConfigStore;
use platform_config_models::{AppRef, ConfigError, ConfigRecord, ConfigResult, NewConfig, Patch};
use tracing::{info, warn};

impl ConfigStore {
    /// Merge `patch` into the current config of `app` and persist the result
    /// as the next version.
    ///
    /// The new record is built on the version that was read; if another writer
    /// inserted that version first, the current config is re-read and the
    /// patch re-merged, up to the configured number of retries.
    pub async fn apply(&self, app: &AppRef, patch: &Patch) -> ConfigResult<ConfigRecord> {
        let _lane = self.lanes.acquire(app).await;
        let mut attempt = 0;

        loop {
            let prev = self.resolve_current(app).await?;
            let merged = prev.vars.merge(patch);

            match self.insert_record(NewConfig::successor(&prev, merged)).await {
                Ok(record) => {
                    info!(
                        app = %app,
                        base_version = prev.version,
                        version = record.version,
                        changed = patch.len(),
                        "Applied config patch"
                    );
                    return Ok(record);
                }
                Err(ConfigError::Conflict { version, .. }) if attempt < self.apply_retries => {
                    attempt += 1;
                    warn!(
                        app = %app,
                        version,
                        attempt,
                        "Config changed concurrently, retrying patch"
                    );
                }
                Err(e) => {
                    if matches!(e, ConfigError::Conflict { .. }) {
                        warn!(app = %app, attempts = attempt + 1, "Giving up on config patch");
                    }
                    return Err(e);
                }
            }
        }
    }
}
