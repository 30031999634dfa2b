//! Persistence for config records
//!
//! Backends implement [`ConfigRepository`]; the shape of the vars column is
//! delegated to a [`VarsCodec`] so the merge and store logic never see it.

use async_trait::async_trait;
use platform_config_models::{AppRef, ConfigId, ConfigRecord, ConfigResult, NewConfig};

mod codec;
pub use codec::*;

mod memory;
pub use memory::*;

mod postgres;
pub use postgres::*;

/// Storage backend for config histories
#[async_trait]
pub trait ConfigRepository: Send + Sync {
    /// Insert a new immutable record.
    ///
    /// Fails with `ConfigError::Conflict` if the application already has a
    /// record with the same version; existing rows are never overwritten.
    async fn insert(&self, config: NewConfig) -> ConfigResult<ConfigRecord>;

    async fn find_by_id(&self, id: ConfigId) -> ConfigResult<Option<ConfigRecord>>;

    /// Record with the highest version for `app`
    async fn find_latest(&self, app: &AppRef) -> ConfigResult<Option<ConfigRecord>>;

    /// Records for `app`, newest first
    async fn history(&self, app: &AppRef, limit: Option<u32>) -> ConfigResult<Vec<ConfigRecord>>;

    async fn count(&self, app: &AppRef) -> ConfigResult<u64>;
}
