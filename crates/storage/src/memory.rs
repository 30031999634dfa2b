//! In-memory config repository (tests, local runs)

use crate::{ConfigRepository, JsonCodec, VarsCodec};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use platform_config_models::{AppRef, ConfigError, ConfigId, ConfigRecord, ConfigResult, NewConfig};
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

/// Row as held at rest: vars stay encoded until read
#[derive(Debug, Clone)]
struct StoredConfig<T> {
    id: Uuid,
    app: AppRef,
    version: u64,
    vars: T,
    created_at: DateTime<Utc>,
}

#[derive(Debug)]
struct Tables<T> {
    // app -> version -> row
    histories: HashMap<AppRef, BTreeMap<u64, StoredConfig<T>>>,
    by_id: HashMap<Uuid, (AppRef, u64)>,
}

impl<T> Default for Tables<T> {
    fn default() -> Self {
        Self {
            histories: HashMap::new(),
            by_id: HashMap::new(),
        }
    }
}

/// In-memory config repository
pub struct MemoryConfigRepository<C: VarsCodec = JsonCodec> {
    codec: C,
    tables: RwLock<Tables<C::Column>>,
}

impl MemoryConfigRepository<JsonCodec> {
    pub fn new() -> Self {
        Self::with_codec(JsonCodec)
    }
}

impl Default for MemoryConfigRepository<JsonCodec> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: VarsCodec> MemoryConfigRepository<C> {
    pub fn with_codec(codec: C) -> Self {
        Self {
            codec,
            tables: RwLock::new(Tables::default()),
        }
    }

    fn materialize(&self, row: &StoredConfig<C::Column>) -> ConfigResult<ConfigRecord> {
        Ok(ConfigRecord {
            id: row.id,
            app: row.app.clone(),
            version: row.version,
            vars: self.codec.decode(row.vars.clone())?,
            created_at: row.created_at,
        })
    }
}

#[async_trait]
impl<C: VarsCodec> ConfigRepository for MemoryConfigRepository<C> {
    async fn insert(&self, config: NewConfig) -> ConfigResult<ConfigRecord> {
        config.validate()?;
        let encoded = self.codec.encode(&config.vars)?;
        let mut tables = self.tables.write().await;

        let history = tables.histories.entry(config.app.clone()).or_default();
        if history.contains_key(&config.version) {
            return Err(ConfigError::Conflict {
                app: config.app.to_string(),
                version: config.version,
            });
        }

        let row = StoredConfig {
            id: Uuid::new_v4(),
            app: config.app.clone(),
            version: config.version,
            vars: encoded,
            created_at: Utc::now(),
        };
        let record = config.into_record(row.id, row.created_at);

        history.insert(row.version, row);
        tables
            .by_id
            .insert(record.id, (record.app.clone(), record.version));

        debug!(
            config_id = %record.id,
            app = %record.app,
            version = record.version,
            codec = self.codec.name(),
            "Inserted config record"
        );

        Ok(record)
    }

    async fn find_by_id(&self, id: ConfigId) -> ConfigResult<Option<ConfigRecord>> {
        let tables = self.tables.read().await;
        let row = tables
            .by_id
            .get(&id)
            .and_then(|(app, version)| tables.histories.get(app)?.get(version));

        row.map(|row| self.materialize(row)).transpose()
    }

    async fn find_latest(&self, app: &AppRef) -> ConfigResult<Option<ConfigRecord>> {
        let tables = self.tables.read().await;
        let row = tables
            .histories
            .get(app)
            .and_then(|history| history.values().next_back());

        row.map(|row| self.materialize(row)).transpose()
    }

    async fn history(&self, app: &AppRef, limit: Option<u32>) -> ConfigResult<Vec<ConfigRecord>> {
        let tables = self.tables.read().await;
        let Some(history) = tables.histories.get(app) else {
            return Ok(vec![]);
        };

        let limit = limit.map(|l| l as usize).unwrap_or(usize::MAX);
        history
            .values()
            .rev()
            .take(limit)
            .map(|row| self.materialize(row))
            .collect()
    }

    async fn count(&self, app: &AppRef) -> ConfigResult<u64> {
        let tables = self.tables.read().await;
        Ok(tables
            .histories
            .get(app)
            .map(|history| history.len() as u64)
            .unwrap_or(0))
    }
}
