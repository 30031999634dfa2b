//! PostgreSQL storage backend implementation

mod configs;
mod rows;

use crate::{ConfigRepository, HstoreCodec, VarsCodec};
use async_trait::async_trait;
use platform_config_models::{AppRef, ConfigError, ConfigId, ConfigRecord, ConfigResult, NewConfig};
use sqlx::{postgres::PgPoolOptions, PgPool, Postgres};
use tracing::info;

/// PostgreSQL config repository
pub struct PostgresConfigRepository<C: VarsCodec = HstoreCodec> {
    pool: PgPool,
    codec: C,
}

impl PostgresConfigRepository<HstoreCodec> {
    /// Connect, run pending migrations and use the `hstore` codec
    pub async fn connect(database_url: &str, max_connections: u32) -> ConfigResult<Self> {
        info!("Connecting to PostgreSQL database...");

        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .map_err(|e| ConfigError::storage(format!("Failed to connect to PostgreSQL: {}", e)))?;

        info!("Successfully connected to PostgreSQL");

        let repo = Self::with_codec(pool, HstoreCodec);
        repo.migrate().await?;
        Ok(repo)
    }

    /// Wrap an existing pool; migrations are the caller's responsibility
    pub fn new(pool: PgPool) -> Self {
        Self::with_codec(pool, HstoreCodec)
    }
}

impl<C: VarsCodec> PostgresConfigRepository<C> {
    pub fn with_codec(pool: PgPool, codec: C) -> Self {
        Self { pool, codec }
    }

    /// Get the underlying database connection pool
    pub fn get_db_pool(&self) -> &PgPool {
        &self.pool
    }

    /// Apply embedded migrations; sqlx only runs the ones not yet applied
    pub async fn migrate(&self) -> ConfigResult<()> {
        if let Err(e) = sqlx::migrate!("./migrations").run(&self.pool).await {
            // Concurrent startups race on the migrations table
            if e.to_string().contains("already exists") || e.to_string().contains("duplicate") {
                info!("Skipping migrations (likely already applied or concurrent execution)");
            } else {
                return Err(ConfigError::storage(format!(
                    "Failed to run migrations: {}",
                    e
                )));
            }
        } else {
            info!("Database migrations completed");
        }
        Ok(())
    }
}

#[async_trait]
impl<C> ConfigRepository for PostgresConfigRepository<C>
where
    C: VarsCodec,
    C::Column: for<'q> sqlx::Encode<'q, Postgres>
        + for<'r> sqlx::Decode<'r, Postgres>
        + sqlx::Type<Postgres>,
{
    async fn insert(&self, config: NewConfig) -> ConfigResult<ConfigRecord> {
        self.insert_config_impl(config).await
    }

    async fn find_by_id(&self, id: ConfigId) -> ConfigResult<Option<ConfigRecord>> {
        self.find_config_by_id_impl(id).await
    }

    async fn find_latest(&self, app: &AppRef) -> ConfigResult<Option<ConfigRecord>> {
        self.find_latest_config_impl(app).await
    }

    async fn history(&self, app: &AppRef, limit: Option<u32>) -> ConfigResult<Vec<ConfigRecord>> {
        self.config_history_impl(app, limit).await
    }

    async fn count(&self, app: &AppRef) -> ConfigResult<u64> {
        self.count_configs_impl(app).await
    }
}
