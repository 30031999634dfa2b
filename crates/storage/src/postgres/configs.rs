//! Config record queries

use super::rows::{config_from_row, insert_error, CONFIG_COLUMNS};
use super::PostgresConfigRepository;
use crate::VarsCodec;
use platform_config_models::{AppRef, ConfigError, ConfigId, ConfigRecord, ConfigResult, NewConfig};
use sqlx::{Postgres, Row};
use tracing::debug;
use uuid::Uuid;

impl<C> PostgresConfigRepository<C>
where
    C: VarsCodec,
    C::Column: for<'q> sqlx::Encode<'q, Postgres>
        + for<'r> sqlx::Decode<'r, Postgres>
        + sqlx::Type<Postgres>,
{
    /// Insert a config row; `created_at` comes from the database clock
    pub async fn insert_config_impl(&self, config: NewConfig) -> ConfigResult<ConfigRecord> {
        config.validate()?;
        let id = Uuid::new_v4();
        let version = i64::try_from(config.version)
            .map_err(|_| ConfigError::codec(format!("version {} out of range", config.version)))?;
        let vars = self.codec.encode(&config.vars)?;

        let row = sqlx::query(
            r#"
            INSERT INTO configs (id, app_id, version, vars)
            VALUES ($1, $2, $3, $4)
            RETURNING created_at
            "#,
        )
        .bind(id)
        .bind(config.app.as_str())
        .bind(version)
        .bind(vars)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| insert_error(e, &config.app, config.version))?;

        let created_at = row.try_get("created_at").map_err(ConfigError::storage)?;

        debug!(
            config_id = %id,
            app = %config.app,
            version = config.version,
            codec = self.codec.name(),
            "Inserted config record"
        );

        Ok(config.into_record(id, created_at))
    }

    /// Look up a config by id
    pub async fn find_config_by_id_impl(&self, id: ConfigId) -> ConfigResult<Option<ConfigRecord>> {
        let sql = format!("SELECT {} FROM configs WHERE id = $1", CONFIG_COLUMNS);

        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(ConfigError::storage)?;

        row.map(|row| config_from_row(&self.codec, &row)).transpose()
    }

    /// Highest version for an application
    pub async fn find_latest_config_impl(
        &self,
        app: &AppRef,
    ) -> ConfigResult<Option<ConfigRecord>> {
        let sql = format!(
            "SELECT {} FROM configs WHERE app_id = $1 ORDER BY version DESC LIMIT 1",
            CONFIG_COLUMNS
        );

        let row = sqlx::query(&sql)
            .bind(app.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(ConfigError::storage)?;

        row.map(|row| config_from_row(&self.codec, &row)).transpose()
    }

    /// Records for an application, newest first
    pub async fn config_history_impl(
        &self,
        app: &AppRef,
        limit: Option<u32>,
    ) -> ConfigResult<Vec<ConfigRecord>> {
        let sql = format!(
            "SELECT {} FROM configs WHERE app_id = $1 ORDER BY version DESC LIMIT $2",
            CONFIG_COLUMNS
        );

        // LIMIT NULL means no limit
        let rows = sqlx::query(&sql)
            .bind(app.as_str())
            .bind(limit.map(i64::from))
            .fetch_all(&self.pool)
            .await
            .map_err(ConfigError::storage)?;

        rows.iter()
            .map(|row| config_from_row(&self.codec, row))
            .collect()
    }

    /// Number of records for an application
    pub async fn count_configs_impl(&self, app: &AppRef) -> ConfigResult<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM configs WHERE app_id = $1")
            .bind(app.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(ConfigError::storage)?;

        Ok(count.max(0) as u64)
    }
}
