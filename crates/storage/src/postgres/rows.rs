//! Database row conversion for the configs table

use crate::VarsCodec;
use chrono::{DateTime, Utc};
use platform_config_models::{AppRef, ConfigError, ConfigRecord, ConfigResult};
use sqlx::{postgres::PgRow, Postgres, Row};
use uuid::Uuid;

pub(super) const CONFIG_COLUMNS: &str = "id, app_id, version, vars, created_at";

/// Decode one `configs` row, running the vars column through `codec`
pub(super) fn config_from_row<C>(codec: &C, row: &PgRow) -> ConfigResult<ConfigRecord>
where
    C: VarsCodec,
    C::Column: for<'r> sqlx::Decode<'r, Postgres> + sqlx::Type<Postgres>,
{
    let id: Uuid = row.try_get("id").map_err(ConfigError::storage)?;
    let app_id: String = row.try_get("app_id").map_err(ConfigError::storage)?;
    let version: i64 = row.try_get("version").map_err(ConfigError::storage)?;
    let vars: C::Column = row.try_get("vars").map_err(ConfigError::storage)?;
    let created_at: DateTime<Utc> = row.try_get("created_at").map_err(ConfigError::storage)?;

    let version = u64::try_from(version).map_err(|_| {
        ConfigError::codec(format!("negative version {} for config {}", version, id))
    })?;

    Ok(ConfigRecord {
        id,
        app: AppRef::new(app_id).map_err(ConfigError::codec)?,
        version,
        vars: codec.decode(vars)?,
        created_at,
    })
}

/// Map a sqlx error, turning `(app_id, version)` unique violations into conflicts
pub(super) fn insert_error(err: sqlx::Error, app: &AppRef, version: u64) -> ConfigError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => ConfigError::Conflict {
            app: app.to_string(),
            version,
        },
        _ => ConfigError::storage(err),
    }
}
