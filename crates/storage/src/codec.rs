//! Encoding of resolved vars into a sparse key/optional-value column
//!
//! Every present key is written with a value; absent keys are never written.
//! On read, an entry without a value (written by external tooling) decodes to
//! an empty string rather than to an absent key.

use platform_config_models::{ConfigError, ConfigResult, VarName, Vars};
use serde_json::{Map, Value as JsonValue};
use sqlx::postgres::types::PgHstore;
use std::collections::BTreeMap;

/// Bidirectional codec between [`Vars`] and a storage column type
pub trait VarsCodec: Send + Sync + 'static {
    type Column: Clone + Send + Sync + 'static;

    /// Short name used in logs
    fn name(&self) -> &'static str;

    fn encode(&self, vars: &Vars) -> ConfigResult<Self::Column>;

    fn decode(&self, column: Self::Column) -> ConfigResult<Vars>;
}

/// PostgreSQL `hstore` codec
#[derive(Debug, Clone, Copy, Default)]
pub struct HstoreCodec;

impl VarsCodec for HstoreCodec {
    type Column = PgHstore;

    fn name(&self) -> &'static str {
        "hstore"
    }

    fn encode(&self, vars: &Vars) -> ConfigResult<PgHstore> {
        let map: BTreeMap<String, Option<String>> = vars
            .iter()
            .map(|(name, value)| (name.to_string(), Some(value.clone())))
            .collect();
        Ok(PgHstore(map))
    }

    fn decode(&self, column: PgHstore) -> ConfigResult<Vars> {
        column
            .0
            .into_iter()
            .map(|(key, value)| {
                let name = VarName::new(key).map_err(ConfigError::codec)?;
                Ok((name, value.unwrap_or_default()))
            })
            .collect()
    }
}

/// JSON object codec; the default encoding for in-memory rows
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl VarsCodec for JsonCodec {
    type Column = JsonValue;

    fn name(&self) -> &'static str {
        "json"
    }

    fn encode(&self, vars: &Vars) -> ConfigResult<JsonValue> {
        let map: Map<String, JsonValue> = vars
            .iter()
            .map(|(name, value)| (name.to_string(), JsonValue::String(value.clone())))
            .collect();
        Ok(JsonValue::Object(map))
    }

    fn decode(&self, column: JsonValue) -> ConfigResult<Vars> {
        let map = match column {
            JsonValue::Object(map) => map,
            other => {
                return Err(ConfigError::codec(format!(
                    "expected a JSON object, got {}",
                    other
                )))
            }
        };

        map.into_iter()
            .map(|(key, value)| {
                let name = VarName::new(key).map_err(ConfigError::codec)?;
                let value = match value {
                    JsonValue::String(s) => s,
                    JsonValue::Null => String::new(),
                    other => {
                        return Err(ConfigError::codec(format!(
                            "value of {} is not a string: {}",
                            name, other
                        )))
                    }
                };
                Ok((name, value))
            })
            .collect()
    }
}
