//! Configuration management for the config store
//!
//! Settings are read from environment variables with defaults suitable for
//! local development.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

pub const DEFAULT_DATABASE_URL: &str = "postgresql://localhost/platform";
pub const DEFAULT_MAX_CONNECTIONS: u32 = 10;
pub const DEFAULT_APPLY_RETRIES: u32 = 3;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum SettingsError {
    #[error("Invalid value for {key}: {reason}")]
    InvalidValue { key: &'static str, reason: String },
}

/// Which repository backs the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendType {
    Memory,
    Postgres,
}

impl FromStr for BackendType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "memory" => Ok(BackendType::Memory),
            "postgres" | "postgresql" => Ok(BackendType::Postgres),
            other => Err(format!("unknown backend '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub backend_type: BackendType,
    pub database_url: String,
    pub max_connections: u32,
    /// Extra attempts `apply` makes after losing an optimistic version race
    pub apply_retries: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            backend_type: BackendType::Postgres,
            database_url: DEFAULT_DATABASE_URL.to_string(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            apply_retries: DEFAULT_APPLY_RETRIES,
        }
    }
}

impl Settings {
    /// Load from the process environment
    pub fn from_env() -> Result<Self, SettingsError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load using `lookup` to resolve variables (unset keys keep defaults)
    pub fn from_lookup<F>(lookup: F) -> Result<Self, SettingsError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = Self::default();

        if let Some(backend) = lookup("CONFIG_STORE_BACKEND") {
            settings.backend_type =
                backend
                    .parse()
                    .map_err(|reason| SettingsError::InvalidValue {
                        key: "CONFIG_STORE_BACKEND",
                        reason,
                    })?;
        }
        if let Some(url) = lookup("DATABASE_URL") {
            settings.database_url = url;
        }
        if let Some(value) = lookup("DATABASE_MAX_CONNECTIONS") {
            settings.max_connections = parse_number("DATABASE_MAX_CONNECTIONS", &value)?;
        }
        if let Some(value) = lookup("CONFIG_APPLY_RETRIES") {
            settings.apply_retries = parse_number("CONFIG_APPLY_RETRIES", &value)?;
        }

        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.max_connections == 0 {
            return Err(SettingsError::InvalidValue {
                key: "DATABASE_MAX_CONNECTIONS",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.backend_type == BackendType::Postgres && self.database_url.trim().is_empty() {
            return Err(SettingsError::InvalidValue {
                key: "DATABASE_URL",
                reason: "required for the postgres backend".to_string(),
            });
        }
        Ok(())
    }
}

fn parse_number(key: &'static str, value: &str) -> Result<u32, SettingsError> {
    value
        .trim()
        .parse()
        .map_err(|e: std::num::ParseIntError| SettingsError::InvalidValue {
            key,
            reason: e.to_string(),
        })
}
