//! Immutable, versioned configuration snapshots

use crate::{ConfigError, ConfigResult, Vars};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

const MAX_APP_REF_LEN: usize = 255;

/// Stable reference to the application that owns a config history
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AppRef(String);

impl AppRef {
    pub fn new(name: impl Into<String>) -> ConfigResult<Self> {
        let name = name.into().trim().to_string();
        if name.is_empty() {
            return Err(ConfigError::InvalidApp {
                reason: "application name is empty".to_string(),
            });
        }
        if name.len() > MAX_APP_REF_LEN {
            return Err(ConfigError::InvalidApp {
                reason: format!("application name exceeds {} bytes", MAX_APP_REF_LEN),
            });
        }
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AppRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for AppRef {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<AppRef> for String {
    fn from(app: AppRef) -> Self {
        app.0
    }
}

/// A persisted configuration snapshot. Never updated after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigRecord {
    pub id: Uuid,
    pub app: AppRef,
    /// Per-application sequence number, starting at 1
    pub version: u64,
    pub vars: Vars,
    pub created_at: DateTime<Utc>,
}

impl ConfigRecord {
    /// Digest of the resolved vars
    pub fn checksum(&self) -> String {
        self.vars.checksum()
    }
}

/// Insert payload for a new [`ConfigRecord`]; identity is assigned by storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewConfig {
    pub app: AppRef,
    pub version: u64,
    pub vars: Vars,
}

impl NewConfig {
    /// First record of an application's history: version 1, no vars
    pub fn initial(app: AppRef) -> Self {
        Self {
            app,
            version: 1,
            vars: Vars::default(),
        }
    }

    /// Record that follows `prev` in the same history
    pub fn successor(prev: &ConfigRecord, vars: Vars) -> Self {
        Self {
            app: prev.app.clone(),
            version: prev.version + 1,
            vars,
        }
    }

    /// Reject payloads no history can hold
    pub fn validate(&self) -> ConfigResult<()> {
        if self.version == 0 {
            return Err(ConfigError::InvalidVersion {
                version: 0,
                reason: "versions start at 1".to_string(),
            });
        }
        Ok(())
    }

    /// Materialize with the identity and timestamp assigned by storage
    pub fn into_record(self, id: Uuid, created_at: DateTime<Utc>) -> ConfigRecord {
        ConfigRecord {
            id,
            app: self.app,
            version: self.version,
            vars: self.vars,
            created_at,
        }
    }
}
