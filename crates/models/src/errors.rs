use thiserror::Error;

/// Config store errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Config not found: {id}")]
    NotFound { id: String },

    #[error("Invalid variable name {name:?}: {reason}")]
    InvalidVarName { name: String, reason: String },

    #[error("Invalid application reference: {reason}")]
    InvalidApp { reason: String },

    #[error("Invalid patch: {reason}")]
    InvalidPatch { reason: String },

    #[error("Invalid config version {version}: {reason}")]
    InvalidVersion { version: u64, reason: String },

    #[error("Config version conflict: version {version} is not available for {app}")]
    Conflict { app: String, version: u64 },

    #[error("Storage error: {reason}")]
    Storage { reason: String },

    #[error("Codec error: {reason}")]
    Codec { reason: String },
}

impl ConfigError {
    /// Get HTTP status code for the error
    pub fn status_code(&self) -> u16 {
        match self {
            ConfigError::NotFound { .. } => 404,
            ConfigError::InvalidVarName { .. } => 400,
            ConfigError::InvalidApp { .. } => 400,
            ConfigError::InvalidPatch { .. } => 400,
            ConfigError::InvalidVersion { .. } => 400,
            ConfigError::Conflict { .. } => 409,
            ConfigError::Storage { .. } => 500,
            ConfigError::Codec { .. } => 500,
        }
    }

    /// Check if error is retryable
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ConfigError::Conflict { .. } | ConfigError::Storage { .. }
        )
    }

    /// Get error category
    pub fn category(&self) -> &'static str {
        match self {
            ConfigError::NotFound { .. } => "resource",
            ConfigError::InvalidVarName { .. } => "validation",
            ConfigError::InvalidApp { .. } => "validation",
            ConfigError::InvalidPatch { .. } => "validation",
            ConfigError::InvalidVersion { .. } => "validation",
            ConfigError::Conflict { .. } => "conflict",
            ConfigError::Storage { .. } => "storage",
            ConfigError::Codec { .. } => "serialization",
        }
    }

    pub fn storage(reason: impl std::fmt::Display) -> Self {
        ConfigError::Storage {
            reason: reason.to_string(),
        }
    }

    pub fn codec(reason: impl std::fmt::Display) -> Self {
        ConfigError::Codec {
            reason: reason.to_string(),
        }
    }
}

/// Result type alias for config store operations
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Error response for API endpoints
#[derive(Debug, serde::Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub code: u16,
    pub retryable: bool,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl From<ConfigError> for ErrorResponse {
    fn from(err: ConfigError) -> Self {
        Self {
            error: err.category().to_string(),
            message: err.to_string(),
            code: err.status_code(),
            retryable: err.is_retryable(),
            timestamp: chrono::Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conflict_maps_to_409_and_is_retryable() {
        let err = ConfigError::Conflict {
            app: "acme".to_string(),
            version: 3,
        };
        assert_eq!(err.status_code(), 409);
        assert!(err.is_retryable());
        assert_eq!(err.category(), "conflict");
    }

    #[test]
    fn test_invalid_version_is_validation() {
        let err = ConfigError::InvalidVersion {
            version: 0,
            reason: "versions start at 1".to_string(),
        };
        assert_eq!(err.status_code(), 400);
        assert!(!err.is_retryable());
        assert_eq!(err.category(), "validation");
    }

    #[test]
    fn test_error_response_from_not_found() {
        let response = ErrorResponse::from(ConfigError::NotFound {
            id: "abc".to_string(),
        });
        assert_eq!(response.code, 404);
        assert!(!response.retryable);
        assert_eq!(response.message, "Config not found: abc");
    }
}
