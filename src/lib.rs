//! Versioned config var store
//!
//! Every change to an application's environment produces a new immutable
//! [`ConfigRecord`]; the current configuration is the record with the highest
//! version for that application.

mod configs;
mod lanes;
mod service;

pub use service::ConfigStore;

pub use platform_config_models::{
    merge, AppRef, ConfigError, ConfigId, ConfigRecord, ConfigResult, NewConfig, Patch, VarName,
    Vars,
};
pub use platform_config_settings::{BackendType, Settings};
pub use platform_config_storage::{
    ConfigRepository, HstoreCodec, JsonCodec, MemoryConfigRepository, PostgresConfigRepository,
    VarsCodec,
};
