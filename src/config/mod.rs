//! Configuration module for schemascope.
//!
//! Handles connection configuration, environment variables, and worker settings.

mod settings;

pub use settings::{
    expand_env_vars, ConnectionSettings, PoolSettings, Settings, SettingsError, WorkerSettings,
    CONFIG_ENV_VAR,
};
