//! Configuration module for querymap.
//!
//! Handles the settings file and environment variable expansion.

mod settings;

pub use settings::{
    expand_env_vars, CryptoSettings, EngineSettings, QuerySettings, Settings, SettingsError,
};
