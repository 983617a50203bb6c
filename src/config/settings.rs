//! TOML-based configuration for querymap.
//!
//! Supports a config file (querymap.toml) with environment variable expansion.
//!
//! Example configuration:
//! ```toml
//! [engine]
//! dialect = "postgres"
//!
//! [query]
//! uppercase_automatically = true
//! order_by_with_lower = false
//! prefix_param = false
//! prefix_length = 5
//! page_size = 500
//!
//! [crypto]
//! key = "${QUERYMAP_CRYPTO_KEY}"
//! ```

use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::crypto::{CryptoError, TextCipher};
use crate::dialect::Dialect;
use crate::query::BuilderOptions;

/// Error type for settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid crypto key: {0}")]
    InvalidKey(#[from] CryptoError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub engine: EngineSettings,
    pub query: QuerySettings,
    pub crypto: CryptoSettings,
}

/// Engine configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// SQL dialect (postgres, sqlserver, oracle, db2).
    pub dialect: Dialect,
}

/// Query builder defaults.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct QuerySettings {
    pub uppercase_automatically: bool,
    pub order_by_with_lower: bool,
    pub prefix_param: bool,
    pub prefix_length: usize,

    /// Rows fetched per page when iterating large result sets.
    pub page_size: u64,
}

impl Default for QuerySettings {
    fn default() -> Self {
        let options = BuilderOptions::default();
        Self {
            uppercase_automatically: options.uppercase_automatically,
            order_by_with_lower: options.order_by_with_lower,
            prefix_param: options.prefix_param,
            prefix_length: options.prefix_length,
            page_size: 500,
        }
    }
}

/// Encrypted-column configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CryptoSettings {
    /// Base64 AES-256 key (supports ${ENV_VAR} expansion).
    pub key: Option<String>,
}

impl Settings {
    /// Load settings from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SettingsError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, SettingsError> {
        let settings: Settings = toml::from_str(content)?;
        if settings.query.page_size == 0 {
            return Err(SettingsError::InvalidConfig(
                "query.page_size must be positive".to_string(),
            ));
        }
        Ok(settings)
    }

    /// Builder options matching the `[query]` section.
    pub fn builder_options(&self) -> BuilderOptions {
        BuilderOptions {
            uppercase_automatically: self.query.uppercase_automatically,
            order_by_with_lower: self.query.order_by_with_lower,
            prefix_param: self.query.prefix_param,
            prefix_length: self.query.prefix_length,
            ..BuilderOptions::default()
        }
    }

    /// Cipher for encrypted columns, if a key is configured.
    pub fn cipher(&self) -> Result<Option<TextCipher>, SettingsError> {
        let Some(key) = &self.crypto.key else {
            return Ok(None);
        };
        let key = expand_env_vars(key)?;
        Ok(Some(TextCipher::from_encoded_key(key.trim())?))
    }
}

/// Expand environment variables in a string.
///
/// Supports `${VAR}` and `$VAR` syntax.
pub fn expand_env_vars(s: &str) -> Result<String, SettingsError> {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '$' {
            result.push(c);
            continue;
        }

        let var_name: String = if chars.next_if_eq(&'{').is_some() {
            let name: String = std::iter::from_fn(|| chars.next_if(|&ch| ch != '}')).collect();
            chars.next(); // consume '}'
            name
        } else {
            std::iter::from_fn(|| chars.next_if(|&ch| ch.is_alphanumeric() || ch == '_')).collect()
        };

        if var_name.is_empty() {
            // Just a lone $, keep it
            result.push('$');
            continue;
        }
        let value =
            env::var(&var_name).map_err(|_| SettingsError::MissingEnvVar(var_name.clone()))?;
        result.push_str(&value);
    }

    Ok(result)
}
