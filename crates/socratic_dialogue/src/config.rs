//! `config.yaml` loading.

use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub const DEFAULT_CONFIG_PATH: &str = "config.yaml";

/// Advisory word-count bounds injected into every system prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResponseLength {
    pub min: u32,
    pub max: u32,
}

impl Default for ResponseLength {
    fn default() -> Self {
        Self { min: 10, max: 50 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub ai_model_name: String,
    pub temperature: f64,
    pub previous_context_messages: usize,
    pub response_length: ResponseLength,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ai_model_name: "gpt-4o-mini".to_string(),
            temperature: 1.0,
            previous_context_messages: 3,
            response_length: ResponseLength::default(),
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.temperature.is_finite() || !(0.0..=2.0).contains(&self.temperature) {
            return Err(ConfigError::Temperature(self.temperature));
        }
        if self.response_length.min > self.response_length.max {
            return Err(ConfigError::ResponseLength {
                min: self.response_length.min,
                max: self.response_length.max,
            });
        }
        Ok(())
    }

    /// One-line summary printed after loading, `key: value | ...`.
    pub fn summary(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ai_model_name: {} | temperature: {:?} | previous_context_messages: {} | response_length: {{min: {}, max: {}}} | ",
            self.ai_model_name,
            self.temperature,
            self.previous_context_messages,
            self.response_length.min,
            self.response_length.max,
        )
    }
}

/// Parses config YAML. An empty document yields the defaults.
pub fn parse_config(contents: &str, path: &Path) -> Result<Config, ConfigError> {
    let parse_error = |source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    };

    let value: serde_yaml::Value = serde_yaml::from_str(contents).map_err(parse_error)?;
    warn_unknown_keys(&value, path);
    let config = if value.is_null() {
        Config::default()
    } else {
        serde_yaml::from_value(value).map_err(parse_error)?
    };

    config.validate()?;
    Ok(config)
}

const KNOWN_KEYS: [&str; 4] = [
    "ai_model_name",
    "temperature",
    "previous_context_messages",
    "response_length",
];

/// Keys outside [`KNOWN_KEYS`] are ignored; they are only reported.
fn warn_unknown_keys(value: &serde_yaml::Value, path: &Path) {
    let Some(mapping) = value.as_mapping() else {
        return;
    };
    for key in mapping.keys() {
        let name = key.as_str().unwrap_or("<non-string key>");
        if !KNOWN_KEYS.contains(&name) {
            tracing::warn!(key = name, path = %path.display(), "ignoring unknown config key");
        }
    }
}

/// Loads the config at `path`; a missing file yields the defaults.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(source) if source.kind() == ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Config::default());
        }
        Err(source) => {
            return Err(ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    parse_config(&contents, path)
}
