pub mod serde_helpers;
mod validation;

use crate::app::initialization::LogLevel;
use crate::reliability::RetryConfig;
use crate::rollbar::{ClientConfig, ClientMetadata, DEFAULT_ENDPOINT};
use serde::{Deserialize, Serialize};
use serde_helpers::{load_env_millis, load_env_string, load_env_var};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("File error: {0}")]
    FileError(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Environment error: {0}")]
    EnvError(String),
}

/// Settings for the Rollbar sink and the logging pipeline around it.
///
/// Loaded from TOML, from `ROLLBAR_*` environment variables, or both (environment wins).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub token: String,
    pub environment: String,
    pub code_version: String,
    pub server_host: String,
    pub server_root: String,
    /// Block each reported entry until its delivery attempt completes.
    pub synchronous: bool,
    pub endpoint: String,
    #[serde(with = "serde_helpers")]
    pub timeout: Duration,
    pub queue_capacity: usize,
    pub log_level: LogLevel,
    pub retry: RetryConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            token: String::new(),
            environment: "development".to_string(),
            code_version: String::new(),
            server_host: detect_hostname(),
            server_root: String::new(),
            synchronous: false,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout: Duration::from_secs(5),
            queue_capacity: 1000,
            log_level: LogLevel::Info,
            retry: RetryConfig::default(),
        }
    }
}

fn detect_hostname() -> String {
    hostname::get()
        .ok()
        .and_then(|name| name.into_string().ok())
        .unwrap_or_default()
}

impl Config {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds a config from defaults plus the variables `lookup` resolves.
    pub fn from_lookup<L>(lookup: L) -> Result<Self, ConfigError>
    where
        L: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();
        config.apply_env(&lookup)?;
        config.validate()?;
        Ok(config)
    }

    /// Overrides fields with the `ROLLBAR_*` and `LOG_LEVEL` variables `lookup` resolves.
    pub fn apply_env<L>(&mut self, lookup: &L) -> Result<(), ConfigError>
    where
        L: Fn(&str) -> Option<String>,
    {
        load_env_string(lookup, "ROLLBAR_TOKEN", &mut self.token);
        load_env_string(lookup, "ROLLBAR_ENVIRONMENT", &mut self.environment);
        load_env_string(lookup, "ROLLBAR_CODE_VERSION", &mut self.code_version);
        load_env_string(lookup, "ROLLBAR_SERVER_HOST", &mut self.server_host);
        load_env_string(lookup, "ROLLBAR_SERVER_ROOT", &mut self.server_root);
        load_env_var(lookup, "ROLLBAR_SYNC", &mut self.synchronous)?;
        load_env_string(lookup, "ROLLBAR_ENDPOINT", &mut self.endpoint);
        load_env_millis(lookup, "ROLLBAR_TIMEOUT_MS", &mut self.timeout)?;
        load_env_var(lookup, "ROLLBAR_QUEUE_CAPACITY", &mut self.queue_capacity)?;
        load_env_var(lookup, "LOG_LEVEL", &mut self.log_level)?;
        Ok(())
    }

    pub fn client_metadata(&self) -> ClientMetadata {
        ClientMetadata::new(
            self.token.as_str(),
            self.environment.as_str(),
            self.code_version.as_str(),
            self.server_host.as_str(),
            self.server_root.as_str(),
        )
    }

    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            endpoint: self.endpoint.clone(),
            timeout: self.timeout,
            queue_capacity: self.queue_capacity,
            retry: self.retry.clone(),
        }
    }
}
