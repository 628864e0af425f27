use super::{Config, ConfigError};
use url::Url;

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        // A missing credential cannot be recovered from
        if self.token.trim().is_empty() {
            return Err(ConfigError::InvalidConfig(
                "Rollbar access token must not be empty".to_string(),
            ));
        }

        let endpoint = Url::parse(&self.endpoint).map_err(|e| {
            ConfigError::InvalidUrl(format!("Invalid endpoint URL '{}': {}", self.endpoint, e))
        })?;
        if !matches!(endpoint.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidUrl(format!(
                "Endpoint URL '{}' must use http or https",
                self.endpoint
            )));
        }

        if self.timeout.is_zero() {
            return Err(ConfigError::InvalidConfig(
                "Timeout must be greater than 0".to_string(),
            ));
        }

        if self.queue_capacity == 0 {
            return Err(ConfigError::InvalidConfig(
                "Queue capacity must be greater than 0".to_string(),
            ));
        }

        if self.retry.max_attempts == 0 {
            return Err(ConfigError::InvalidConfig(
                "Retry max attempts must be greater than 0".to_string(),
            ));
        }

        if self.retry.base_delay > self.retry.max_delay {
            return Err(ConfigError::InvalidConfig(format!(
                "Retry base delay ({:?}) must not exceed max delay ({:?})",
                self.retry.base_delay, self.retry.max_delay
            )));
        }

        Ok(())
    }
}
