//! Process start-up for logging: `tracing` subscriber plus Rollbar reporting.
//!
//! [`install`] is the one place that registers the Rollbar token for the process. Call it before
//! building any other Rollbar client that relies on the registered token.

use super::config::Config;
use super::initialization::{InitializationError, LogDirective, LogLevel};
use crate::domain::CoreError;
use crate::facade::{Core, CoreLayer};
use crate::rollbar::credentials;
use crate::sink::RollbarCore;
use parking_lot::RwLock;
use std::sync::Arc;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

pub struct LoggingSystem {
    directives: Arc<RwLock<Vec<LogDirective>>>,
    fallback_level: LogLevel,
}

impl LoggingSystem {
    pub fn new() -> Self {
        Self {
            directives: Arc::new(RwLock::new(Vec::new())),
            fallback_level: LogLevel::Info,
        }
    }

    /// Adds a `target=level` directive. An unknown level falls back to the default level and a
    /// malformed directive is skipped; both are reported on stderr.
    pub fn add_directive(&self, directive_str: &str) -> Result<(), InitializationError> {
        match LogDirective::parse(directive_str) {
            Ok(directive) => {
                self.directives.write().push(directive);
                Ok(())
            }
            Err(InitializationError::InvalidLogLevel { .. }) => {
                eprintln!("Warning: invalid level in '{directive_str}', using default level");
                let target = directive_str.split('=').next().unwrap_or_default().trim();
                self.directives
                    .write()
                    .push(LogDirective::new(target, self.fallback_level));
                Ok(())
            }
            Err(e) if e.is_recoverable() => {
                eprintln!("Warning: {e}, skipping directive");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// Keeps HTTP and TLS internals quiet; their events are excluded from Rollbar anyway.
    pub fn add_default_directives(&self) {
        let default_directives = [
            ("hyper", LogLevel::Warn),
            ("hyper_util", LogLevel::Warn),
            ("reqwest", LogLevel::Warn),
            ("h2", LogLevel::Warn),
            ("rustls", LogLevel::Warn),
        ];

        let mut directives = self.directives.write();
        for (target, level) in default_directives {
            directives.push(LogDirective::new(target, level));
        }
    }

    pub fn build_filter_string(&self, default_level: LogLevel) -> String {
        let directives = self.directives.read();

        let mut filter_parts = Vec::with_capacity(directives.len() + 1);
        filter_parts.push(default_level.as_str().to_string());
        filter_parts.extend(directives.iter().map(LogDirective::to_filter_string));

        filter_parts.join(",")
    }

    pub fn directive_count(&self) -> usize {
        self.directives.read().len()
    }

    pub fn clear_directives(&self) {
        self.directives.write().clear();
    }

    /// Registers the Rollbar token, builds the Rollbar core and installs the global subscriber:
    /// `EnvFilter` + compact console output + [`CoreLayer`].
    pub fn install(&self, config: &Config) -> Result<LoggingGuard, InitializationError> {
        config
            .validate()
            .map_err(|e| InitializationError::ConfigValidationFailed {
                reason: e.to_string(),
            })?;

        credentials::register_token(config.token.as_str());

        let rollbar = RollbarCore::from_config(config).map_err(|e| {
            InitializationError::ResourceInitFailed {
                resource: "rollbar client".to_string(),
                source: Box::new(e),
            }
        })?;
        let core: Arc<dyn Core> = Arc::new(rollbar);

        let filter_string = self.build_filter_string(config.log_level);
        let env_filter = EnvFilter::try_new(&filter_string).map_err(|e| {
            InitializationError::LoggingInitFailed {
                details: format!("Failed to create EnvFilter with '{}'", filter_string),
                source: Box::new(e),
            }
        })?;

        let subscriber = tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_level(true)
                    .compact(),
            )
            .with(CoreLayer::new(Arc::clone(&core)));

        tracing::subscriber::set_global_default(subscriber).map_err(|e| {
            InitializationError::LoggingInitFailed {
                details: "Failed to set global tracing subscriber".to_string(),
                source: Box::new(e),
            }
        })?;

        Ok(LoggingGuard { core })
    }
}

impl Default for LoggingSystem {
    fn default() -> Self {
        Self::new()
    }
}

/// Keeps the installed core reachable; dropping it waits for pending Rollbar deliveries.
pub struct LoggingGuard {
    core: Arc<dyn Core>,
}

impl LoggingGuard {
    pub fn core(&self) -> &Arc<dyn Core> {
        &self.core
    }

    /// Blocks until every reported entry has been processed.
    pub fn flush(&self) -> Result<(), CoreError> {
        self.core.sync()
    }
}

impl Drop for LoggingGuard {
    fn drop(&mut self) {
        if let Err(e) = self.core.sync() {
            eprintln!("Failed to flush Rollbar core: {e}");
        }
    }
}

/// Installs logging with the default quiet directives.
pub fn install(config: &Config) -> Result<LoggingGuard, InitializationError> {
    let logging_system = LoggingSystem::new();
    logging_system.add_default_directives();
    logging_system.install(config)
}
