//! Severity-routing log sink.
//!
//! [`RollbarCore`] is a façade [`Core`] that renders entries with a private console encoder and
//! forwards warnings and anything more severe to Rollbar. Debug and info entries are rendered and
//! then dropped.

use crate::app::config::Config;
use crate::domain::{CoreError, Entry, Field, Level};
use crate::encoder::{ConsoleEncoder, EncoderConfig, Encoder};
use crate::facade::{CheckedEntry, Core, Discard, WriteSyncer};
use crate::rollbar::{
    ClientMetadata, DeliveryMode, Reporter, RollbarClient, RollbarLevel, credentials,
};
use std::sync::Arc;
use tracing::info;

/// Maps a façade level to the Rollbar severity it is reported at. `None` means the entry is not
/// reported.
pub fn rollbar_level(level: Level) -> Option<RollbarLevel> {
    match level {
        Level::Debug | Level::Info => None,
        Level::Warn => Some(RollbarLevel::Warning),
        Level::Error => Some(RollbarLevel::Error),
        Level::DPanic | Level::Panic | Level::Fatal => Some(RollbarLevel::Critical),
    }
}

pub struct RollbarCore {
    reporter: Arc<dyn Reporter>,
    encoder: Box<dyn Encoder>,
    output: Box<dyn WriteSyncer>,
}

impl RollbarCore {
    /// Registers `token` process-wide and starts a Rollbar client with the default endpoint.
    ///
    /// `synchronous` selects [`DeliveryMode::Sync`], where every reported entry blocks until its
    /// delivery attempt completes.
    pub fn new(
        token: &str,
        environment: &str,
        code_version: &str,
        server_host: &str,
        server_root: &str,
        synchronous: bool,
    ) -> Result<Self, CoreError> {
        if token.is_empty() {
            return Err(CoreError::Configuration("invalid token".to_string()));
        }

        credentials::register_token(token);

        let metadata =
            ClientMetadata::new(token, environment, code_version, server_host, server_root);
        let client = if synchronous {
            RollbarClient::new_sync(metadata)?
        } else {
            RollbarClient::new_async(metadata)?
        };

        Ok(Self::with_reporter(Arc::new(client)))
    }

    /// Like [`RollbarCore::new`], taking endpoint, timeout, queue and retry settings from `config`.
    pub fn from_config(config: &Config) -> Result<Self, CoreError> {
        config
            .validate()
            .map_err(|e| CoreError::Configuration(e.to_string()))?;

        credentials::register_token(config.token.as_str());

        let mode = if config.synchronous {
            DeliveryMode::Sync
        } else {
            DeliveryMode::Async
        };
        let client = RollbarClient::new(mode, config.client_metadata(), config.client_config())?;
        info!(
            environment = %config.environment,
            mode = ?mode,
            endpoint = %config.endpoint,
            "Rollbar reporting enabled"
        );

        Ok(Self::with_reporter(Arc::new(client)))
    }

    /// Builds a core around an existing reporter. No token is registered.
    pub fn with_reporter(reporter: Arc<dyn Reporter>) -> Self {
        Self {
            reporter,
            encoder: Box::new(ConsoleEncoder::new(EncoderConfig::default())),
            output: Box::new(Discard),
        }
    }

    pub fn reporter(&self) -> &Arc<dyn Reporter> {
        &self.reporter
    }
}

impl Core for RollbarCore {
    /// Compares `level` with itself, so every level is enabled. There is no minimum level on this
    /// core; filtering happens through [`rollbar_level`] in `write`.
    fn enabled(&self, level: Level) -> bool {
        level.enabled(level)
    }

    fn with(&self, fields: &[Field]) -> Box<dyn Core> {
        let mut encoder = self.encoder.clone_encoder();
        for field in fields {
            field.add_to(encoder.as_mut());
        }
        Box::new(RollbarCore {
            reporter: Arc::clone(&self.reporter),
            encoder,
            output: Box::new(Discard),
        })
    }

    fn check<'a>(&'a self, entry: &Entry, checked: CheckedEntry<'a>) -> CheckedEntry<'a> {
        if self.enabled(entry.level) {
            checked.add_core(entry, self)
        } else {
            checked
        }
    }

    fn write(&self, entry: &Entry, fields: &[Field]) -> Result<(), CoreError> {
        let buf = self.encoder.encode_entry(entry, fields)?;

        if let Some(level) = rollbar_level(entry.level) {
            self.reporter.message(level, &String::from_utf8_lossy(&buf));
        }

        Ok(())
    }

    fn sync(&self) -> Result<(), CoreError> {
        self.reporter.wait();
        Ok(self.output.sync()?)
    }
}
