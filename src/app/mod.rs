pub mod config;
pub mod initialization;
pub mod logging_system;

pub use config::{Config, ConfigError};
pub use initialization::{InitializationError, LogDirective, LogLevel};
pub use logging_system::{LoggingGuard, LoggingSystem, install};
