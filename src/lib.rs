// Specific pedantic lints enforced (not blanket allow):
#![deny(
    clippy::explicit_iter_loop,
    clippy::manual_let_else,
    clippy::semicolon_if_nothing_returned,
    clippy::inconsistent_struct_constructor
)]
// Noisy pedantic lints suppressed with justification:
#![allow(
    clippy::cast_possible_truncation, // Millisecond durations fit in u64
    clippy::missing_errors_doc,       // Error enums are documented at their definition
    clippy::missing_panics_doc,       // Internal API
    clippy::module_name_repetitions,  // e.g. RollbarLevel in rollbar module
    clippy::must_use_candidate,       // Annotated selectively on critical APIs
    clippy::doc_markdown              // Internal API
)]

//! Structured-logging sink that forwards entries to Rollbar.
//!
//! [`RollbarCore`] implements the façade [`Core`] contract: warnings are reported as `warning`,
//! errors as `error` and the panic family as `critical`, while debug and info entries stay local.
//! [`app::install`] wires it into `tracing` for a whole process.

pub mod app;
pub mod domain;
pub mod encoder;
pub mod facade;
pub mod reliability;
pub mod rollbar;
pub mod sink;

pub use app::{Config, install};
pub use domain::{Caller, CoreError, Entry, Field, FieldValue, Level};
pub use encoder::{ConsoleEncoder, EncodeError, Encoder};
pub use facade::{CheckedEntry, Core, CoreLayer, IoCore, Tee};
pub use rollbar::{DeliveryMode, RollbarClient, RollbarLevel};
pub use sink::{RollbarCore, rollbar_level};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
