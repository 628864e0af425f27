//! Domain layer for rask-rollbar.
//!
//! Contains the canonical types shared across all modules:
//! - `Level`: Façade severity (Debug/Info/Warn/Error/DPanic/Panic/Fatal)
//! - `Entry`: A single log entry as seen by a core
//! - `Field`: A typed key/value pair attached to an entry or accumulated by `with`
//! - `CoreError`: Top-level error type

pub mod entry;
pub mod error;
pub mod field;
pub mod level;

pub use entry::{Caller, Entry};
pub use error::CoreError;
pub use field::{Field, FieldValue};
pub use level::{Level, ParseLevelError};
