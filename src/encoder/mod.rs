//! Entry encoders.
//!
//! An encoder renders an [`Entry`](crate::domain::Entry) plus its fields into a byte buffer. It also
//! carries the context fields accumulated through `Core::with`, which is why encoders are cloned
//! per derived core instead of shared.

pub mod console;

pub use console::{ConsoleEncoder, EncoderConfig, TimeFormat};

use crate::domain::{Entry, Field};
use bytes::BytesMut;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EncodeError {
    #[error("Failed to encode field '{key}': {reason}")]
    Field { key: String, reason: String },
    #[error("JSON encoding error: {0}")]
    Json(#[from] serde_json::Error),
}

pub trait Encoder: Send + Sync {
    /// Adds a field to the encoder's accumulated context.
    fn add_field(&mut self, field: Field);

    /// Deep copy, including accumulated context.
    fn clone_encoder(&self) -> Box<dyn Encoder>;

    /// Renders `entry` with the accumulated context followed by `fields`.
    fn encode_entry(&self, entry: &Entry, fields: &[Field]) -> Result<BytesMut, EncodeError>;
}
