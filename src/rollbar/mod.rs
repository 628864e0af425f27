//! Rollbar client.
//!
//! [`RollbarClient`] posts message items to the Rollbar item API from a dedicated worker thread.
//! In [`DeliveryMode::Async`] a message is queued and the call returns; in
//! [`DeliveryMode::Sync`] the call returns once the worker has finished with the item.
//! [`Reporter`] is the narrow contract the log sink depends on.

pub mod client;
pub mod credentials;
pub mod level;
pub mod payload;
pub mod transport;

pub use client::{ClientConfig, ClientError, DeliveryMode, RollbarClient};
pub use level::RollbarLevel;
pub use payload::{ClientMetadata, Item};
pub use transport::{HttpTransport, Transport, TransportError};

#[cfg(test)]
use mockall::automock;

pub const DEFAULT_ENDPOINT: &str = "https://api.rollbar.com/api/1/item/";

/// Remote reporting handle shared by every core derived from one construction.
#[cfg_attr(test, automock)]
pub trait Reporter: Send + Sync {
    /// Sends `text` at `level`. Delivery failures are not reported to the caller.
    fn message(&self, level: RollbarLevel, text: &str);

    /// Blocks until every message handed to `message` so far has been processed.
    fn wait(&self);
}
