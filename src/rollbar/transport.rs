use super::client::ClientError;
use super::payload::Item;
use reqwest::blocking::Client;
use std::time::Duration;
use thiserror::Error;
use url::Url;

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("HTTP error: {status} - {message}")]
    Http { status: u16, message: String },
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl TransportError {
    /// Rate limiting, server errors, timeouts and connection failures are worth another attempt.
    pub fn is_retryable(&self) -> bool {
        match self {
            TransportError::Http { status, .. } => *status == 429 || *status >= 500,
            TransportError::Network(e) => e.is_timeout() || e.is_connect(),
            TransportError::Serialization(_) => false,
        }
    }
}

/// Delivers one item to the Rollbar API. Called only from the client's worker thread.
pub trait Transport: Send + 'static {
    fn post(&self, item: &Item) -> Result<(), TransportError>;
}

#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    endpoint: Url,
}

impl HttpTransport {
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self, ClientError> {
        let endpoint: Url = endpoint.parse().map_err(|e| {
            ClientError::InvalidConfiguration(format!("Invalid endpoint URL: {}", e))
        })?;

        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("rask-rollbar/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| {
                ClientError::InvalidConfiguration(format!("Failed to build HTTP client: {}", e))
            })?;

        Ok(Self { client, endpoint })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

impl Transport for HttpTransport {
    fn post(&self, item: &Item) -> Result<(), TransportError> {
        let body = serde_json::to_vec(item)?;
        let response = self
            .client
            .post(self.endpoint.clone())
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body)
            .send()?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(TransportError::Http {
                status: status.as_u16(),
                message: response.text().unwrap_or_default(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_invalid_endpoint() {
        let result = HttpTransport::new("not a url", Duration::from_secs(1));
        assert!(matches!(result, Err(ClientError::InvalidConfiguration(_))));
    }

    #[test]
    fn test_retryable_statuses() {
        let http = |status| TransportError::Http {
            status,
            message: String::new(),
        };
        assert!(http(429).is_retryable());
        assert!(http(500).is_retryable());
        assert!(http(503).is_retryable());
        assert!(!http(400).is_retryable());
        assert!(!http(403).is_retryable());
    }
}
