use super::credentials;
use super::payload::{ClientMetadata, Item};
use super::transport::{HttpTransport, Transport};
use super::{DEFAULT_ENDPOINT, Reporter, RollbarLevel};
use crate::reliability::{RetryConfig, RetryPolicy};
use parking_lot::{Condvar, Mutex};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, SyncSender, TrySendError};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error("Failed to spawn delivery worker: {0}")]
    WorkerSpawn(#[source] std::io::Error),
    #[error("Delivery worker stopped before becoming ready")]
    Closed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryMode {
    Sync,
    Async,
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub endpoint: String,
    pub timeout: Duration,
    /// Items buffered for the worker. In async mode messages beyond this are dropped.
    pub queue_capacity: usize,
    pub retry: RetryConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout: Duration::from_secs(5),
            queue_capacity: 1000,
            retry: RetryConfig::default(),
        }
    }
}

struct Job {
    item: Item,
    ack: Option<mpsc::Sender<()>>,
}

#[derive(Default)]
struct Pending {
    count: Mutex<usize>,
    drained: Condvar,
}

impl Pending {
    fn add(&self) {
        *self.count.lock() += 1;
    }

    fn done(&self) {
        let mut count = self.count.lock();
        *count = count.saturating_sub(1);
        if *count == 0 {
            self.drained.notify_all();
        }
    }

    fn wait(&self) {
        let mut count = self.count.lock();
        while *count > 0 {
            self.drained.wait(&mut count);
        }
    }
}

/// Rollbar API client backed by one delivery worker thread.
///
/// Dropping the client closes the queue and joins the worker, which finishes the items already
/// queued first.
pub struct RollbarClient {
    mode: DeliveryMode,
    metadata: ClientMetadata,
    queue: Mutex<Option<SyncSender<Job>>>,
    queue_capacity: usize,
    pending: Arc<Pending>,
    worker: Option<JoinHandle<()>>,
}

impl RollbarClient {
    pub fn new(
        mode: DeliveryMode,
        metadata: ClientMetadata,
        config: ClientConfig,
    ) -> Result<Self, ClientError> {
        let endpoint = config.endpoint.clone();
        let timeout = config.timeout;
        // The blocking HTTP client is built on the worker so it never lives on a caller's
        // async runtime thread.
        Self::spawn(mode, metadata, &config, move || {
            HttpTransport::new(&endpoint, timeout)
        })
    }

    pub fn new_sync(metadata: ClientMetadata) -> Result<Self, ClientError> {
        Self::new(DeliveryMode::Sync, metadata, ClientConfig::default())
    }

    pub fn new_async(metadata: ClientMetadata) -> Result<Self, ClientError> {
        Self::new(DeliveryMode::Async, metadata, ClientConfig::default())
    }

    /// Builds a client that delivers through `transport` instead of HTTP.
    pub fn with_transport<T: Transport>(
        mode: DeliveryMode,
        metadata: ClientMetadata,
        config: ClientConfig,
        transport: T,
    ) -> Result<Self, ClientError> {
        Self::spawn(mode, metadata, &config, move || Ok(transport))
    }

    fn spawn<T, F>(
        mode: DeliveryMode,
        metadata: ClientMetadata,
        config: &ClientConfig,
        make_transport: F,
    ) -> Result<Self, ClientError>
    where
        T: Transport,
        F: FnOnce() -> Result<T, ClientError> + Send + 'static,
    {
        if config.queue_capacity == 0 {
            return Err(ClientError::InvalidConfiguration(
                "Queue capacity must be greater than 0".to_string(),
            ));
        }

        let (queue, jobs) = mpsc::sync_channel::<Job>(config.queue_capacity);
        let (ready_tx, ready_rx) = mpsc::channel::<Result<(), ClientError>>();
        let pending = Arc::new(Pending::default());
        let worker_pending = Arc::clone(&pending);
        let policy = RetryPolicy::new(config.retry.clone());

        let worker = thread::Builder::new()
            .name("rollbar-worker".to_string())
            .spawn(move || {
                let transport = match make_transport() {
                    Ok(transport) => {
                        let _ = ready_tx.send(Ok(()));
                        transport
                    }
                    Err(e) => {
                        let _ = ready_tx.send(Err(e));
                        return;
                    }
                };
                run_worker(&transport, &jobs, &worker_pending, &policy);
            })
            .map_err(ClientError::WorkerSpawn)?;

        match ready_rx.recv() {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                let _ = worker.join();
                return Err(e);
            }
            Err(_) => {
                let _ = worker.join();
                return Err(ClientError::Closed);
            }
        }

        Ok(Self {
            mode,
            metadata,
            queue: Mutex::new(Some(queue)),
            queue_capacity: config.queue_capacity,
            pending,
            worker: Some(worker),
        })
    }

    pub fn mode(&self) -> DeliveryMode {
        self.mode
    }

    pub fn metadata(&self) -> &ClientMetadata {
        &self.metadata
    }

    /// Messages handed over but not yet processed by the worker.
    pub fn pending_count(&self) -> usize {
        *self.pending.count.lock()
    }

    fn access_token(&self) -> Option<String> {
        if self.metadata.token.is_empty() {
            credentials::registered_token().filter(|token| !token.is_empty())
        } else {
            Some(self.metadata.token.clone())
        }
    }

    fn enqueue(&self, job: Job) {
        let Some(queue) = self.queue.lock().clone() else {
            warn!("Rollbar client is closed, dropping item");
            return;
        };

        self.pending.add();
        match self.mode {
            DeliveryMode::Async => match queue.try_send(job) {
                Ok(()) => {}
                Err(TrySendError::Full(_)) => {
                    self.pending.done();
                    warn!(
                        capacity = self.queue_capacity,
                        "Rollbar queue is full, dropping item"
                    );
                }
                Err(TrySendError::Disconnected(_)) => {
                    self.pending.done();
                    warn!("Rollbar delivery worker stopped, dropping item");
                }
            },
            DeliveryMode::Sync => {
                let (ack_tx, ack_rx) = mpsc::channel();
                let job = Job {
                    ack: Some(ack_tx),
                    ..job
                };
                if queue.send(job).is_err() {
                    self.pending.done();
                    warn!("Rollbar delivery worker stopped, dropping item");
                    return;
                }
                let _ = ack_rx.recv();
            }
        }
    }
}

impl Reporter for RollbarClient {
    fn message(&self, level: RollbarLevel, text: &str) {
        let Some(token) = self.access_token() else {
            warn!("No Rollbar access token registered, dropping item");
            return;
        };
        let item = Item::message(token, &self.metadata, level, text);
        self.enqueue(Job { item, ack: None });
    }

    fn wait(&self) {
        self.pending.wait();
    }
}

impl Drop for RollbarClient {
    fn drop(&mut self) {
        self.queue.lock().take();
        if let Some(worker) = self.worker.take()
            && worker.join().is_err()
        {
            warn!("Rollbar delivery worker panicked");
        }
    }
}

impl std::fmt::Debug for RollbarClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RollbarClient")
            .field("mode", &self.mode)
            .field("environment", &self.metadata.environment)
            .field("queue_capacity", &self.queue_capacity)
            .field("pending", &self.pending_count())
            .finish()
    }
}

fn run_worker<T: Transport>(
    transport: &T,
    jobs: &Receiver<Job>,
    pending: &Pending,
    policy: &RetryPolicy,
) {
    for job in jobs {
        deliver(transport, &job.item, policy);
        if let Some(ack) = job.ack {
            let _ = ack.send(());
        }
        pending.done();
    }
}

fn deliver<T: Transport>(transport: &T, item: &Item, policy: &RetryPolicy) {
    let mut attempts = 0;
    loop {
        attempts += 1;
        match transport.post(item) {
            Ok(()) => {
                debug!(uuid = %item.data.uuid, level = %item.data.level, "Rollbar item delivered");
                return;
            }
            Err(e) if e.is_retryable() && policy.should_retry(attempts) => {
                let delay = policy.calculate_delay(attempts - 1);
                warn!(
                    uuid = %item.data.uuid,
                    attempt = attempts,
                    error = %e,
                    delay_ms = delay.as_millis() as u64,
                    "Rollbar delivery failed, retrying"
                );
                thread::sleep(delay);
            }
            Err(e) => {
                warn!(
                    uuid = %item.data.uuid,
                    attempts,
                    error = %e,
                    "Rollbar delivery failed, dropping item"
                );
                return;
            }
        }
    }
}
