#![allow(dead_code)]

use parking_lot::{Condvar, Mutex};
use rask_rollbar::rollbar::{Item, Transport, TransportError};
use std::sync::Arc;
use std::time::Duration;

/// Transport that keeps every posted item. Can be held closed to simulate a slow API.
#[derive(Clone, Default)]
pub struct RecordingTransport {
    pub items: Arc<Mutex<Vec<Item>>>,
    gate: Arc<(Mutex<bool>, Condvar)>,
    delay: Option<Duration>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Blocks every `post` until [`RecordingTransport::open`] is called.
    pub fn closed() -> Self {
        let transport = Self::default();
        *transport.gate.0.lock() = true;
        transport
    }

    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    pub fn open(&self) {
        let (closed, released) = &*self.gate;
        *closed.lock() = false;
        released.notify_all();
    }

    pub fn bodies(&self) -> Vec<String> {
        self.items
            .lock()
            .iter()
            .map(|item| item.data.body.message.body.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.items.lock().len()
    }
}

impl Transport for RecordingTransport {
    fn post(&self, item: &Item) -> Result<(), TransportError> {
        {
            let (closed, released) = &*self.gate;
            let mut closed = closed.lock();
            while *closed {
                released.wait(&mut closed);
            }
        }
        if let Some(delay) = self.delay {
            std::thread::sleep(delay);
        }
        self.items.lock().push(item.clone());
        Ok(())
    }
}
