//! Progress reporting for segmentation runs.
//!
//! The engine publishes [`ProgressEvent`]s without being coupled to the
//! transport (WebSocket, logging, etc.). Publishing never blocks: when the
//! channel is full the event is dropped.

use rallycut_models::ProgressEvent;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Default channel capacity.
pub const DEFAULT_CAPACITY: usize = 32;

/// Progress sender shared by the stages of one run.
///
/// Percent values are forced to be non-decreasing across clones.
#[derive(Clone)]
pub struct ProgressSender {
    tx: mpsc::Sender<ProgressEvent>,
    last_percent: Arc<AtomicU8>,
}

impl ProgressSender {
    /// Create a new progress sender.
    pub fn new(tx: mpsc::Sender<ProgressEvent>) -> Self {
        Self {
            tx,
            last_percent: Arc::new(AtomicU8::new(0)),
        }
    }

    /// Send a progress event (non-blocking).
    pub fn send(&self, event: ProgressEvent) {
        // Use try_send to avoid blocking; drop events if channel is full
        let _ = self.tx.try_send(event);
    }

    /// Publish a percentage and message. Values below the last published
    /// percentage are raised to it.
    pub fn update(&self, percent: u8, message: impl Into<String>) {
        let percent = percent.min(100);
        let previous = self.last_percent.fetch_max(percent, Ordering::AcqRel);
        self.send(ProgressEvent::progress(percent.max(previous), message));
    }

    /// Last published percentage.
    pub fn percent(&self) -> u8 {
        self.last_percent.load(Ordering::Acquire)
    }

    /// Send the final 100% event.
    pub fn complete(&self, message: impl Into<String>) {
        self.update(100, message);
    }

    /// Send failed event.
    pub fn failed(&self, error: impl Into<String>) {
        self.send(ProgressEvent::failed(error));
    }
}

/// Progress receiver for collecting events.
pub struct ProgressReceiver {
    rx: mpsc::Receiver<ProgressEvent>,
}

impl ProgressReceiver {
    /// Receive the next progress event.
    pub async fn recv(&mut self) -> Option<ProgressEvent> {
        self.rx.recv().await
    }

    /// Try to receive a progress event without blocking.
    pub fn try_recv(&mut self) -> Option<ProgressEvent> {
        self.rx.try_recv().ok()
    }
}

/// Create a progress channel pair with the given capacity.
pub fn channel(capacity: usize) -> (ProgressSender, ProgressReceiver) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (ProgressSender::new(tx), ProgressReceiver { rx })
}
