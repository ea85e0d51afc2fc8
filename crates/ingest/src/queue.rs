//! Reading Queue - bounded-trigger buffer of pending readings
//!
//! Producers append under a short mutex; the drain worker swaps the
//! whole buffer out and processes it with no lock held.
//!
//! # Design
//!
//! - The flush signal is a `Notify` distinct from the buffer mutex, so
//!   a producer never blocks the waiter and the waiter never holds the
//!   buffer lock while parked (the signal keeps its own atomicity)
//! - A stored permit means a signal sent between two waits is not lost
//! - Once closed, enqueues are rejected; readings accepted before the
//!   close are drained by the shutdown path

use inlet_protocol::Reading;
use parking_lot::Mutex;
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;

use crate::{IngestError, IngestResult};

#[cfg(test)]
#[path = "queue_test.rs"]
mod tests;

#[derive(Debug, Default)]
struct QueueInner {
    readings: Vec<Reading>,
    closed: bool,
}

/// Thread-safe buffer of pending readings with flush signalling
#[derive(Debug)]
pub struct ReadingQueue {
    inner: Mutex<QueueInner>,
    threshold: usize,
    flush: Notify,
}

impl ReadingQueue {
    /// Create a queue with the given flush threshold
    pub fn new(threshold: usize) -> Self {
        Self {
            inner: Mutex::new(QueueInner::default()),
            threshold: threshold.max(1),
            flush: Notify::new(),
        }
    }

    /// Append one reading
    ///
    /// Signals the flush condition when the buffer reaches the
    /// threshold. Rejected once the queue is closed.
    pub fn enqueue(&self, reading: Reading) -> IngestResult<()> {
        let signal = {
            let mut inner = self.inner.lock();
            if inner.closed {
                return Err(IngestError::ShuttingDown);
            }
            inner.readings.push(reading);
            inner.readings.len() >= self.threshold
        };
        if signal {
            self.flush.notify_one();
        }
        Ok(())
    }

    /// Append many readings; the signal rule is evaluated once at the end
    pub fn enqueue_batch(&self, readings: Vec<Reading>) -> IngestResult<()> {
        let signal = {
            let mut inner = self.inner.lock();
            if inner.closed {
                return Err(IngestError::ShuttingDown);
            }
            inner.readings.extend(readings);
            inner.readings.len() >= self.threshold
        };
        if signal {
            self.flush.notify_one();
        }
        Ok(())
    }

    /// Re-insert a failed batch at the front of the buffer
    ///
    /// These readings were accepted before the failure, so the closed
    /// flag does not apply; order relative to later enqueues is
    /// preserved.
    pub fn prepend(&self, mut readings: Vec<Reading>) {
        let mut inner = self.inner.lock();
        readings.append(&mut inner.readings);
        inner.readings = readings;
    }

    /// Block until the flush condition is signalled, the timeout
    /// elapses, or cancellation is requested
    ///
    /// Returns immediately if cancellation was requested before the
    /// call. Spurious returns are tolerated by the caller.
    pub async fn wait_for_flush(&self, timeout: std::time::Duration, cancel: &CancellationToken) {
        if cancel.is_cancelled() {
            return;
        }
        tokio::select! {
            _ = self.flush.notified() => {}
            _ = tokio::time::sleep(timeout) => {}
            _ = cancel.cancelled() => {}
        }
    }

    /// Atomically exchange the buffer with a fresh empty one
    pub fn swap_out(&self) -> Vec<Reading> {
        std::mem::take(&mut self.inner.lock().readings)
    }

    /// Number of buffered readings
    pub fn len(&self) -> usize {
        self.inner.lock().readings.len()
    }

    /// Check whether the buffer is empty
    pub fn is_empty(&self) -> bool {
        self.inner.lock().readings.is_empty()
    }

    /// Reject further enqueues and signal the flush condition once
    pub fn close(&self) {
        self.inner.lock().closed = true;
        self.flush.notify_one();
    }

    /// Check whether the queue has been closed
    pub fn is_closed(&self) -> bool {
        self.inner.lock().closed
    }
}
