//! Fixed-interval status polling for a single generation task.
//!
//! ## Lifecycle
//!
//! ```text
//! spawn ──(interval)──> request ──> incomplete ──(interval)──> request ...
//!                          │
//!                          ├──> transport error: logged, wait for next tick
//!                          └──> completed: delivered, loop ends
//! ```
//!
//! The loop also ends when the handle is cancelled or dropped. A request that is
//! already in flight is allowed to finish, but its result is discarded.

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use crate::api::IconBackend;
use crate::errors::PollError;
use crate::models::TaskStatusResponse;

pub struct StatusPoller;

impl StatusPoller {
    /// Start polling `task_id` every `interval`.
    ///
    /// The first request is issued one full interval after spawning.
    /// Must be called from within a tokio runtime.
    pub fn spawn(
        backend: Arc<dyn IconBackend>,
        task_id: &str,
        interval: Duration,
    ) -> Result<PollHandle, PollError> {
        if task_id.trim().is_empty() {
            return Err(PollError::MissingTaskId);
        }
        if interval.is_zero() {
            return Err(PollError::InvalidInterval);
        }

        // One slot: an unread status holds the loop back instead of piling up.
        let (updates_tx, updates_rx) = mpsc::channel(1);
        let (cancel_tx, cancel_rx) = watch::channel(false);
        let attempts = Arc::new(AtomicU32::new(0));

        let join = tokio::spawn(poll_loop(
            backend,
            task_id.to_string(),
            interval,
            updates_tx,
            cancel_rx,
            attempts.clone(),
        ));

        tracing::debug!(task_id, interval_ms = interval.as_millis() as u64, "poller started");

        Ok(PollHandle {
            task_id: task_id.to_string(),
            updates: updates_rx,
            cancel_tx,
            attempts,
            join,
        })
    }
}

/// Owning handle to a running poller. Dropping it cancels the timer.
pub struct PollHandle {
    task_id: String,
    updates: mpsc::Receiver<TaskStatusResponse>,
    cancel_tx: watch::Sender<bool>,
    attempts: Arc<AtomicU32>,
    join: JoinHandle<()>,
}

impl PollHandle {
    pub fn task_id(&self) -> &str {
        &self.task_id
    }

    /// Number of status requests issued so far.
    pub fn attempts(&self) -> u32 {
        self.attempts.load(Ordering::SeqCst)
    }

    pub fn is_cancelled(&self) -> bool {
        *self.cancel_tx.borrow()
    }

    /// True until the loop has ended (terminal status, cancel or drop).
    pub fn is_active(&self) -> bool {
        !self.is_cancelled() && !self.join.is_finished()
    }

    /// Stop the recurring timer. Idempotent.
    pub fn cancel(&self) {
        if !self.cancel_tx.send_replace(true) {
            tracing::debug!(task_id = %self.task_id, "poller cancelled");
        }
    }

    /// Wait for the next successful status.
    ///
    /// Returns `None` once the poller has stopped and every delivered status
    /// has been consumed, or immediately after [`PollHandle::cancel`].
    pub async fn next(&mut self) -> Option<TaskStatusResponse> {
        if self.is_cancelled() {
            return None;
        }
        self.updates.recv().await
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

async fn poll_loop(
    backend: Arc<dyn IconBackend>,
    task_id: String,
    interval: Duration,
    updates: mpsc::Sender<TaskStatusResponse>,
    mut cancel: watch::Receiver<bool>,
    attempts: Arc<AtomicU32>,
) {
    let mut ticker = tokio::time::interval_at(Instant::now() + interval, interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            changed = cancel.changed() => {
                if changed.is_err() || *cancel.borrow() {
                    break;
                }
                continue;
            }
        }
        if *cancel.borrow() {
            break;
        }

        let attempt = attempts.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::debug!(task_id = %task_id, attempt, "checking image status");

        match backend.check_image_status(&task_id).await {
            Ok(status) => {
                if *cancel.borrow() {
                    tracing::debug!(task_id = %task_id, "discarding status of cancelled poll");
                    break;
                }
                let completed = status.completed;
                tracing::debug!(task_id = %task_id, status = %status.status, completed, "status received");
                let delivered = tokio::select! {
                    sent = updates.send(status) => sent.is_ok(),
                    _ = cancel.changed() => false,
                };
                if !delivered {
                    break;
                }
                if completed {
                    tracing::info!(task_id = %task_id, attempt, "task reached terminal status");
                    break;
                }
            }
            Err(e) => {
                tracing::warn!(task_id = %task_id, attempt, "Error checking image status: {}", e);
            }
        }
    }
}
