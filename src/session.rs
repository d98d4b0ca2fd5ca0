//! Submission handler and per-task state machine.
//!
//! ```text
//! Idle ──submit──> Submitted ──ok──> Polling ──completed──> CompletedImage
//!   ^                  │                  │                  CompletedError
//!   └────── error ─────┘                  └── submit: previous poller cancelled,
//!                                             fresh Submitted cycle
//! ```
//!
//! An `IconSession` owns at most one [`PollHandle`]. A new submission, an
//! explicit [`IconSession::cancel`] and dropping the session all stop it.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

use crate::api::IconBackend;
use crate::errors::{InputError, PollError, SubmitError};
use crate::models::{GenerateIconResponse, TaskOutcome, TaskStatusResponse};
use crate::poller::{PollHandle, StatusPoller};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    Idle,
    Submitted,
    Polling,
    CompletedImage,
    CompletedError,
}

impl SessionPhase {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            SessionPhase::CompletedImage | SessionPhase::CompletedError
        )
    }
}

impl std::fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionPhase::Idle => write!(f, "idle"),
            SessionPhase::Submitted => write!(f, "submitted"),
            SessionPhase::Polling => write!(f, "polling"),
            SessionPhase::CompletedImage => write!(f, "completed-image"),
            SessionPhase::CompletedError => write!(f, "completed-error"),
        }
    }
}

/// Serializable view of a session, used for `--json` output.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub phase: SessionPhase,
    pub error: Option<String>,
    pub generation: Option<GenerateIconResponse>,
    pub status: Option<TaskStatusResponse>,
    pub outcome: Option<TaskOutcome>,
    pub poll_attempts: u32,
    pub submitted_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

/// Check that the input is a non-empty absolute URL with a host.
///
/// Mirrors a browser's `type=url required` validation: any scheme is
/// accepted, GitHub-specific checks are left to the backend.
pub fn validate_repo_url(input: &str) -> Result<String, InputError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(InputError::Empty);
    }
    let url = reqwest::Url::parse(trimmed).map_err(|e| InputError::InvalidUrl {
        input: trimmed.to_string(),
        reason: e.to_string(),
    })?;
    if !url.has_host() {
        return Err(InputError::InvalidUrl {
            input: trimmed.to_string(),
            reason: "URL has no host".to_string(),
        });
    }
    Ok(trimmed.to_string())
}

pub struct IconSession {
    backend: Arc<dyn IconBackend>,
    poll_interval: Duration,
    phase: SessionPhase,
    error: Option<String>,
    generation: Option<GenerateIconResponse>,
    status: Option<TaskStatusResponse>,
    poller: Option<PollHandle>,
    poll_attempts: u32,
    submitted_at: Option<DateTime<Utc>>,
    completed_at: Option<DateTime<Utc>>,
}

impl IconSession {
    pub fn new(backend: Arc<dyn IconBackend>, poll_interval: Duration) -> Self {
        Self {
            backend,
            poll_interval,
            phase: SessionPhase::Idle,
            error: None,
            generation: None,
            status: None,
            poller: None,
            poll_attempts: 0,
            submitted_at: None,
            completed_at: None,
        }
    }

    /// Submit a repository URL and start polling the resulting task.
    ///
    /// Invalid input or a zero poll interval is rejected without touching state
    /// or issuing a request.
    /// Otherwise the previous task (and its poller) is discarded first. A backend
    /// failure is kept as the displayable [`IconSession::error`] and also returned.
    pub async fn submit(&mut self, url: &str) -> Result<&GenerateIconResponse, SubmitError> {
        let url = validate_repo_url(url)?;
        if self.poll_interval.is_zero() {
            return Err(PollError::InvalidInterval.into());
        }

        self.reset();
        self.phase = SessionPhase::Submitted;
        self.submitted_at = Some(Utc::now());
        tracing::info!(url = %url, "submitting repository");

        match self.backend.generate_repo_icon(&url).await {
            Ok(generation) => {
                let poller = StatusPoller::spawn(
                    self.backend.clone(),
                    &generation.task_id,
                    self.poll_interval,
                );
                let poller = match poller {
                    Ok(poller) => poller,
                    Err(e) => {
                        self.phase = SessionPhase::Idle;
                        self.error = Some(e.to_string());
                        return Err(SubmitError::Poll(e));
                    }
                };
                tracing::info!(task_id = %generation.task_id, "generation task enqueued");
                self.poller = Some(poller);
                self.phase = SessionPhase::Polling;
                Ok(self.generation.insert(generation))
            }
            Err(e) => {
                tracing::info!("submission failed: {}", e);
                self.phase = SessionPhase::Idle;
                self.error = Some(e.display_message());
                Err(e.into())
            }
        }
    }

    /// Wait for and apply the next status of the active task.
    ///
    /// Returns `None` when nothing is polling.
    pub async fn next_update(&mut self) -> Option<TaskStatusResponse> {
        if self.phase != SessionPhase::Polling {
            return None;
        }
        let poller = self.poller.as_mut()?;
        let status = poller.next().await;
        self.poll_attempts = poller.attempts();
        let status = status?;
        self.apply_status(status.clone());
        Some(status)
    }

    /// Drive polling until the task reaches a terminal status.
    ///
    /// Returns `None` if polling stops first (cancelled or never started).
    pub async fn wait_for_outcome(&mut self) -> Option<TaskOutcome> {
        while let Some(status) = self.next_update().await {
            let outcome = status.outcome();
            if outcome.is_terminal() {
                return Some(outcome);
            }
        }
        None
    }

    /// Stop polling the current task. Stored results are kept.
    pub fn cancel(&mut self) {
        if let Some(poller) = self.poller.take() {
            self.poll_attempts = poller.attempts();
            poller.cancel();
        }
    }

    fn reset(&mut self) {
        if let Some(poller) = self.poller.take() {
            tracing::debug!(task_id = %poller.task_id(), "superseding previous task");
        }
        self.phase = SessionPhase::Idle;
        self.error = None;
        self.generation = None;
        self.status = None;
        self.poll_attempts = 0;
        self.submitted_at = None;
        self.completed_at = None;
    }

    fn apply_status(&mut self, status: TaskStatusResponse) {
        match status.outcome() {
            TaskOutcome::Pending => {}
            TaskOutcome::Image { .. } => self.finish(SessionPhase::CompletedImage),
            TaskOutcome::Failed { error } => {
                tracing::info!(code = ?error.code, "task failed: {}", error.display_message());
                self.finish(SessionPhase::CompletedError);
            }
        }
        self.status = Some(status);
    }

    fn finish(&mut self, phase: SessionPhase) {
        self.phase = phase;
        self.completed_at = Some(Utc::now());
        self.cancel();
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// Submission error message, if the last submission failed.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn generation(&self) -> Option<&GenerateIconResponse> {
        self.generation.as_ref()
    }

    pub fn status(&self) -> Option<&TaskStatusResponse> {
        self.status.as_ref()
    }

    pub fn outcome(&self) -> Option<TaskOutcome> {
        self.status.as_ref().map(TaskStatusResponse::outcome)
    }

    /// True while the creation request is outstanding.
    pub fn is_loading(&self) -> bool {
        self.phase == SessionPhase::Submitted
    }

    pub fn is_polling(&self) -> bool {
        self.poller.as_ref().is_some_and(PollHandle::is_active)
    }

    pub fn poll_attempts(&self) -> u32 {
        self.poller
            .as_ref()
            .map_or(self.poll_attempts, PollHandle::attempts)
    }

    pub fn elapsed(&self) -> Option<chrono::Duration> {
        let start = self.submitted_at?;
        Some(self.completed_at.unwrap_or_else(Utc::now) - start)
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            phase: self.phase,
            error: self.error.clone(),
            generation: self.generation.clone(),
            status: self.status.clone(),
            outcome: self.outcome(),
            poll_attempts: self.poll_attempts(),
            submitted_at: self.submitted_at,
            completed_at: self.completed_at,
        }
    }
}
