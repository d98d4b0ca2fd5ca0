//! Wire types shared by the backend client, the poller and the view.

use serde::{Deserialize, Serialize};

/// Repository metadata as reported by the backend or GitHub.
///
/// The backend forwards GitHub values that may be null, so everything except
/// the name is optional.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoInfo {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub stars: Option<u64>,
    /// Not sent by the backend; filled by the GitHub lookup.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
}

/// Body of `POST /api/generate-repo-icon`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateIconRequest {
    pub url: String,
}

/// Response of `POST /api/generate-repo-icon`: the newly enqueued task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateIconResponse {
    pub task_id: String,
    pub prompt: String,
    pub repo_info: RepoInfo,
}

/// Error reported by the backend inside a completed status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskError {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl TaskError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: Some(code.into()),
            message: Some(message.into()),
        }
    }

    pub fn display_message(&self) -> &str {
        self.message.as_deref().unwrap_or("Unknown error")
    }
}

/// Response of `GET /api/check-image-status/{task_id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskStatusResponse {
    pub status: String,
    pub completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<TaskError>,
}

/// Where a task stands, derived from its latest status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TaskOutcome {
    Pending,
    Image { url: String },
    Failed { error: TaskError },
}

impl TaskOutcome {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, TaskOutcome::Pending)
    }
}

impl TaskStatusResponse {
    /// Classify this status.
    ///
    /// An error wins over an image URL. A completed status carrying neither
    /// is treated as a failure so the task still reaches a terminal state.
    pub fn outcome(&self) -> TaskOutcome {
        if !self.completed {
            return TaskOutcome::Pending;
        }
        if let Some(error) = &self.error {
            return TaskOutcome::Failed {
                error: error.clone(),
            };
        }
        match &self.image_url {
            Some(url) => TaskOutcome::Image { url: url.clone() },
            None => TaskOutcome::Failed {
                error: TaskError::new("MissingImage", "Task completed without an image URL"),
            },
        }
    }
}
