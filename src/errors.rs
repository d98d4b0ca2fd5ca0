//! Typed error hierarchy for repoicon.
//!
//! One enum per subsystem:
//! - `InputError`: user input rejected before any request is sent
//! - `ApiError`: icon backend transport and server failures
//! - `SubmitError`: either of the above, as returned by a submission
//! - `GitHubError`: repository metadata lookups
//! - `ConfigError`: configuration loading and validation
//! - `PollError`: status poller construction
//!
//! Terminal task failures reported by the backend are data
//! (`models::TaskOutcome::Failed`), not errors.

use thiserror::Error;

/// Input rejected before a request is issued.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InputError {
    #[error("Repository URL is required")]
    Empty,

    #[error("Invalid URL '{input}': {reason}")]
    InvalidUrl { input: String, reason: String },

    #[error("Invalid GitHub URL format. Please provide a valid repository URL.")]
    NotGitHub { input: String },
}

/// Errors from the icon generation backend.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Request to {endpoint} failed: {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Invalid backend URL '{url}'")]
    InvalidBaseUrl { url: String },

    #[error("Backend returned {status}: {detail}")]
    Server { status: u16, detail: String },

    #[error("Failed to decode response from {endpoint}: {source}")]
    Decode {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
}

impl ApiError {
    /// Message suitable for showing in place of a result.
    pub fn display_message(&self) -> String {
        match self {
            ApiError::Server { detail, .. } => detail.clone(),
            other => other.to_string(),
        }
    }
}

/// Why a submission did not produce a task.
#[derive(Debug, Error)]
pub enum SubmitError {
    #[error(transparent)]
    Input(#[from] InputError),

    #[error(transparent)]
    Backend(#[from] ApiError),

    #[error(transparent)]
    Poll(#[from] PollError),
}

/// Errors from the GitHub repository lookup.
#[derive(Debug, Error)]
pub enum GitHubError {
    #[error("Repository {owner}/{repo} not found")]
    NotFound { owner: String, repo: String },

    #[error("GitHub API request failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("Failed to parse GitHub API response: {0}")]
    Decode(#[source] reqwest::Error),
}

/// Errors from configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {source}")]
    Read {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {path}: {source}")]
    Parse {
        path: std::path::PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Poll interval must be greater than zero")]
    InvalidInterval,

    #[error("Invalid value '{value}' for {name}")]
    InvalidEnv { name: String, value: String },

    #[error("Invalid backend URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("{path} already exists (use --force to overwrite)")]
    AlreadyExists { path: std::path::PathBuf },

    #[error("Failed to write config file at {path}: {source}")]
    Write {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors from constructing a status poller.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PollError {
    #[error("Cannot poll without a task id")]
    MissingTaskId,

    #[error("Poll interval must be greater than zero")]
    InvalidInterval,
}
