//! Client for the icon generation backend.
//!
//! | Operation              | HTTP                                         |
//! |------------------------|----------------------------------------------|
//! | `generate_repo_icon`   | `POST /api/generate-repo-icon` `{ url }`     |
//! | `check_image_status`   | `GET /api/check-image-status/{task_id}`      |

use async_trait::async_trait;
use std::time::Duration;

use crate::config::Config;
use crate::errors::ApiError;
use crate::models::{GenerateIconRequest, GenerateIconResponse, TaskStatusResponse};

/// Abstraction over the backend for testability.
/// Real implementation: `ApiClient`.
#[async_trait]
pub trait IconBackend: Send + Sync {
    /// Enqueue icon generation for a repository URL.
    async fn generate_repo_icon(&self, url: &str) -> Result<GenerateIconResponse, ApiError>;

    /// Fetch the current status of a generation task.
    async fn check_image_status(&self, task_id: &str) -> Result<TaskStatusResponse, ApiError>;
}

/// HTTP implementation of [`IconBackend`].
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|source| ApiError::Transport {
                endpoint: base_url.to_string(),
                source,
            })?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, ApiError> {
        Self::new(&config.backend_url, config.request_timeout)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn generate_endpoint(&self) -> String {
        format!("{}/api/generate-repo-icon", self.base_url)
    }

    fn status_endpoint(&self, task_id: &str) -> Result<String, ApiError> {
        let invalid = || ApiError::InvalidBaseUrl {
            url: self.base_url.clone(),
        };
        let mut url = reqwest::Url::parse(&self.base_url).map_err(|_| invalid())?;
        url.path_segments_mut()
            .map_err(|_| invalid())?
            .pop_if_empty()
            .extend(["api", "check-image-status", task_id]);
        Ok(url.to_string())
    }

    /// Map a response to `T`, turning non-2xx into [`ApiError::Server`].
    async fn decode<T: serde::de::DeserializeOwned>(
        endpoint: &str,
        resp: reqwest::Response,
    ) -> Result<T, ApiError> {
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ApiError::Server {
                status: status.as_u16(),
                detail: extract_error_detail(&body, status),
            });
        }
        resp.json::<T>().await.map_err(|source| ApiError::Decode {
            endpoint: endpoint.to_string(),
            source,
        })
    }
}

#[async_trait]
impl IconBackend for ApiClient {
    async fn generate_repo_icon(&self, url: &str) -> Result<GenerateIconResponse, ApiError> {
        let endpoint = self.generate_endpoint();
        tracing::debug!("POST {}", endpoint);
        let resp = self
            .http
            .post(&endpoint)
            .json(&GenerateIconRequest {
                url: url.to_string(),
            })
            .send()
            .await
            .map_err(|source| ApiError::Transport {
                endpoint: endpoint.clone(),
                source,
            })?;
        Self::decode(&endpoint, resp).await
    }

    async fn check_image_status(&self, task_id: &str) -> Result<TaskStatusResponse, ApiError> {
        let endpoint = self.status_endpoint(task_id)?;
        tracing::debug!("GET {}", endpoint);
        let resp = self
            .http
            .get(&endpoint)
            .header("Content-Type", "application/json")
            .send()
            .await
            .map_err(|source| ApiError::Transport {
                endpoint: endpoint.clone(),
                source,
            })?;
        Self::decode(&endpoint, resp).await
    }
}

/// Pull a human-readable message out of an error body.
///
/// The backend reports errors as `{"detail": "..."}` or
/// `{"detail": {"code": "...", "message": "..."}}`. Anything else falls back
/// to the raw body, then to the status reason.
pub fn extract_error_detail(body: &str, status: reqwest::StatusCode) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body)
        && let Some(detail) = value.get("detail")
    {
        if let Some(s) = detail.as_str() {
            return s.to_string();
        }
        let code = detail.get("code").and_then(|c| c.as_str());
        let message = detail.get("message").and_then(|m| m.as_str());
        match (code, message) {
            (Some(code), Some(message)) => return format!("{}: {}", code, message),
            (None, Some(message)) => return message.to_string(),
            _ => return detail.to_string(),
        }
    }

    let trimmed = body.trim();
    if !trimmed.is_empty() {
        return trimmed.to_string();
    }
    status
        .canonical_reason()
        .map(str::to_string)
        .unwrap_or_else(|| format!("HTTP {}", status.as_u16()))
}


#[cfg(test)]
pub(crate) mod mock {
    //! Scripted in-memory backend for session and poller tests.

    use super::*;
    use crate::models::{RepoInfo, TaskError};
    use std::collections::{HashMap, VecDeque};
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// One scripted reply to a status request.
    pub enum StatusStep {
        Status(TaskStatusResponse),
        Fail(String),
    }

    impl StatusStep {
        pub fn pending() -> Self {
            StatusStep::Status(TaskStatusResponse {
                status: "RUNNING".to_string(),
                completed: false,
                image_url: None,
                error: None,
            })
        }

        pub fn image(url: &str) -> Self {
            StatusStep::Status(TaskStatusResponse {
                status: "SUCCEEDED".to_string(),
                completed: true,
                image_url: Some(url.to_string()),
                error: None,
            })
        }

        pub fn failed(code: &str, message: &str) -> Self {
            StatusStep::Status(TaskStatusResponse {
                status: "FAILED".to_string(),
                completed: true,
                image_url: None,
                error: Some(TaskError::new(code, message)),
            })
        }

        pub fn transport_error(detail: &str) -> Self {
            StatusStep::Fail(detail.to_string())
        }
    }

    /// Backend double. Unscripted tasks report `RUNNING` forever; unscripted
    /// submissions succeed with task ids `task-1`, `task-2`, ...
    #[derive(Default)]
    pub struct ScriptedBackend {
        generate_script: Mutex<VecDeque<Result<GenerateIconResponse, ApiError>>>,
        status_script: Mutex<HashMap<String, VecDeque<StatusStep>>>,
        generate_calls: AtomicUsize,
        status_calls: Mutex<Vec<String>>,
    }

    impl ScriptedBackend {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn script_status(&self, task_id: &str, steps: Vec<StatusStep>) {
            self.status_script
                .lock()
                .unwrap()
                .insert(task_id.to_string(), steps.into());
        }

        pub fn push_generate(&self, result: Result<GenerateIconResponse, ApiError>) {
            self.generate_script.lock().unwrap().push_back(result);
        }

        pub fn generate_calls(&self) -> usize {
            self.generate_calls.load(Ordering::SeqCst)
        }

        pub fn status_calls_for(&self, task_id: &str) -> usize {
            self.status_calls
                .lock()
                .unwrap()
                .iter()
                .filter(|id| *id == task_id)
                .count()
        }

        pub fn total_status_calls(&self) -> usize {
            self.status_calls.lock().unwrap().len()
        }
    }

    pub fn generation(task_id: &str) -> GenerateIconResponse {
        GenerateIconResponse {
            task_id: task_id.to_string(),
            prompt: format!("icon for {}, minimalist style, no text", task_id),
            repo_info: RepoInfo {
                name: "react".to_string(),
                description: Some("UI library".to_string()),
                language: Some("JavaScript".to_string()),
                stars: Some(230000),
                owner: None,
            },
        }
    }

    #[async_trait]
    impl IconBackend for ScriptedBackend {
        async fn generate_repo_icon(&self, _url: &str) -> Result<GenerateIconResponse, ApiError> {
            let n = self.generate_calls.fetch_add(1, Ordering::SeqCst) + 1;
            match self.generate_script.lock().unwrap().pop_front() {
                Some(result) => result,
                None => Ok(generation(&format!("task-{}", n))),
            }
        }

        async fn check_image_status(&self, task_id: &str) -> Result<TaskStatusResponse, ApiError> {
            self.status_calls.lock().unwrap().push(task_id.to_string());
            let step = self
                .status_script
                .lock()
                .unwrap()
                .get_mut(task_id)
                .and_then(|steps| steps.pop_front())
                .unwrap_or_else(StatusStep::pending);
            match step {
                StatusStep::Status(status) => Ok(status),
                StatusStep::Fail(detail) => Err(ApiError::Server {
                    status: 502,
                    detail,
                }),
            }
        }
    }
}
