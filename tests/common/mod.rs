//! In-process stand-in for the icon backend and the GitHub repos endpoint.
//!
//! Runs an axum server on its own thread and runtime so it can serve both
//! async tests and blocking `assert_cmd` invocations.

#![allow(dead_code)]

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

/// Scripted responses plus a record of what the client sent.
#[derive(Default)]
pub struct MockState {
    /// Response to every submission. Defaults to a `task-1` generation.
    pub generate: Option<(u16, Value)>,
    /// Status responses in order. The last one repeats once the queue drains.
    pub statuses: VecDeque<(u16, Value)>,
    pub generate_calls: usize,
    pub status_calls: usize,
    pub submitted_urls: Vec<String>,
    pub polled_task_ids: Vec<String>,
    /// GitHub repositories by `owner/repo`. Anything else is a 404.
    pub repos: HashMap<String, Value>,
    pub github_requests: Vec<GitHubRequest>,
}

/// What the client sent to `/repos/{owner}/{repo}`.
#[derive(Debug, Clone)]
pub struct GitHubRequest {
    pub full_name: String,
    pub accept: Option<String>,
    pub user_agent: Option<String>,
}

pub type Shared = Arc<Mutex<MockState>>;

pub struct MockBackend {
    pub url: String,
    pub state: Shared,
}

impl MockBackend {
    pub fn start(state: MockState) -> Self {
        let shared: Shared = Arc::new(Mutex::new(state));
        let app = Router::new()
            .route("/api/generate-repo-icon", post(generate))
            .route("/api/check-image-status/{task_id}", get(check_status))
            .route("/repos/{owner}/{repo}", get(github_repo))
            .with_state(shared.clone());

        let (tx, rx) = std::sync::mpsc::channel();
        std::thread::spawn(move || {
            let rt = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .unwrap();
            rt.block_on(async move {
                let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
                tx.send(listener.local_addr().unwrap()).unwrap();
                axum::serve(listener, app).await.unwrap();
            });
        });
        let addr = rx.recv().unwrap();

        Self {
            url: format!("http://{}", addr),
            state: shared,
        }
    }

    pub fn generate_calls(&self) -> usize {
        self.state.lock().unwrap().generate_calls
    }

    pub fn status_calls(&self) -> usize {
        self.state.lock().unwrap().status_calls
    }

    pub fn submitted_urls(&self) -> Vec<String> {
        self.state.lock().unwrap().submitted_urls.clone()
    }

    pub fn polled_task_ids(&self) -> Vec<String> {
        self.state.lock().unwrap().polled_task_ids.clone()
    }

    pub fn github_requests(&self) -> Vec<GitHubRequest> {
        self.state.lock().unwrap().github_requests.clone()
    }
}

/// A mock whose only content is one GitHub repository.
pub fn with_github_repo(owner: &str, repo: &str, body: Value) -> MockBackend {
    let mut repos = HashMap::new();
    repos.insert(format!("{}/{}", owner, repo), body);
    MockBackend::start(MockState {
        repos,
        ..Default::default()
    })
}

pub fn github_repo_body() -> Value {
    json!({
        "name": "react",
        "full_name": "facebook/react",
        "description": "The library for web and native user interfaces.",
        "language": "JavaScript",
        "stargazers_count": 230000,
        "owner": { "login": "facebook", "id": 69631 }
    })
}

pub fn generation_body(task_id: &str) -> Value {
    json!({
        "task_id": task_id,
        "prompt": "A minimalist atom icon in React blue",
        "repo_info": {
            "name": "react",
            "description": "The library for web and native user interfaces.",
            "language": "JavaScript",
            "stars": 230000
        }
    })
}

pub fn running() -> (u16, Value) {
    (200, json!({ "status": "RUNNING", "completed": false }))
}

pub fn image(url: &str) -> (u16, Value) {
    (
        200,
        json!({ "status": "SUCCEEDED", "completed": true, "image_url": url }),
    )
}

pub fn task_error(code: &str, message: &str) -> (u16, Value) {
    (
        200,
        json!({
            "status": "FAILED",
            "completed": true,
            "error": { "code": code, "message": message }
        }),
    )
}

pub fn server_error(status: u16, detail: &str) -> (u16, Value) {
    (status, json!({ "detail": detail }))
}

fn reply((status, body): (u16, Value)) -> (StatusCode, Json<Value>) {
    (
        StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        Json(body),
    )
}

async fn generate(State(state): State<Shared>, Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    let mut state = state.lock().unwrap();
    state.generate_calls += 1;
    if let Some(url) = body.get("url").and_then(|u| u.as_str()) {
        state.submitted_urls.push(url.to_string());
    }
    let response = state
        .generate
        .clone()
        .unwrap_or_else(|| (200, generation_body("task-1")));
    reply(response)
}

async fn check_status(
    State(state): State<Shared>,
    Path(task_id): Path<String>,
) -> (StatusCode, Json<Value>) {
    let mut state = state.lock().unwrap();
    state.status_calls += 1;
    state.polled_task_ids.push(task_id);
    let response = if state.statuses.len() > 1 {
        state.statuses.pop_front()
    } else {
        state.statuses.front().cloned()
    };
    reply(response.unwrap_or_else(running))
}

async fn github_repo(
    State(state): State<Shared>,
    Path((owner, repo)): Path<(String, String)>,
    headers: HeaderMap,
) -> (StatusCode, Json<Value>) {
    let header_value = |name: header::HeaderName| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    let full_name = format!("{}/{}", owner, repo);

    let mut state = state.lock().unwrap();
    state.github_requests.push(GitHubRequest {
        full_name: full_name.clone(),
        accept: header_value(header::ACCEPT),
        user_agent: header_value(header::USER_AGENT),
    });
    match state.repos.get(&full_name) {
        Some(body) => (StatusCode::OK, Json(body.clone())),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({ "message": "Not Found" })),
        ),
    }
}
