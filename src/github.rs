//! Repository metadata straight from the GitHub REST API.
//!
//! Used by `repoicon repo`; the icon backend does its own lookup during
//! generation.

use serde::Deserialize;
use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;

use crate::config::Config;
use crate::errors::{GitHubError, InputError};
use crate::models::RepoInfo;

const USER_AGENT: &str = concat!("repoicon/", env!("CARGO_PKG_VERSION"));

// `.git` forms come first so the suffix is never captured as part of the name.
static GITHUB_URL_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"github\.com/([^/]+)/([^/]+)\.git$",
        r"github\.com:([^/]+)/([^/]+)\.git$",
        r"github\.com/([^/]+)/([^/]+?)/?$",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

/// Extract `(owner, repo)` from a GitHub repository URL.
///
/// Accepted forms:
/// - `https://github.com/owner/repo` (optional trailing slash)
/// - `https://github.com/owner/repo.git`
/// - `git@github.com:owner/repo.git`
pub fn parse_github_url(url: &str) -> Result<(String, String), InputError> {
    let url = url.trim();
    GITHUB_URL_PATTERNS
        .iter()
        .find_map(|re| re.captures(url))
        .map(|caps| (caps[1].to_string(), caps[2].to_string()))
        .ok_or_else(|| InputError::NotGitHub {
            input: url.to_string(),
        })
}

/// Repository payload from `GET /repos/{owner}/{repo}` (subset of fields).
#[derive(Debug, Deserialize)]
pub struct GitHubRepository {
    pub name: String,
    pub description: Option<String>,
    pub language: Option<String>,
    pub stargazers_count: Option<u64>,
    pub owner: GitHubOwner,
}

#[derive(Debug, Deserialize)]
pub struct GitHubOwner {
    pub login: String,
}

impl From<GitHubRepository> for RepoInfo {
    fn from(repo: GitHubRepository) -> Self {
        RepoInfo {
            name: repo.name,
            description: repo.description,
            language: repo.language,
            stars: repo.stargazers_count,
            owner: Some(repo.owner.login),
        }
    }
}

/// Unauthenticated client for the public GitHub REST API.
#[derive(Debug, Clone)]
pub struct GitHubClient {
    http: reqwest::Client,
    api_base: String,
}

impl GitHubClient {
    pub fn new(api_base: &str, timeout: Duration) -> Result<Self, GitHubError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(GitHubError::Transport)?;
        Ok(Self {
            http,
            api_base: api_base.trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, GitHubError> {
        Self::new(&config.github_api_base, config.request_timeout)
    }

    /// Fetch repository metadata.
    pub async fn get_repo_info(&self, owner: &str, repo: &str) -> Result<RepoInfo, GitHubError> {
        let url = format!("{}/repos/{}/{}", self.api_base, owner, repo);
        tracing::debug!("GET {}", url);

        let resp = self
            .http
            .get(&url)
            .header("Accept", "application/vnd.github.v3+json")
            .header("User-Agent", USER_AGENT)
            .send()
            .await
            .map_err(GitHubError::Transport)?;

        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(GitHubError::NotFound {
                owner: owner.to_string(),
                repo: repo.to_string(),
            });
        }

        let repository = resp
            .error_for_status()
            .map_err(GitHubError::Transport)?
            .json::<GitHubRepository>()
            .await
            .map_err(GitHubError::Decode)?;
        Ok(repository.into())
    }

    /// Parse a repository URL and fetch its metadata.
    pub async fn lookup_url(&self, url: &str) -> anyhow::Result<RepoInfo> {
        let (owner, repo) = parse_github_url(url)?;
        Ok(self.get_repo_info(&owner, &repo).await?)
    }
}
