//! Configuration for repoicon.
//!
//! Values are layered, lowest to highest precedence:
//! built-in defaults → `repoicon.toml` → environment (`.env` loaded first) → CLI flags.
//!
//! # Configuration File Format
//!
//! ```toml
//! [backend]
//! url = "https://icon.example.com"   # full override, wins over host/port/https
//! host = "localhost"
//! port = "8000"
//! https = false
//! timeout_secs = 30
//!
//! [poll]
//! interval_ms = 2000
//!
//! [github]
//! api_base = "https://api.github.com"
//! ```
//!
//! A full backend URL from any layer wins over an assembled one. Without one, the
//! URL is assembled from host, port and protocol, and the port is omitted when it is
//! the protocol's standard port.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::errors::ConfigError;

pub const CONFIG_FILE_NAME: &str = "repoicon.toml";
pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_PORT: &str = "8000";
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 2000;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_GITHUB_API_BASE: &str = "https://api.github.com";

/// Written by `repoicon config init`.
pub const DEFAULT_CONFIG_TEMPLATE: &str = r#"# repoicon configuration
#
# Environment variables (API_URL, API_HOST, BACKEND_PORT, USE_HTTPS,
# REPOICON_POLL_INTERVAL_MS, GITHUB_API_BASE) override these values.

[backend]
# Full base URL. When set, host/port/https are ignored.
# url = "http://localhost:8000"
host = "localhost"
port = "8000"
https = false
timeout_secs = 30

[poll]
interval_ms = 2000

[github]
api_base = "https://api.github.com"
"#;

/// `[backend]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BackendSection {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default)]
    pub port: Option<String>,
    #[serde(default)]
    pub https: Option<bool>,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

/// `[poll]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PollSection {
    #[serde(default)]
    pub interval_ms: Option<u64>,
}

/// `[github]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GitHubSection {
    #[serde(default)]
    pub api_base: Option<String>,
}

/// Contents of `repoicon.toml`. Every field is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub backend: BackendSection,
    #[serde(default)]
    pub poll: PollSection,
    #[serde(default)]
    pub github: GitHubSection,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content, path)
    }

    pub fn parse(content: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Find and load the config file.
    ///
    /// An explicit path must exist. Otherwise `./repoicon.toml` is tried, then
    /// `<config_dir>/repoicon/repoicon.toml`. Returns defaults when neither exists.
    pub fn discover(explicit: Option<&Path>) -> Result<(Self, Option<PathBuf>), ConfigError> {
        if let Some(path) = explicit {
            return Ok((Self::load(path)?, Some(path.to_path_buf())));
        }

        let candidates = [
            Some(PathBuf::from(CONFIG_FILE_NAME)),
            dirs::config_dir().map(|dir| dir.join("repoicon").join(CONFIG_FILE_NAME)),
        ];
        for path in candidates.into_iter().flatten() {
            if path.is_file() {
                return Ok((Self::load(&path)?, Some(path)));
            }
        }
        Ok((Self::default(), None))
    }

    /// Write the default template to `dir/repoicon.toml`.
    ///
    /// Refuses to replace an existing file unless `force` is set.
    pub fn write_template(dir: &Path, force: bool) -> Result<PathBuf, ConfigError> {
        let path = dir.join(CONFIG_FILE_NAME);
        if path.exists() && !force {
            return Err(ConfigError::AlreadyExists { path });
        }
        std::fs::write(&path, DEFAULT_CONFIG_TEMPLATE).map_err(|source| ConfigError::Write {
            path: path.clone(),
            source,
        })?;
        Ok(path)
    }
}

/// Snapshot of the environment variables repoicon reads.
///
/// Empty values count as unset.
#[derive(Debug, Clone, Default)]
pub struct EnvOverrides {
    pub api_url: Option<String>,
    pub api_host: Option<String>,
    pub backend_port: Option<String>,
    pub use_https: Option<String>,
    pub poll_interval_ms: Option<String>,
    pub github_api_base: Option<String>,
}

impl EnvOverrides {
    pub fn from_env() -> Self {
        fn var(name: &str) -> Option<String> {
            std::env::var(name).ok().filter(|v| !v.is_empty())
        }
        Self {
            api_url: var("API_URL"),
            api_host: var("API_HOST"),
            backend_port: var("BACKEND_PORT"),
            use_https: var("USE_HTTPS"),
            poll_interval_ms: var("REPOICON_POLL_INTERVAL_MS"),
            github_api_base: var("GITHUB_API_BASE"),
        }
    }
}

/// Values given on the command line.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub api_url: Option<String>,
    pub interval_ms: Option<u64>,
}

/// Which layer a resolved value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueSource {
    Default,
    File,
    Env,
    Cli,
}

impl std::fmt::Display for ValueSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValueSource::Default => write!(f, "default"),
            ValueSource::File => write!(f, "config file"),
            ValueSource::Env => write!(f, "environment"),
            ValueSource::Cli => write!(f, "command line"),
        }
    }
}

/// Inputs for assembling the backend base URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendSettings {
    pub url_override: Option<String>,
    pub host: String,
    pub port: String,
    pub use_https: bool,
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            url_override: None,
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT.to_string(),
            use_https: false,
        }
    }
}

/// Build the backend base URL.
///
/// The override is used as-is (minus trailing slashes). Otherwise the URL is
/// `{protocol}://{host}:{port}`, dropping `:{port}` for http:80 and https:443.
pub fn build_api_base_url(settings: &BackendSettings) -> String {
    if let Some(url) = &settings.url_override {
        return url.trim_end_matches('/').to_string();
    }

    let protocol = if settings.use_https { "https" } else { "http" };
    let is_standard_port = (settings.use_https && settings.port == "443")
        || (!settings.use_https && settings.port == "80");

    if is_standard_port {
        format!("{}://{}", protocol, settings.host)
    } else {
        format!("{}://{}:{}", protocol, settings.host, settings.port)
    }
}

/// Fully resolved runtime configuration.
#[derive(Debug, Clone, Serialize)]
pub struct Config {
    pub backend_url: String,
    pub backend_url_source: ValueSource,
    #[serde(serialize_with = "serialize_millis")]
    pub poll_interval: Duration,
    pub poll_interval_source: ValueSource,
    #[serde(serialize_with = "serialize_millis")]
    pub request_timeout: Duration,
    pub github_api_base: String,
    pub config_file: Option<PathBuf>,
}

fn serialize_millis<S: serde::Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u64(d.as_millis() as u64)
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend_url: build_api_base_url(&BackendSettings::default()),
            backend_url_source: ValueSource::Default,
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            poll_interval_source: ValueSource::Default,
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            github_api_base: DEFAULT_GITHUB_API_BASE.to_string(),
            config_file: None,
        }
    }
}

impl Config {
    /// Load `.env`, discover the config file, read the environment and apply CLI values.
    pub fn load(cli: &CliOverrides, config_path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!("loaded environment from {}", path.display());
        }
        let (file, file_path) = FileConfig::discover(config_path)?;
        let mut config = Self::resolve(&file, &EnvOverrides::from_env(), cli)?;
        config.config_file = file_path;
        Ok(config)
    }

    /// Merge the layers. Pure; does not touch the process environment.
    pub fn resolve(
        file: &FileConfig,
        env: &EnvOverrides,
        cli: &CliOverrides,
    ) -> Result<Self, ConfigError> {
        let (backend_url, backend_url_source) = Self::resolve_backend_url(file, env, cli)?;

        let (interval_ms, poll_interval_source) = if let Some(ms) = cli.interval_ms {
            (ms, ValueSource::Cli)
        } else if let Some(raw) = &env.poll_interval_ms {
            let ms = raw.parse::<u64>().map_err(|_| ConfigError::InvalidEnv {
                name: "REPOICON_POLL_INTERVAL_MS".to_string(),
                value: raw.clone(),
            })?;
            (ms, ValueSource::Env)
        } else if let Some(ms) = file.poll.interval_ms {
            (ms, ValueSource::File)
        } else {
            (DEFAULT_POLL_INTERVAL_MS, ValueSource::Default)
        };
        if interval_ms == 0 {
            return Err(ConfigError::InvalidInterval);
        }

        let timeout_secs = file.backend.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS);

        let github_api_base = env
            .github_api_base
            .clone()
            .or_else(|| file.github.api_base.clone())
            .unwrap_or_else(|| DEFAULT_GITHUB_API_BASE.to_string())
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            backend_url,
            backend_url_source,
            poll_interval: Duration::from_millis(interval_ms),
            poll_interval_source,
            request_timeout: Duration::from_secs(timeout_secs),
            github_api_base,
            config_file: None,
        })
    }

    fn resolve_backend_url(
        file: &FileConfig,
        env: &EnvOverrides,
        cli: &CliOverrides,
    ) -> Result<(String, ValueSource), ConfigError> {
        let full_override = cli
            .api_url
            .clone()
            .map(|u| (u, ValueSource::Cli))
            .or_else(|| env.api_url.clone().map(|u| (u, ValueSource::Env)))
            .or_else(|| file.backend.url.clone().map(|u| (u, ValueSource::File)));

        let (settings, source) = match full_override {
            Some((url, source)) => (
                BackendSettings {
                    url_override: Some(url),
                    ..BackendSettings::default()
                },
                source,
            ),
            None => {
                let env_touched = env.api_host.is_some()
                    || env.backend_port.is_some()
                    || env.use_https.is_some();
                let file_touched = file.backend.host.is_some()
                    || file.backend.port.is_some()
                    || file.backend.https.is_some();
                let source = if env_touched {
                    ValueSource::Env
                } else if file_touched {
                    ValueSource::File
                } else {
                    ValueSource::Default
                };
                let use_https = match &env.use_https {
                    Some(v) => v == "true",
                    None => file.backend.https.unwrap_or(false),
                };
                (
                    BackendSettings {
                        url_override: None,
                        host: env
                            .api_host
                            .clone()
                            .or_else(|| file.backend.host.clone())
                            .unwrap_or_else(|| DEFAULT_HOST.to_string()),
                        port: env
                            .backend_port
                            .clone()
                            .or_else(|| file.backend.port.clone())
                            .unwrap_or_else(|| DEFAULT_PORT.to_string()),
                        use_https,
                    },
                    source,
                )
            }
        };

        let url = build_api_base_url(&settings);
        reqwest::Url::parse(&url).map_err(|e| ConfigError::InvalidUrl {
            url: url.clone(),
            reason: e.to_string(),
        })?;
        Ok((url, source))
    }
}
