//! core::config
//!
//! Configuration loading and validation.
//!
//! # Overview
//!
//! Configuration is resolved once at start-up into a [`Config`] that is
//! then shared read-only by every request. Nothing in the publication
//! workflow reads the environment directly.
//!
//! # Precedence
//!
//! Configuration values are resolved in this order (later overrides earlier):
//! 1. Default values
//! 2. Config file (`--config <path>`, else `$VOCABPUB_CONFIG` if set)
//! 3. Environment variables (a `.env` file is loaded by the binary first)
//!
//! # Environment Variables
//!
//! | variable | overrides |
//! |---|---|
//! | `GH_APP_ID` | `github.app_id` |
//! | `GH_APP_PRIVATE_KEY` | `github.private_key` |
//! | `GH_APP_PRIVATE_KEY_PATH` | `github.private_key_path` |
//! | `GH_API_BASE` | `github.api_base` |
//! | `GH_DEFAULT_BRANCH` | `github.default_branch` |
//! | `GH_REQUEST_TIMEOUT_SECS` | `github.request_timeout_secs` |
//! | `INCOMING_SECRET` | `server.incoming_secret` |
//! | `BIND_ADDR` | `server.bind_addr` |
//! | `GH_COMMIT_BRANCH_TEMPLATE` | `templates.branch_name` |
//! | `GH_COMMIT_MESSAGE_TEMPLATE` | `templates.commit_message` |
//! | `GH_PULL_REQUEST_TITLE_TEMPLATE` | `templates.pull_request_title` |
//! | `GH_PULL_REQUEST_DESCRIPTION_TEMPLATE` | `templates.pull_request_description` |
//! | `LOG_LEVEL` | `log_level` |
//! | `DEBUG_MODE` | `debug_mode` |
//!
//! # Example
//!
//! ```no_run
//! use vocab_publisher::core::config::Config;
//!
//! let config = Config::load(None).unwrap();
//! println!("PRs target {}", config.github.default_branch);
//! ```

pub mod schema;

pub use schema::{FileConfig, GitHubSection, ServerSection};

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;

use crate::core::naming::TemplateSet;
use crate::forge::github::DEFAULT_API_BASE;

/// Environment variable naming the config file.
pub const CONFIG_PATH_ENV: &str = "VOCABPUB_CONFIG";

/// Default branch pull requests target.
pub const DEFAULT_BRANCH: &str = "main";

/// Default per-request timeout against the remote host.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Default listen address for the upload endpoint.
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:5000";

/// Default log filter.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Errors from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("missing configuration: set {}", .0.join(", "))]
    Missing(Vec<&'static str>),

    #[error("invalid config value: {0}")]
    InvalidValue(String),
}

/// Resolved GitHub App settings.
#[derive(Clone)]
pub struct GitHubConfig {
    pub app_id: String,
    pub private_key: String,
    pub api_base: String,
    pub default_branch: String,
    pub request_timeout: Duration,
}

// Custom Debug to avoid exposing the private key
impl std::fmt::Debug for GitHubConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubConfig")
            .field("app_id", &self.app_id)
            .field("private_key", &"[REDACTED]")
            .field("api_base", &self.api_base)
            .field("default_branch", &self.default_branch)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

/// Resolved upload endpoint settings.
#[derive(Clone)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub incoming_secret: Option<String>,
}

impl std::fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerConfig")
            .field("bind_addr", &self.bind_addr)
            .field(
                "incoming_secret",
                &self.incoming_secret.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}

/// Fully resolved configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub github: GitHubConfig,
    pub server: ServerConfig,
    pub templates: TemplateSet,
}

impl Config {
    /// Load configuration from the file (if any) and the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be read or parsed, or if
    /// required values are missing after all sources are applied.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        Self::resolve(load_layers(path)?)
    }

    /// Read and parse a config file.
    pub fn read_file(path: &Path) -> Result<FileConfig, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Resolve configuration from a parsed file and an environment map.
    pub fn from_sources(
        file: FileConfig,
        env: &HashMap<String, String>,
    ) -> Result<Self, ConfigError> {
        Self::resolve(apply_env(file, env)?)
    }

    /// Apply defaults to merged layers and validate.
    pub fn resolve(file: FileConfig) -> Result<Self, ConfigError> {
        let private_key = match (file.github.private_key, file.github.private_key_path) {
            (Some(key), _) => Some(key),
            (None, Some(path)) => {
                let path = PathBuf::from(path);
                Some(
                    fs::read_to_string(&path)
                        .map_err(|e| ConfigError::ReadError { path, source: e })?,
                )
            }
            (None, None) => None,
        };

        let mut missing = Vec::new();
        if file.github.app_id.is_none() {
            missing.push("GH_APP_ID");
        }
        if private_key.is_none() {
            missing.push("GH_APP_PRIVATE_KEY");
        }
        let (Some(app_id), Some(private_key)) = (file.github.app_id, private_key) else {
            return Err(ConfigError::Missing(missing));
        };

        let default_branch = file
            .github
            .default_branch
            .unwrap_or_else(|| DEFAULT_BRANCH.to_string());
        if default_branch.trim().is_empty() {
            return Err(ConfigError::InvalidValue(
                "default branch cannot be empty".into(),
            ));
        }

        let timeout_secs = file
            .github
            .request_timeout_secs
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS);
        if timeout_secs == 0 {
            return Err(ConfigError::InvalidValue(
                "request timeout must be greater than zero".into(),
            ));
        }

        Ok(Config {
            github: GitHubConfig {
                app_id,
                private_key,
                api_base: file
                    .github
                    .api_base
                    .unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
                default_branch,
                request_timeout: Duration::from_secs(timeout_secs),
            },
            server: ServerConfig {
                bind_addr: file
                    .server
                    .bind_addr
                    .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
                incoming_secret: file.server.incoming_secret,
            },
            templates: file.templates,
        })
    }

    /// The endpoint secret, required before serving.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Missing` if no secret is configured.
    pub fn incoming_secret(&self) -> Result<&str, ConfigError> {
        self.server
            .incoming_secret
            .as_deref()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ConfigError::Missing(vec!["INCOMING_SECRET"]))
    }
}

/// Merge the config file (if any) with the process environment, without
/// applying defaults or validating.
///
/// `path` takes precedence over `$VOCABPUB_CONFIG`. No file at all is not
/// an error.
pub fn load_layers(path: Option<&Path>) -> Result<FileConfig, ConfigError> {
    let env: HashMap<String, String> = std::env::vars().collect();

    let path = path
        .map(Path::to_path_buf)
        .or_else(|| env.get(CONFIG_PATH_ENV).map(PathBuf::from));
    let file = match path {
        Some(path) => Config::read_file(&path)?,
        None => FileConfig::default(),
    };

    apply_env(file, &env)
}

/// Overlay recognized environment variables onto `file`.
///
/// Empty values are ignored.
pub fn apply_env(
    mut file: FileConfig,
    env: &HashMap<String, String>,
) -> Result<FileConfig, ConfigError> {
    let var = |key: &str| env.get(key).filter(|v| !v.is_empty()).cloned();

    if let Some(v) = var("GH_APP_ID") {
        file.github.app_id = Some(v);
    }
    if let Some(v) = var("GH_APP_PRIVATE_KEY") {
        file.github.private_key = Some(v);
    }
    if let Some(v) = var("GH_APP_PRIVATE_KEY_PATH") {
        file.github.private_key_path = Some(v);
    }
    if let Some(v) = var("GH_API_BASE") {
        file.github.api_base = Some(v);
    }
    if let Some(v) = var("GH_DEFAULT_BRANCH") {
        file.github.default_branch = Some(v);
    }
    if let Some(v) = var("GH_REQUEST_TIMEOUT_SECS") {
        let secs = v.parse().map_err(|_| {
            ConfigError::InvalidValue(format!(
                "GH_REQUEST_TIMEOUT_SECS must be an integer, got '{}'",
                v
            ))
        })?;
        file.github.request_timeout_secs = Some(secs);
    }
    if let Some(v) = var("INCOMING_SECRET") {
        file.server.incoming_secret = Some(v);
    }
    if let Some(v) = var("BIND_ADDR") {
        file.server.bind_addr = Some(v);
    }
    if let Some(v) = var("GH_COMMIT_BRANCH_TEMPLATE") {
        file.templates.branch_name = v;
    }
    if let Some(v) = var("GH_COMMIT_MESSAGE_TEMPLATE") {
        file.templates.commit_message = v;
    }
    if let Some(v) = var("GH_PULL_REQUEST_TITLE_TEMPLATE") {
        file.templates.pull_request_title = v;
    }
    if let Some(v) = var("GH_PULL_REQUEST_DESCRIPTION_TEMPLATE") {
        file.templates.pull_request_description = v;
    }
    if let Some(v) = var("LOG_LEVEL") {
        file.log_level = Some(v);
    }
    if let Some(v) = var("DEBUG_MODE") {
        file.debug_mode = Some(v.eq_ignore_ascii_case("true"));
    }

    Ok(file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn required() -> Vec<(&'static str, &'static str)> {
        vec![("GH_APP_ID", "42"), ("GH_APP_PRIVATE_KEY", "pem")]
    }

    #[test]
    fn defaults_apply() {
        let config = Config::from_sources(FileConfig::default(), &env(&required())).unwrap();

        assert_eq!(config.github.app_id, "42");
        assert_eq!(config.github.api_base, "https://api.github.com");
        assert_eq!(config.github.default_branch, "main");
        assert_eq!(config.github.request_timeout, Duration::from_secs(30));
        assert_eq!(config.server.bind_addr, "127.0.0.1:5000");
        assert!(config.server.incoming_secret.is_none());
        assert_eq!(config.templates, TemplateSet::default());
    }

    #[test]
    fn missing_credentials_reported_together() {
        let err = Config::from_sources(FileConfig::default(), &env(&[])).unwrap_err();
        match err {
            ConfigError::Missing(keys) => {
                assert_eq!(keys, vec!["GH_APP_ID", "GH_APP_PRIVATE_KEY"]);
            }
            other => panic!("expected Missing, got {:?}", other),
        }
    }

    #[test]
    fn env_overrides_file() {
        let file: FileConfig = toml::from_str(
            r#"
            [github]
            app_id = "1"
            private_key = "file-pem"
            default_branch = "develop"

            [templates]
            branch_name = "file/%vocabulary_name%"
            commit_message = "file message"
            "#,
        )
        .unwrap();

        let config = Config::from_sources(
            file,
            &env(&[
                ("GH_APP_ID", "2"),
                ("GH_COMMIT_BRANCH_TEMPLATE", "env/%vocabulary_name%"),
                ("INCOMING_SECRET", "s3cret"),
            ]),
        )
        .unwrap();

        assert_eq!(config.github.app_id, "2");
        assert_eq!(config.github.private_key, "file-pem");
        assert_eq!(config.github.default_branch, "develop");
        assert_eq!(config.templates.branch_name, "env/%vocabulary_name%");
        assert_eq!(config.templates.commit_message, "file message");
        assert_eq!(config.incoming_secret().unwrap(), "s3cret");
    }

    #[test]
    fn empty_env_values_are_ignored() {
        let mut vars = required();
        vars.push(("GH_DEFAULT_BRANCH", ""));
        let config = Config::from_sources(FileConfig::default(), &env(&vars)).unwrap();
        assert_eq!(config.github.default_branch, "main");
    }

    #[test]
    fn debug_mode_forces_debug_filter() {
        let mut vars = required();
        vars.push(("LOG_LEVEL", "warn"));
        vars.push(("DEBUG_MODE", "True"));
        let layers = apply_env(FileConfig::default(), &env(&vars)).unwrap();
        assert_eq!(layers.debug_mode, Some(true));
        assert_eq!(layers.log_filter(), "debug");
    }

    #[test]
    fn invalid_timeout_rejected() {
        let mut vars = required();
        vars.push(("GH_REQUEST_TIMEOUT_SECS", "soon"));
        assert!(matches!(
            Config::from_sources(FileConfig::default(), &env(&vars)),
            Err(ConfigError::InvalidValue(_))
        ));

        let mut vars = required();
        vars.push(("GH_REQUEST_TIMEOUT_SECS", "0"));
        assert!(matches!(
            Config::from_sources(FileConfig::default(), &env(&vars)),
            Err(ConfigError::InvalidValue(_))
        ));
    }

    #[test]
    fn private_key_read_from_path() {
        let temp = TempDir::new().unwrap();
        let key_path = temp.path().join("app.pem");
        fs::write(&key_path, "pem-from-file").unwrap();

        let config = Config::from_sources(
            FileConfig::default(),
            &env(&[
                ("GH_APP_ID", "42"),
                ("GH_APP_PRIVATE_KEY_PATH", key_path.to_str().unwrap()),
            ]),
        )
        .unwrap();

        assert_eq!(config.github.private_key, "pem-from-file");
    }

    #[test]
    fn read_file_reports_parse_errors_with_path() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        fs::write(&path, "[github\napp_id = 1").unwrap();

        match Config::read_file(&path) {
            Err(ConfigError::ParseError { path: p, .. }) => assert_eq!(p, path),
            other => panic!("expected ParseError, got {:?}", other),
        }
    }

    #[test]
    fn missing_incoming_secret_is_reported() {
        let config = Config::from_sources(FileConfig::default(), &env(&required())).unwrap();
        assert!(matches!(
            config.incoming_secret(),
            Err(ConfigError::Missing(keys)) if keys == vec!["INCOMING_SECRET"]
        ));
    }

    #[test]
    fn debug_redacts_secrets() {
        let mut vars = required();
        vars.push(("INCOMING_SECRET", "hunter2"));
        let config = Config::from_sources(FileConfig::default(), &env(&vars)).unwrap();
        let debug = format!("{:?}", config);
        assert!(!debug.contains("hunter2"));
        assert!(!debug.contains("\"pem\""));
    }
}
