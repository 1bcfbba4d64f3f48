//! core::config::schema
//!
//! Configuration file schema.
//!
//! # Example
//!
//! ```toml
//! log_level = "info"
//!
//! [github]
//! app_id = "123456"
//! private_key_path = "/etc/vocabpub/app.pem"
//! default_branch = "main"
//! request_timeout_secs = 30
//!
//! [server]
//! bind_addr = "0.0.0.0:5000"
//!
//! [templates]
//! branch_name = "%timestamp%_%vocabulary_name%"
//! pull_request_title = "Release: %date% - %vocabulary_name%"
//! ```
//!
//! Every field is optional in the file. Secrets are usually supplied via
//! the environment instead (see [`super::Config::load`]).

use serde::{Deserialize, Serialize};

use crate::core::naming::TemplateSet;

/// Top-level configuration file.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    /// Log filter used when `RUST_LOG` is unset
    pub log_level: Option<String>,

    /// Force debug logging
    pub debug_mode: Option<bool>,

    /// GitHub App settings
    pub github: GitHubSection,

    /// Upload endpoint settings
    pub server: ServerSection,

    /// Branch, commit and pull request templates
    pub templates: TemplateSet,
}

impl FileConfig {
    /// Log filter implied by these settings: `debug` when debug mode is on,
    /// else the configured level, else the default.
    pub fn log_filter(&self) -> &str {
        if self.debug_mode == Some(true) {
            "debug"
        } else {
            self.log_level.as_deref().unwrap_or(super::DEFAULT_LOG_LEVEL)
        }
    }
}

/// `[github]` table.
#[derive(Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct GitHubSection {
    /// GitHub App ID
    pub app_id: Option<String>,

    /// PEM encoded app private key
    pub private_key: Option<String>,

    /// Path to a PEM file holding the app private key
    pub private_key_path: Option<String>,

    /// API base URL (GitHub Enterprise)
    pub api_base: Option<String>,

    /// Branch pull requests target
    pub default_branch: Option<String>,

    /// Per-request timeout in seconds
    pub request_timeout_secs: Option<u64>,
}

impl std::fmt::Debug for GitHubSection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubSection")
            .field("app_id", &self.app_id)
            .field("private_key", &self.private_key.as_ref().map(|_| "[REDACTED]"))
            .field("private_key_path", &self.private_key_path)
            .field("api_base", &self.api_base)
            .field("default_branch", &self.default_branch)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

/// `[server]` table.
#[derive(Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ServerSection {
    /// Address the upload endpoint listens on
    pub bind_addr: Option<String>,

    /// Bearer secret callers must present
    pub incoming_secret: Option<String>,
}

impl std::fmt::Debug for ServerSection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerSection")
            .field("bind_addr", &self.bind_addr)
            .field(
                "incoming_secret",
                &self.incoming_secret.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}
