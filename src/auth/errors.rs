//! auth::errors
//!
//! Authentication error types for GitHub App credentials.
//!
//! # Design
//!
//! Error messages MUST NOT contain private key material, JWTs or
//! installation tokens. All error variants are designed to provide useful
//! context without exposing sensitive data.
//!
//! # Example
//!
//! ```
//! use vocab_publisher::auth::AuthError;
//!
//! let err = AuthError::InvalidPrivateKey("not a PEM".to_string());
//! assert!(err.to_string().contains("private key"));
//! assert!(!err.to_string().contains("ghs_")); // Never contains tokens
//! ```

use thiserror::Error;

/// Errors from authentication operations.
///
/// # Security
///
/// Error messages intentionally do not include token values.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The configured app private key could not be parsed.
    #[error("invalid GitHub App private key: {0}")]
    InvalidPrivateKey(String),

    /// Signing the app JWT failed.
    #[error("failed to sign GitHub App JWT: {0}")]
    Signing(String),

    /// GitHub rejected the app or installation credentials.
    #[error("not authenticated: {0}")]
    NotAuthenticated(String),

    /// Network error during authentication.
    #[error("network error: {0}")]
    Network(String),

    /// The request did not complete within the client timeout.
    #[error("request timed out: {0}")]
    Timeout(String),

    /// GitHub API error during authentication.
    #[error("GitHub API error: {status} - {message}")]
    GitHubApi {
        /// HTTP status code
        status: u16,
        /// Error message from GitHub
        message: String,
    },

    /// A listing endpoint was still returning full pages at the page limit.
    #[error("{endpoint} still had entries after {pages} pages")]
    Truncated {
        /// API path that was being listed
        endpoint: String,
        /// Pages fetched before giving up
        pages: u32,
    },
}

impl From<reqwest::Error> for AuthError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            AuthError::Timeout(err.to_string())
        } else {
            AuthError::Network(err.to_string())
        }
    }
}

impl From<jsonwebtoken::errors::Error> for AuthError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        AuthError::Signing(err.to_string())
    }
}
