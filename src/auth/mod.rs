//! auth - GitHub App authentication
//!
//! The service acts on repositories as an installed GitHub App. Every
//! remote operation is authorized by one of two credentials:
//!
//! - an app JWT, signed with the app's private key, for app-level
//!   endpoints (listing installations, exchanging installation tokens)
//! - an installation access token for repository endpoints
//!
//! # Components
//!
//! - [`TokenProvider`] - Trait for providing bearer tokens to forge adapters
//! - [`AppJwtSigner`] - Implementation of TokenProvider minting app JWTs
//! - [`installations`] - Installation listing and token exchange
//!
//! # Security
//!
//! Private keys, JWTs and installation tokens never appear in logs, error
//! messages or debug output. Types holding them implement a redacting
//! `Debug`.

mod app_jwt;
mod errors;
pub mod installations;

pub use app_jwt::{AppClaims, AppJwtSigner};
pub use errors::AuthError;
pub use installations::InstallationToken;

/// Trait for providing bearer tokens to forge adapters.
///
/// # Implementation Notes
///
/// Implementors must never log or expose token values.
#[async_trait::async_trait]
pub trait TokenProvider: Send + Sync {
    /// Returns a bearer token valid for at least the next request.
    async fn bearer_token(&self) -> Result<String, AuthError>;
}

/// A fixed token, for tests and for pre-minted credentials.
pub struct StaticToken(String);

impl StaticToken {
    /// Wrap a token value.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

impl std::fmt::Debug for StaticToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("StaticToken([REDACTED])")
    }
}

#[async_trait::async_trait]
impl TokenProvider for StaticToken {
    async fn bearer_token(&self) -> Result<String, AuthError> {
        Ok(self.0.clone())
    }
}
