//! forge::traits
//!
//! Trait definitions for the remote hosting integration.
//!
//! # Design
//!
//! Two traits split the remote surface:
//!
//! - [`Integration`] enumerates what the installed app can see
//!   (installations, then repositories per installation) and opens
//!   a [`RemoteRepository`] for a chosen [`RepositoryHandle`].
//! - [`RemoteRepository`] performs the per-repository operations the
//!   publication workflow needs: branch lookup, ref creation, content
//!   read/write and pull request creation.
//!
//! Both traits are async because every operation is a network call.
//! All methods return `Result` so callers can classify failures.
//!
//! # Example
//!
//! ```ignore
//! use vocab_publisher::forge::{Integration, RemoteRepository, CreatePrRequest};
//!
//! async fn open_pr(repo: &dyn RemoteRepository) -> Result<(), ForgeError> {
//!     let pr = repo.create_pull_request(CreatePrRequest {
//!         head: "202401020304_animals".to_string(),
//!         base: "main".to_string(),
//!         title: "Release: 02/01/2024 - animals".to_string(),
//!         body: "Description of the release".to_string(),
//!     }).await?;
//!     println!("Opened {}", pr.url);
//!     Ok(())
//! }
//! ```

use async_trait::async_trait;
use thiserror::Error;

/// Errors from forge operations.
///
/// These error types map to common failure modes when interacting
/// with remote hosting services like GitHub.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ForgeError {
    /// Authentication is required but not available.
    #[error("authentication required")]
    AuthRequired,

    /// Authentication failed (invalid token, expired, insufficient permissions).
    #[error("authentication failed: {0}")]
    AuthFailed(String),

    /// The requested resource was not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// The remote rejected a write because of its current state
    /// (ref already exists, file revision mismatch).
    #[error("conflict: {0}")]
    Conflict(String),

    /// Rate limit exceeded.
    #[error("rate limited")]
    RateLimited,

    /// API returned an error.
    #[error("API error: {status} - {message}")]
    ApiError {
        /// HTTP status code
        status: u16,
        /// Error message from the API
        message: String,
    },

    /// Network or connection error.
    #[error("network error: {0}")]
    NetworkError(String),

    /// The remote call did not complete within the configured timeout.
    #[error("request timed out: {0}")]
    Timeout(String),
}

impl ForgeError {
    /// Whether the remote host refused the write because of conflicting state.
    pub fn is_conflict(&self) -> bool {
        matches!(self, ForgeError::Conflict(_))
    }
}

/// An installation of the integration on an account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Installation {
    /// Installation ID
    pub id: u64,
    /// Login of the user or organization the app is installed on
    pub account: String,
}

/// Reference to a repository visible through an installation.
///
/// Handles are produced by [`Integration::list_repositories`] and are
/// only meaningful for the integration that produced them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryHandle {
    /// Installation that grants access to this repository
    pub installation_id: u64,
    /// Repository full name (`owner/name`)
    pub full_name: String,
}

/// Tip of a branch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Branch {
    /// Branch name
    pub name: String,
    /// SHA of the commit the branch points at
    pub commit_sha: String,
}

/// Result of looking up file content.
///
/// A missing file is an expected outcome, not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileContent {
    /// The file exists at the requested ref.
    Found {
        /// Blob SHA, required as the precondition for updates
        sha: String,
        /// Decoded file content
        bytes: Vec<u8>,
    },
    /// No file exists at the requested path.
    Absent,
}

/// Request to create a new file on a branch.
#[derive(Debug, Clone)]
pub struct CreateFileRequest {
    /// Path of the file in the repository
    pub path: String,
    /// Commit message
    pub message: String,
    /// Raw file content
    pub content: Vec<u8>,
    /// Branch to commit to
    pub branch: String,
}

/// Request to replace an existing file on a branch.
#[derive(Debug, Clone)]
pub struct UpdateFileRequest {
    /// Path of the file in the repository
    pub path: String,
    /// Commit message
    pub message: String,
    /// Raw file content
    pub content: Vec<u8>,
    /// Blob SHA the remote must still hold for the update to apply
    pub previous_sha: String,
    /// Branch to commit to
    pub branch: String,
}

/// Request to create a pull request.
#[derive(Debug, Clone)]
pub struct CreatePrRequest {
    /// Head branch name (the branch with changes)
    pub head: String,
    /// Base branch name (the branch to merge into)
    pub base: String,
    /// PR title
    pub title: String,
    /// PR body/description
    pub body: String,
}

/// Pull request information returned from the forge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequest {
    /// PR number
    pub number: u64,
    /// PR URL (web URL for viewing)
    pub url: String,
}

/// Access to everything the installed integration is allowed to see.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync` so a single integration can be
/// shared by concurrent request handlers.
#[async_trait]
pub trait Integration: Send + Sync {
    /// Get the forge name (e.g., "github").
    fn name(&self) -> &'static str;

    /// List every installation of the integration.
    ///
    /// # Errors
    ///
    /// - `AuthFailed` if the integration credentials are rejected
    async fn list_installations(&self) -> Result<Vec<Installation>, ForgeError>;

    /// List every repository an installation grants access to.
    async fn list_repositories(
        &self,
        installation: &Installation,
    ) -> Result<Vec<RepositoryHandle>, ForgeError>;

    /// Open a repository for per-repository operations.
    ///
    /// The returned value holds whatever credentials are needed for the
    /// duration of one publication and must not be cached across requests.
    async fn open(&self, handle: &RepositoryHandle)
        -> Result<Box<dyn RemoteRepository>, ForgeError>;
}

/// Operations on a single remote repository.
#[async_trait]
pub trait RemoteRepository: Send + Sync {
    /// Repository full name (`owner/name`).
    fn full_name(&self) -> &str;

    /// Get the tip of a branch.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the branch does not exist
    async fn get_branch(&self, name: &str) -> Result<Branch, ForgeError>;

    /// Create a ref (e.g. `refs/heads/feature`) pointing at `sha`.
    ///
    /// # Errors
    ///
    /// - `Conflict` if the ref already exists
    async fn create_ref(&self, ref_name: &str, sha: &str) -> Result<(), ForgeError>;

    /// Read a file at `reference` (branch name or SHA).
    ///
    /// Returns [`FileContent::Absent`] when the path does not exist.
    async fn get_file_content(&self, path: &str, reference: &str)
        -> Result<FileContent, ForgeError>;

    /// Create a new file on a branch.
    async fn create_file(&self, request: CreateFileRequest) -> Result<(), ForgeError>;

    /// Replace an existing file on a branch.
    ///
    /// # Errors
    ///
    /// - `Conflict` if the remote blob no longer matches `previous_sha`
    async fn update_file(&self, request: UpdateFileRequest) -> Result<(), ForgeError>;

    /// Open a pull request.
    ///
    /// # Errors
    ///
    /// - `ApiError` with status 422 if validation fails (e.g., head doesn't exist)
    async fn create_pull_request(&self, request: CreatePrRequest)
        -> Result<PullRequest, ForgeError>;
}
