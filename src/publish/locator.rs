//! publish::locator
//!
//! Find the repository handle for a full name among everything the
//! integration can see.

use thiserror::Error;
use tracing::debug;

use crate::core::types::RepoFullName;
use crate::forge::{ForgeError, Integration, RepositoryHandle};

/// Errors from locating a repository.
#[derive(Debug, Error)]
pub enum LocateError {
    /// No installation exposes the repository.
    #[error("repository '{0}' is not visible to any installation")]
    NotAuthorized(String),

    /// Listing installations or repositories failed.
    #[error(transparent)]
    Remote(#[from] ForgeError),
}

/// Scan every installation's repositories for `full_name`.
///
/// Installations and repositories are visited in the order the
/// integration lists them; the first exact match wins.
pub async fn locate(
    integration: &dyn Integration,
    full_name: &RepoFullName,
) -> Result<RepositoryHandle, LocateError> {
    for installation in integration.list_installations().await? {
        let repositories = integration.list_repositories(&installation).await?;
        debug!(
            installation = installation.id,
            account = %installation.account,
            count = repositories.len(),
            "searching installation"
        );
        if let Some(handle) = repositories
            .into_iter()
            .find(|r| r.full_name == full_name.as_str())
        {
            return Ok(handle);
        }
    }
    Err(LocateError::NotAuthorized(full_name.to_string()))
}
