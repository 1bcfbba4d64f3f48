//! publish::errors
//!
//! Failure taxonomy for a publication.
//!
//! Every remote failure names the [`PublishStep`] it happened in together
//! with the repository, rendered branch and file, so an operator can
//! replay the publication by hand.

use thiserror::Error;

use crate::forge::ForgeError;

/// A step of the publication workflow that talks to the remote host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishStep {
    LocateRepository,
    OpenRepository,
    ResolveBaseBranch,
    CreateBranch,
    ReadExistingFile,
    CreateFile,
    UpdateFile,
    OpenPullRequest,
}

impl std::fmt::Display for PublishStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let step = match self {
            PublishStep::LocateRepository => "locate repository",
            PublishStep::OpenRepository => "open repository",
            PublishStep::ResolveBaseBranch => "resolve base branch",
            PublishStep::CreateBranch => "create branch",
            PublishStep::ReadExistingFile => "read existing file",
            PublishStep::CreateFile => "create file",
            PublishStep::UpdateFile => "update file",
            PublishStep::OpenPullRequest => "open pull request",
        };
        f.write_str(step)
    }
}

/// Errors from publishing a vocabulary.
#[derive(Debug, Error)]
pub enum PublishError {
    /// The request was rejected before any remote call.
    #[error("invalid request: {0}")]
    Validation(String),

    /// No installation of the integration can see the repository.
    #[error("repository '{repository}' is not accessible to the integration")]
    NotAuthorized { repository: String },

    /// The remote host refused a write because of its current state.
    #[error("{step} conflicted in '{repository}' (branch '{branch}', file '{file}'): {source}")]
    RemoteConflict {
        step: PublishStep,
        repository: String,
        branch: String,
        file: String,
        #[source]
        source: ForgeError,
    },

    /// Any other failure talking to the remote host.
    #[error("{step} failed in '{repository}' (branch '{branch}', file '{file}'): {source}")]
    RemoteFault {
        step: PublishStep,
        repository: String,
        branch: String,
        file: String,
        #[source]
        source: ForgeError,
    },
}

impl PublishError {
    /// Classify a remote failure at `step`.
    pub fn remote(
        step: PublishStep,
        repository: &str,
        branch: &str,
        file: &str,
        source: ForgeError,
    ) -> Self {
        let (repository, branch, file) =
            (repository.to_string(), branch.to_string(), file.to_string());
        if source.is_conflict() {
            PublishError::RemoteConflict {
                step,
                repository,
                branch,
                file,
                source,
            }
        } else {
            PublishError::RemoteFault {
                step,
                repository,
                branch,
                file,
                source,
            }
        }
    }

    /// The step that failed, for remote failures.
    pub fn step(&self) -> Option<PublishStep> {
        match self {
            PublishError::RemoteConflict { step, .. } | PublishError::RemoteFault { step, .. } => {
                Some(*step)
            }
            _ => None,
        }
    }

    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            PublishError::Validation(_) => "VALIDATION_ERROR",
            PublishError::NotAuthorized { .. } => "NOT_AUTHORIZED",
            PublishError::RemoteConflict { .. } => "REMOTE_CONFLICT",
            PublishError::RemoteFault { .. } => "REMOTE_FAULT",
        }
    }
}
