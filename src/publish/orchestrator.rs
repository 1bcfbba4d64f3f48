//! publish::orchestrator
//!
//! The branch → commit → pull request workflow.
//!
//! # Algorithm
//!
//! 1. Render the four templates from the request's vocabulary name and time
//! 2. Check the rendered branch is a usable Git branch name
//! 3. Locate the repository among the integration's installations
//! 4. Read the tip of the default branch
//! 5. Create `refs/heads/<branch>` at that tip
//! 6. Look the file up on the default branch, then update it (with the
//!    previous blob SHA) or create it on the new branch
//! 7. Open a pull request from the new branch into the default branch
//!
//! Steps run strictly in order and any failure aborts the rest. Nothing
//! is rolled back: a branch or commit made before a later failure stays on
//! the remote, named after the vocabulary and time so it can be found.

use std::sync::Arc;

use tracing::{error, info, info_span, Instrument};

use super::locator::{locate, LocateError};
use super::{PublicationRequest, PublicationResult, PublishError, PublishStep};
use crate::core::config::Config;
use crate::core::naming::{RenderedNames, TemplateSet, TemplateValues};
use crate::core::types::BranchName;
use crate::forge::{
    CreateFileRequest, CreatePrRequest, FileContent, ForgeError, Integration, UpdateFileRequest,
};

/// Publishes vocabularies through an [`Integration`].
///
/// Holds only read-only state, so one `Publisher` can serve any number of
/// concurrent requests.
#[derive(Clone)]
pub struct Publisher {
    integration: Arc<dyn Integration>,
    templates: TemplateSet,
    default_branch: String,
}

impl std::fmt::Debug for Publisher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Publisher")
            .field("integration", &self.integration.name())
            .field("templates", &self.templates)
            .field("default_branch", &self.default_branch)
            .finish()
    }
}

impl Publisher {
    pub fn new(
        integration: Arc<dyn Integration>,
        templates: TemplateSet,
        default_branch: impl Into<String>,
    ) -> Self {
        Self {
            integration,
            templates,
            default_branch: default_branch.into(),
        }
    }

    /// Build a publisher using the configured templates and default branch.
    pub fn from_config(integration: Arc<dyn Integration>, config: &Config) -> Self {
        Self::new(
            integration,
            config.templates.clone(),
            config.github.default_branch.clone(),
        )
    }

    /// Render every name for `request` without touching the remote.
    pub fn render(&self, request: &PublicationRequest) -> RenderedNames {
        let values = TemplateValues::new(request.vocabulary_name(), request.request_time());
        self.templates.render(&values)
    }

    /// Publish `request`, returning the result only once the pull request
    /// is open.
    ///
    /// # Errors
    ///
    /// - `Validation` if the rendered branch name is not a valid branch
    /// - `NotAuthorized` if no installation can see the repository
    /// - `RemoteConflict` if the branch already exists or the file changed
    ///   underneath the update
    /// - `RemoteFault` for any other remote failure
    pub async fn publish(
        &self,
        request: &PublicationRequest,
    ) -> Result<PublicationResult, PublishError> {
        let span = info_span!(
            "publish",
            repo = %request.repository(),
            vocabulary = %request.vocabulary_name(),
        );
        let result = self.run(request).instrument(span.clone()).await;
        if let Err(err) = &result {
            span.in_scope(|| error!(error = %err, "publication failed"));
        }
        result
    }

    async fn run(&self, request: &PublicationRequest) -> Result<PublicationResult, PublishError> {
        let names = self.render(request);
        let branch = BranchName::new(names.branch.as_str())
            .map_err(|e| PublishError::Validation(e.to_string()))?;

        let repository = request.repository().as_str();
        let branch_name = branch.as_str();
        let file = request.file_name();
        let fail = |step: PublishStep| {
            move |source: ForgeError| PublishError::remote(step, repository, branch_name, file, source)
        };

        info!("searching repository among installations");
        let handle = locate(self.integration.as_ref(), request.repository())
            .await
            .map_err(|e| match e {
                LocateError::NotAuthorized(repository) => PublishError::NotAuthorized { repository },
                LocateError::Remote(source) => fail(PublishStep::LocateRepository)(source),
            })?;
        let repo = self
            .integration
            .open(&handle)
            .await
            .map_err(fail(PublishStep::OpenRepository))?;

        let base = repo
            .get_branch(&self.default_branch)
            .await
            .map_err(fail(PublishStep::ResolveBaseBranch))?;

        info!(branch = %branch, base = %base.commit_sha, "creating branch");
        repo.create_ref(&branch.ref_name(), &base.commit_sha)
            .await
            .map_err(fail(PublishStep::CreateBranch))?;

        let existing = repo
            .get_file_content(file, &self.default_branch)
            .await
            .map_err(fail(PublishStep::ReadExistingFile))?;
        match existing {
            FileContent::Found { sha, .. } => {
                info!(file, previous_sha = %sha, "updating file");
                repo.update_file(UpdateFileRequest {
                    path: file.to_string(),
                    message: names.commit_message.clone(),
                    content: request.content().to_vec(),
                    previous_sha: sha,
                    branch: branch.to_string(),
                })
                .await
                .map_err(fail(PublishStep::UpdateFile))?;
            }
            FileContent::Absent => {
                info!(file, "creating file");
                repo.create_file(CreateFileRequest {
                    path: file.to_string(),
                    message: names.commit_message.clone(),
                    content: request.content().to_vec(),
                    branch: branch.to_string(),
                })
                .await
                .map_err(fail(PublishStep::CreateFile))?;
            }
        }

        info!(head = %branch, base = %self.default_branch, "opening pull request");
        let pr = repo
            .create_pull_request(CreatePrRequest {
                head: branch.to_string(),
                base: self.default_branch.clone(),
                title: names.pr_title,
                body: names.pr_description,
            })
            .await
            .map_err(fail(PublishStep::OpenPullRequest))?;

        let result = PublicationResult {
            repository_full_name: repo.full_name().to_string(),
            pushed_file_name: file.to_string(),
            branch_name: branch.to_string(),
            pull_request_url: pr.url,
        };
        info!(url = %result.pull_request_url, number = pr.number, "pull request opened");
        Ok(result)
    }
}
