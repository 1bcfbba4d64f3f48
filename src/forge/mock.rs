//! forge::mock
//!
//! Mock integration for deterministic testing.
//!
//! # Design
//!
//! The mock provides a deterministic implementation of [`Integration`] and
//! [`RemoteRepository`]. Installations, repositories, branches and files
//! live in memory; every remote call is recorded so tests can assert which
//! operations ran (and which did not). Files belong to a branch: a new ref
//! starts with the files of the branch it was cut from, and reads and
//! writes against an unknown branch fail with `NotFound`. Failures are injected per
//! operation with [`FailOn`].
//!
//! # Example
//!
//! ```
//! use vocab_publisher::forge::mock::MockIntegration;
//! use vocab_publisher::forge::{FileContent, Integration, RemoteRepository};
//!
//! # tokio_test::block_on(async {
//! let integration = MockIntegration::new()
//!     .with_installation(1, "org", &["org/vocabs"])
//!     .with_file("org/vocabs", "animals.rdf", "abc123", b"<rdf/>");
//!
//! let installations = integration.list_installations().await.unwrap();
//! let handles = integration.list_repositories(&installations[0]).await.unwrap();
//! let repo = integration.open(&handles[0]).await.unwrap();
//!
//! let content = repo.get_file_content("animals.rdf", "main").await.unwrap();
//! assert!(matches!(content, FileContent::Found { .. }));
//! # });
//! ```

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use super::traits::{
    Branch, CreateFileRequest, CreatePrRequest, FileContent, ForgeError, Installation,
    Integration, PullRequest, RemoteRepository, RepositoryHandle, UpdateFileRequest,
};

/// SHA every mock repository's default branch starts at.
pub const MOCK_BASE_SHA: &str = "0000000000000000000000000000000000000001";

/// Mock integration for testing.
///
/// Thread-safe via internal `Arc<Mutex<...>>` wrapping. Repositories opened
/// from the integration share its state.
#[derive(Debug, Clone)]
pub struct MockIntegration {
    /// Internal state shared across clones.
    inner: Arc<Mutex<MockInner>>,
}

/// Internal mutable state.
#[derive(Debug)]
struct MockInner {
    /// Installations with the repositories they expose, in listing order.
    installations: Vec<(Installation, Vec<String>)>,
    /// Branch tips keyed by (repository, branch).
    branches: HashMap<(String, String), String>,
    /// Files keyed by (repository, branch, path): (blob sha, content).
    files: HashMap<(String, String, String), (String, Vec<u8>)>,
    /// Next PR number to assign.
    next_pr_number: u64,
    /// Counter for generated blob and commit SHAs.
    next_blob: u64,
    /// Operation to fail on (for testing error paths).
    fail_on: Option<FailOn>,
    /// Recorded operations for verification.
    operations: Vec<MockOperation>,
}

/// Configuration for which operation should fail.
#[derive(Debug, Clone)]
pub enum FailOn {
    /// Fail list_installations with the given error.
    ListInstallations(ForgeError),
    /// Fail list_repositories with the given error.
    ListRepositories(ForgeError),
    /// Fail open with the given error.
    Open(ForgeError),
    /// Fail get_branch with the given error.
    GetBranch(ForgeError),
    /// Fail create_ref with the given error.
    CreateRef(ForgeError),
    /// Fail get_file_content with the given error.
    GetFileContent(ForgeError),
    /// Fail create_file with the given error.
    CreateFile(ForgeError),
    /// Fail update_file with the given error.
    UpdateFile(ForgeError),
    /// Fail create_pull_request with the given error.
    CreatePullRequest(ForgeError),
}

/// Recorded operation for test verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockOperation {
    ListInstallations,
    ListRepositories {
        installation_id: u64,
    },
    Open {
        full_name: String,
    },
    GetBranch {
        repo: String,
        name: String,
    },
    CreateRef {
        repo: String,
        ref_name: String,
        sha: String,
    },
    GetFileContent {
        repo: String,
        path: String,
        reference: String,
    },
    CreateFile {
        repo: String,
        path: String,
        message: String,
        branch: String,
    },
    UpdateFile {
        repo: String,
        path: String,
        message: String,
        previous_sha: String,
        branch: String,
    },
    CreatePullRequest {
        repo: String,
        head: String,
        base: String,
        title: String,
        body: String,
    },
}

impl MockOperation {
    /// Whether this operation touches a repository (as opposed to discovery).
    pub fn is_repository_call(&self) -> bool {
        !matches!(
            self,
            MockOperation::ListInstallations
                | MockOperation::ListRepositories { .. }
                | MockOperation::Open { .. }
        )
    }
}

impl MockIntegration {
    /// Create a new empty mock integration.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(MockInner {
                installations: Vec::new(),
                branches: HashMap::new(),
                files: HashMap::new(),
                next_pr_number: 1,
                next_blob: 1,
                fail_on: None,
                operations: Vec::new(),
            })),
        }
    }

    /// Add an installation exposing `repos`.
    ///
    /// Every repository gets a `main` branch at [`MOCK_BASE_SHA`].
    pub fn with_installation(self, id: u64, account: &str, repos: &[&str]) -> Self {
        {
            let mut inner = self.inner.lock().unwrap();
            for repo in repos {
                inner
                    .branches
                    .entry((repo.to_string(), "main".to_string()))
                    .or_insert_with(|| MOCK_BASE_SHA.to_string());
            }
            inner.installations.push((
                Installation {
                    id,
                    account: account.to_string(),
                },
                repos.iter().map(|r| r.to_string()).collect(),
            ));
        }
        self
    }

    /// Add or move a branch.
    pub fn with_branch(self, repo: &str, name: &str, sha: &str) -> Self {
        {
            let mut inner = self.inner.lock().unwrap();
            inner
                .branches
                .insert((repo.to_string(), name.to_string()), sha.to_string());
        }
        self
    }

    /// Add a file with a known blob SHA on the repository's `main` branch.
    pub fn with_file(self, repo: &str, path: &str, sha: &str, content: &[u8]) -> Self {
        self.with_file_on(repo, "main", path, sha, content)
    }

    /// Add a file with a known blob SHA on `branch`.
    pub fn with_file_on(
        self,
        repo: &str,
        branch: &str,
        path: &str,
        sha: &str,
        content: &[u8],
    ) -> Self {
        {
            let mut inner = self.inner.lock().unwrap();
            inner.files.insert(
                (repo.to_string(), branch.to_string(), path.to_string()),
                (sha.to_string(), content.to_vec()),
            );
        }
        self
    }

    /// Configure the mock to fail on a specific operation.
    ///
    /// # Example
    ///
    /// ```
    /// use vocab_publisher::forge::mock::{MockIntegration, FailOn};
    /// use vocab_publisher::forge::ForgeError;
    ///
    /// let integration = MockIntegration::new()
    ///     .fail_on(FailOn::CreatePullRequest(ForgeError::RateLimited));
    /// ```
    pub fn fail_on(self, fail_on: FailOn) -> Self {
        {
            let mut inner = self.inner.lock().unwrap();
            inner.fail_on = Some(fail_on);
        }
        self
    }

    /// Clear the failure configuration.
    pub fn clear_fail_on(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.fail_on = None;
    }

    /// Get all recorded operations.
    pub fn operations(&self) -> Vec<MockOperation> {
        let inner = self.inner.lock().unwrap();
        inner.operations.clone()
    }

    /// Recorded operations that touched a repository.
    pub fn repository_operations(&self) -> Vec<MockOperation> {
        self.operations()
            .into_iter()
            .filter(MockOperation::is_repository_call)
            .collect()
    }

    /// Content of a file on a branch (for test verification).
    pub fn file(&self, repo: &str, branch: &str, path: &str) -> Option<(String, Vec<u8>)> {
        let inner = self.inner.lock().unwrap();
        inner
            .files
            .get(&(repo.to_string(), branch.to_string(), path.to_string()))
            .cloned()
    }

    /// Tip of a branch (for test verification).
    pub fn branch(&self, repo: &str, name: &str) -> Option<String> {
        let inner = self.inner.lock().unwrap();
        inner
            .branches
            .get(&(repo.to_string(), name.to_string()))
            .cloned()
    }

    /// Record an operation.
    fn record(&self, op: MockOperation) {
        let mut inner = self.inner.lock().unwrap();
        inner.operations.push(op);
    }

    /// Check if we should fail and return the error if so.
    fn check_fail(&self, expected: &str) -> Option<ForgeError> {
        let inner = self.inner.lock().unwrap();
        match &inner.fail_on {
            Some(FailOn::ListInstallations(e)) if expected == "list_installations" => {
                Some(e.clone())
            }
            Some(FailOn::ListRepositories(e)) if expected == "list_repositories" => Some(e.clone()),
            Some(FailOn::Open(e)) if expected == "open" => Some(e.clone()),
            Some(FailOn::GetBranch(e)) if expected == "get_branch" => Some(e.clone()),
            Some(FailOn::CreateRef(e)) if expected == "create_ref" => Some(e.clone()),
            Some(FailOn::GetFileContent(e)) if expected == "get_file_content" => Some(e.clone()),
            Some(FailOn::CreateFile(e)) if expected == "create_file" => Some(e.clone()),
            Some(FailOn::UpdateFile(e)) if expected == "update_file" => Some(e.clone()),
            Some(FailOn::CreatePullRequest(e)) if expected == "create_pull_request" => {
                Some(e.clone())
            }
            _ => None,
        }
    }
}

impl MockInner {
    /// Advance `branch` to a new commit and return the new blob SHA.
    fn commit(&mut self, branch: &(String, String)) -> String {
        let n = self.next_blob;
        self.next_blob += 1;
        self.branches.insert(branch.clone(), format!("commit{}", n));
        format!("blob{}", n)
    }
}

impl Default for MockIntegration {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Integration for MockIntegration {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn list_installations(&self) -> Result<Vec<Installation>, ForgeError> {
        self.record(MockOperation::ListInstallations);

        if let Some(err) = self.check_fail("list_installations") {
            return Err(err);
        }

        let inner = self.inner.lock().unwrap();
        Ok(inner.installations.iter().map(|(i, _)| i.clone()).collect())
    }

    async fn list_repositories(
        &self,
        installation: &Installation,
    ) -> Result<Vec<RepositoryHandle>, ForgeError> {
        self.record(MockOperation::ListRepositories {
            installation_id: installation.id,
        });

        if let Some(err) = self.check_fail("list_repositories") {
            return Err(err);
        }

        let inner = self.inner.lock().unwrap();
        let repos = inner
            .installations
            .iter()
            .find(|(i, _)| i.id == installation.id)
            .map(|(_, repos)| repos.clone())
            .ok_or_else(|| ForgeError::NotFound(format!("installation {}", installation.id)))?;

        Ok(repos
            .into_iter()
            .map(|full_name| RepositoryHandle {
                installation_id: installation.id,
                full_name,
            })
            .collect())
    }

    async fn open(
        &self,
        handle: &RepositoryHandle,
    ) -> Result<Box<dyn RemoteRepository>, ForgeError> {
        self.record(MockOperation::Open {
            full_name: handle.full_name.clone(),
        });

        if let Some(err) = self.check_fail("open") {
            return Err(err);
        }

        Ok(Box::new(MockRepository {
            full_name: handle.full_name.clone(),
            integration: self.clone(),
        }))
    }
}

/// A repository opened from a [`MockIntegration`].
#[derive(Debug, Clone)]
pub struct MockRepository {
    full_name: String,
    integration: MockIntegration,
}

impl MockRepository {
    fn key(&self, name: &str) -> (String, String) {
        (self.full_name.clone(), name.to_string())
    }

    fn file_key(&self, branch: &str, path: &str) -> (String, String, String) {
        (self.full_name.clone(), branch.to_string(), path.to_string())
    }
}

fn branch_not_found(name: &str) -> ForgeError {
    ForgeError::NotFound(format!("Branch {} not found", name))
}

#[async_trait]
impl RemoteRepository for MockRepository {
    fn full_name(&self) -> &str {
        &self.full_name
    }

    async fn get_branch(&self, name: &str) -> Result<Branch, ForgeError> {
        self.integration.record(MockOperation::GetBranch {
            repo: self.full_name.clone(),
            name: name.to_string(),
        });

        if let Some(err) = self.integration.check_fail("get_branch") {
            return Err(err);
        }

        let inner = self.integration.inner.lock().unwrap();
        inner
            .branches
            .get(&self.key(name))
            .map(|sha| Branch {
                name: name.to_string(),
                commit_sha: sha.clone(),
            })
            .ok_or_else(|| branch_not_found(name))
    }

    async fn create_ref(&self, ref_name: &str, sha: &str) -> Result<(), ForgeError> {
        self.integration.record(MockOperation::CreateRef {
            repo: self.full_name.clone(),
            ref_name: ref_name.to_string(),
            sha: sha.to_string(),
        });

        if let Some(err) = self.integration.check_fail("create_ref") {
            return Err(err);
        }

        let branch = ref_name.strip_prefix("refs/heads/").unwrap_or(ref_name);
        let mut inner = self.integration.inner.lock().unwrap();
        let key = self.key(branch);
        if inner.branches.contains_key(&key) {
            return Err(ForgeError::Conflict("Reference already exists".into()));
        }
        let source = inner
            .branches
            .iter()
            .find(|((repo, _), tip)| *repo == self.full_name && tip.as_str() == sha)
            .map(|((_, name), _)| name.clone())
            .ok_or_else(|| ForgeError::ApiError {
                status: 422,
                message: "Object does not exist".into(),
            })?;

        let inherited: Vec<_> = inner
            .files
            .iter()
            .filter(|((repo, on, _), _)| *repo == self.full_name && *on == source)
            .map(|((_, _, path), file)| (self.file_key(branch, path), file.clone()))
            .collect();
        inner.files.extend(inherited);
        inner.branches.insert(key, sha.to_string());
        Ok(())
    }

    async fn get_file_content(
        &self,
        path: &str,
        reference: &str,
    ) -> Result<FileContent, ForgeError> {
        self.integration.record(MockOperation::GetFileContent {
            repo: self.full_name.clone(),
            path: path.to_string(),
            reference: reference.to_string(),
        });

        if let Some(err) = self.integration.check_fail("get_file_content") {
            return Err(err);
        }

        let inner = self.integration.inner.lock().unwrap();
        if !inner.branches.contains_key(&self.key(reference)) {
            return Err(ForgeError::NotFound(format!(
                "No commit found for the ref {}",
                reference
            )));
        }
        Ok(match inner.files.get(&self.file_key(reference, path)) {
            Some((sha, bytes)) => FileContent::Found {
                sha: sha.clone(),
                bytes: bytes.clone(),
            },
            None => FileContent::Absent,
        })
    }

    async fn create_file(&self, request: CreateFileRequest) -> Result<(), ForgeError> {
        self.integration.record(MockOperation::CreateFile {
            repo: self.full_name.clone(),
            path: request.path.clone(),
            message: request.message.clone(),
            branch: request.branch.clone(),
        });

        if let Some(err) = self.integration.check_fail("create_file") {
            return Err(err);
        }

        let mut inner = self.integration.inner.lock().unwrap();
        if !inner.branches.contains_key(&self.key(&request.branch)) {
            return Err(branch_not_found(&request.branch));
        }
        let key = self.file_key(&request.branch, &request.path);
        if inner.files.contains_key(&key) {
            return Err(ForgeError::Conflict(
                "Invalid request.\n\n\"sha\" wasn't supplied.".into(),
            ));
        }
        let sha = inner.commit(&self.key(&request.branch));
        inner.files.insert(key, (sha, request.content));
        Ok(())
    }

    async fn update_file(&self, request: UpdateFileRequest) -> Result<(), ForgeError> {
        self.integration.record(MockOperation::UpdateFile {
            repo: self.full_name.clone(),
            path: request.path.clone(),
            message: request.message.clone(),
            previous_sha: request.previous_sha.clone(),
            branch: request.branch.clone(),
        });

        if let Some(err) = self.integration.check_fail("update_file") {
            return Err(err);
        }

        let mut inner = self.integration.inner.lock().unwrap();
        if !inner.branches.contains_key(&self.key(&request.branch)) {
            return Err(branch_not_found(&request.branch));
        }
        let key = self.file_key(&request.branch, &request.path);
        match inner.files.get(&key) {
            Some((sha, _)) if *sha == request.previous_sha => {}
            Some((sha, _)) => {
                return Err(ForgeError::Conflict(format!(
                    "{} is at {} but expected {}",
                    request.path, sha, request.previous_sha
                )))
            }
            None => return Err(ForgeError::NotFound(request.path.clone())),
        }
        let sha = inner.commit(&self.key(&request.branch));
        inner.files.insert(key, (sha, request.content));
        Ok(())
    }

    async fn create_pull_request(
        &self,
        request: CreatePrRequest,
    ) -> Result<PullRequest, ForgeError> {
        self.integration.record(MockOperation::CreatePullRequest {
            repo: self.full_name.clone(),
            head: request.head.clone(),
            base: request.base.clone(),
            title: request.title.clone(),
            body: request.body.clone(),
        });

        if let Some(err) = self.integration.check_fail("create_pull_request") {
            return Err(err);
        }

        let mut inner = self.integration.inner.lock().unwrap();
        if !inner.branches.contains_key(&self.key(&request.head)) {
            return Err(ForgeError::ApiError {
                status: 422,
                message: format!("head branch '{}' does not exist", request.head),
            });
        }
        let number = inner.next_pr_number;
        inner.next_pr_number += 1;

        Ok(PullRequest {
            number,
            url: format!("https://github.com/{}/pull/{}", self.full_name, number),
        })
    }
}
