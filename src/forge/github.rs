//! forge::github
//!
//! GitHub implementation of [`Integration`] and [`RemoteRepository`] using
//! the REST API.
//!
//! # Design
//!
//! [`GitHubIntegration`] authenticates as the GitHub App (JWT from a
//! [`TokenProvider`]) to enumerate installations and their repositories.
//! Opening a repository exchanges a fresh installation token and returns
//! a [`GitHubRepository`] that carries it for the rest of the request.
//!
//! # Timeouts
//!
//! Every request goes through a `reqwest::Client` built with the configured
//! timeout. An expired timeout surfaces as `ForgeError::Timeout`.
//!
//! # Rate Limiting
//!
//! Returns `ForgeError::RateLimited` when limits are hit. There is no
//! automatic retry.
//!
//! # Example
//!
//! ```ignore
//! use vocab_publisher::auth::AppJwtSigner;
//! use vocab_publisher::forge::github::GitHubIntegration;
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! let signer = Arc::new(AppJwtSigner::from_pem("12345", &pem)?);
//! let integration = GitHubIntegration::new(signer, "https://api.github.com", Duration::from_secs(30))?;
//! let installations = integration.list_installations().await?;
//! ```

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::{Client, Response, StatusCode, Url};
use serde::{Deserialize, Serialize};

use super::traits::{
    Branch, CreateFileRequest, CreatePrRequest, FileContent, ForgeError, Installation,
    Integration, PullRequest, RemoteRepository, RepositoryHandle, UpdateFileRequest,
};
use crate::auth::installations::{
    create_installation_token, fetch_installation_repositories, fetch_installations,
    InstallationToken, USER_AGENT_VALUE,
};
use crate::auth::{AuthError, TokenProvider};
use crate::core::types::RepoFullName;

/// Default GitHub API base URL.
pub const DEFAULT_API_BASE: &str = "https://api.github.com";

/// Message GitHub returns when creating a ref that already exists.
const REF_EXISTS_MESSAGE: &str = "Reference already exists";

/// Message GitHub returns when a file is created over an existing path.
const SHA_MISSING_MESSAGE: &str = "\"sha\" wasn't supplied";

/// GitHub App integration.
pub struct GitHubIntegration {
    /// HTTP client shared by every repository opened from this integration
    client: Client,
    /// Provider for app JWTs
    app_token: Arc<dyn TokenProvider>,
    /// API base URL (configurable for GitHub Enterprise)
    api_base: String,
}

impl std::fmt::Debug for GitHubIntegration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubIntegration")
            .field("api_base", &self.api_base)
            .finish()
    }
}

impl GitHubIntegration {
    /// Create an integration that mints app credentials from `app_token`.
    ///
    /// # Errors
    ///
    /// Returns `ForgeError::NetworkError` if the HTTP client cannot be built.
    pub fn new(
        app_token: Arc<dyn TokenProvider>,
        api_base: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ForgeError> {
        let api_base: String = api_base.into();
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ForgeError::NetworkError(e.to_string()))?;
        Ok(Self {
            client,
            app_token,
            api_base: api_base.trim_end_matches('/').to_string(),
        })
    }

    async fn app_jwt(&self) -> Result<String, ForgeError> {
        self.app_token.bearer_token().await.map_err(auth_to_forge)
    }

    async fn installation_token(&self, installation_id: u64) -> Result<InstallationToken, ForgeError> {
        let jwt = self.app_jwt().await?;
        create_installation_token(&self.client, &self.api_base, &jwt, installation_id)
            .await
            .map_err(auth_to_forge)
    }
}

#[async_trait]
impl Integration for GitHubIntegration {
    fn name(&self) -> &'static str {
        "github"
    }

    async fn list_installations(&self) -> Result<Vec<Installation>, ForgeError> {
        let jwt = self.app_jwt().await?;
        let installations = fetch_installations(&self.client, &self.api_base, &jwt)
            .await
            .map_err(auth_to_forge)?;

        Ok(installations
            .into_iter()
            .map(|i| Installation {
                id: i.id,
                account: i.account.login,
            })
            .collect())
    }

    async fn list_repositories(
        &self,
        installation: &Installation,
    ) -> Result<Vec<RepositoryHandle>, ForgeError> {
        let token = self.installation_token(installation.id).await?;
        let names = fetch_installation_repositories(&self.client, &self.api_base, &token)
            .await
            .map_err(auth_to_forge)?;

        Ok(names
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
        let full_name = RepoFullName::new(handle.full_name.as_str())
            .map_err(|e| ForgeError::NotFound(e.to_string()))?;
        let token = self.installation_token(handle.installation_id).await?;
        let repo = GitHubRepository::new(
            self.client.clone(),
            self.api_base.clone(),
            token,
            full_name,
        );
        Ok(Box::new(repo))
    }
}

/// A repository opened with an installation token.
pub struct GitHubRepository {
    client: Client,
    api_base: String,
    token: InstallationToken,
    full_name: RepoFullName,
}

// Custom Debug to avoid exposing the installation token
impl std::fmt::Debug for GitHubRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubRepository")
            .field("full_name", &self.full_name.as_str())
            .field("api_base", &self.api_base)
            .finish()
    }
}

impl GitHubRepository {
    /// Create a repository client for `full_name`.
    pub fn new(
        client: Client,
        api_base: impl Into<String>,
        token: InstallationToken,
        full_name: RepoFullName,
    ) -> Self {
        let api_base: String = api_base.into();
        Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
            token,
            full_name,
        }
    }

    /// Build common headers for API requests.
    fn headers(&self) -> Result<HeaderMap, ForgeError> {
        let mut headers = HeaderMap::new();
        let auth = HeaderValue::from_str(&format!("Bearer {}", self.token.secret()))
            .map_err(|_| ForgeError::AuthFailed("installation token is not a valid header".into()))?;
        headers.insert(AUTHORIZATION, auth);
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));
        headers.insert(
            "X-GitHub-Api-Version",
            HeaderValue::from_static("2022-11-28"),
        );
        Ok(headers)
    }

    /// Build URL for a repository endpoint.
    ///
    /// Each segment is percent-encoded, so file paths are split on `/`
    /// before being passed in.
    fn repo_url(&self, segments: &[&str]) -> Result<Url, ForgeError> {
        let mut url = Url::parse(&self.api_base)
            .map_err(|e| ForgeError::NetworkError(format!("invalid API base: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| ForgeError::NetworkError("API base cannot be a base URL".into()))?
            .pop_if_empty()
            .extend(["repos", self.full_name.owner(), self.full_name.name()])
            .extend(segments);
        Ok(url)
    }

    fn contents_url(&self, path: &str) -> Result<Url, ForgeError> {
        let mut segments = vec!["contents"];
        segments.extend(path.split('/').filter(|s| !s.is_empty()));
        self.repo_url(&segments)
    }

    /// Handle API response, mapping errors appropriately.
    async fn handle_response<T: for<'de> Deserialize<'de>>(
        &self,
        response: Response,
    ) -> Result<T, ForgeError> {
        let status = response.status();

        if status.is_success() {
            response.json().await.map_err(|e| ForgeError::ApiError {
                status: status.as_u16(),
                message: format!("Failed to parse response: {}", e),
            })
        } else {
            Err(error_from_response(response, status).await)
        }
    }

    /// Handle a response whose body is not needed.
    async fn handle_empty_response(&self, response: Response) -> Result<(), ForgeError> {
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(error_from_response(response, status).await)
        }
    }

    async fn put_contents(&self, path: &str, body: &PutContentsBody<'_>) -> Result<(), ForgeError> {
        let response = self
            .client
            .put(self.contents_url(path)?)
            .headers(self.headers()?)
            .json(body)
            .send()
            .await
            .map_err(request_error)?;

        self.handle_empty_response(response).await
    }
}

#[async_trait]
impl RemoteRepository for GitHubRepository {
    fn full_name(&self) -> &str {
        self.full_name.as_str()
    }

    async fn get_branch(&self, name: &str) -> Result<Branch, ForgeError> {
        let response = self
            .client
            .get(self.repo_url(&["branches", name])?)
            .headers(self.headers()?)
            .send()
            .await
            .map_err(request_error)?;

        let branch: GitHubBranch = self.handle_response(response).await?;
        Ok(Branch {
            name: branch.name,
            commit_sha: branch.commit.sha,
        })
    }

    async fn create_ref(&self, ref_name: &str, sha: &str) -> Result<(), ForgeError> {
        let body = CreateRefBody {
            ref_name,
            sha,
        };

        let response = self
            .client
            .post(self.repo_url(&["git", "refs"])?)
            .headers(self.headers()?)
            .json(&body)
            .send()
            .await
            .map_err(request_error)?;

        self.handle_empty_response(response).await
    }

    async fn get_file_content(
        &self,
        path: &str,
        reference: &str,
    ) -> Result<FileContent, ForgeError> {
        let response = self
            .client
            .get(self.contents_url(path)?)
            .query(&[("ref", reference)])
            .headers(self.headers()?)
            .send()
            .await
            .map_err(request_error)?;

        let result: Result<GitHubContent, ForgeError> = self.handle_response(response).await;
        match result {
            Ok(content) => Ok(FileContent::Found {
                bytes: content.decode()?,
                sha: content.sha,
            }),
            Err(ForgeError::NotFound(_)) => Ok(FileContent::Absent),
            Err(e) => Err(e),
        }
    }

    async fn create_file(&self, request: CreateFileRequest) -> Result<(), ForgeError> {
        let body = PutContentsBody {
            message: &request.message,
            content: STANDARD.encode(&request.content),
            branch: &request.branch,
            sha: None,
        };
        self.put_contents(&request.path, &body).await
    }

    async fn update_file(&self, request: UpdateFileRequest) -> Result<(), ForgeError> {
        let body = PutContentsBody {
            message: &request.message,
            content: STANDARD.encode(&request.content),
            branch: &request.branch,
            sha: Some(&request.previous_sha),
        };
        self.put_contents(&request.path, &body).await
    }

    async fn create_pull_request(
        &self,
        request: CreatePrRequest,
    ) -> Result<PullRequest, ForgeError> {
        let body = CreatePrBody {
            head: &request.head,
            base: &request.base,
            title: &request.title,
            body: &request.body,
        };

        let response = self
            .client
            .post(self.repo_url(&["pulls"])?)
            .headers(self.headers()?)
            .json(&body)
            .send()
            .await
            .map_err(request_error)?;

        let pr: GitHubPullRequest = self.handle_response(response).await?;
        Ok(PullRequest {
            number: pr.number,
            url: pr.html_url,
        })
    }
}

/// Map a reqwest send failure, distinguishing timeouts.
fn request_error(err: reqwest::Error) -> ForgeError {
    if err.is_timeout() {
        ForgeError::Timeout(err.to_string())
    } else {
        ForgeError::NetworkError(err.to_string())
    }
}

/// Map auth-layer failures onto forge errors.
fn auth_to_forge(err: AuthError) -> ForgeError {
    match err {
        AuthError::NotAuthenticated(msg) => ForgeError::AuthFailed(msg),
        AuthError::InvalidPrivateKey(_) | AuthError::Signing(_) => {
            ForgeError::AuthFailed(err.to_string())
        }
        AuthError::Network(msg) => ForgeError::NetworkError(msg),
        AuthError::Timeout(msg) => ForgeError::Timeout(msg),
        AuthError::GitHubApi { status: 403, message } => ForgeError::AuthFailed(message),
        AuthError::GitHubApi { status: 404, message } => ForgeError::NotFound(message),
        AuthError::GitHubApi { status: 429, .. } => ForgeError::RateLimited,
        AuthError::GitHubApi { status, message } => ForgeError::ApiError { status, message },
        AuthError::Truncated { .. } => ForgeError::ApiError {
            status: 200,
            message: err.to_string(),
        },
    }
}

/// Build a `ForgeError` from an unsuccessful response.
async fn error_from_response(response: Response, status: StatusCode) -> ForgeError {
    // Extract permission headers before consuming response body.
    let required_permissions = response
        .headers()
        .get("X-Accepted-GitHub-Permissions")
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string());

    // Try to get error message from body
    let message = match response.json::<GitHubErrorResponse>().await {
        Ok(err) => err.message,
        Err(_) => "Unknown error".to_string(),
    };

    classify_status(status, message, required_permissions)
}

fn classify_status(
    status: StatusCode,
    message: String,
    required_permissions: Option<String>,
) -> ForgeError {
    match status {
        StatusCode::UNAUTHORIZED => ForgeError::AuthFailed("Invalid or expired token".into()),
        StatusCode::FORBIDDEN => {
            let mut err_msg = format!("Permission denied: {}", message);
            if let Some(perms) = required_permissions.filter(|p| !p.is_empty()) {
                err_msg.push_str(&format!(" [required: {}]", perms));
            }
            ForgeError::AuthFailed(err_msg)
        }
        StatusCode::NOT_FOUND => ForgeError::NotFound(message),
        StatusCode::CONFLICT => ForgeError::Conflict(message),
        StatusCode::UNPROCESSABLE_ENTITY
            if message.contains(REF_EXISTS_MESSAGE) || message.contains(SHA_MISSING_MESSAGE) =>
        {
            ForgeError::Conflict(message)
        }
        StatusCode::TOO_MANY_REQUESTS => ForgeError::RateLimited,
        _ if status.is_server_error() => ForgeError::ApiError {
            status: status.as_u16(),
            message: format!("GitHub server error: {}", message),
        },
        _ => ForgeError::ApiError {
            status: status.as_u16(),
            message,
        },
    }
}

// =============================================================================
// API request/response types
// =============================================================================

#[derive(Serialize)]
struct CreateRefBody<'a> {
    #[serde(rename = "ref")]
    ref_name: &'a str,
    sha: &'a str,
}

#[derive(Serialize)]
struct PutContentsBody<'a> {
    message: &'a str,
    content: String,
    branch: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    sha: Option<&'a str>,
}

#[derive(Serialize)]
struct CreatePrBody<'a> {
    head: &'a str,
    base: &'a str,
    title: &'a str,
    body: &'a str,
}

#[derive(Deserialize)]
struct GitHubErrorResponse {
    message: String,
}

#[derive(Deserialize)]
struct GitHubBranch {
    name: String,
    commit: GitHubCommitRef,
}

#[derive(Deserialize)]
struct GitHubCommitRef {
    sha: String,
}

#[derive(Deserialize)]
struct GitHubContent {
    sha: String,
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    encoding: Option<String>,
}

impl GitHubContent {
    /// Decode the base64 payload. GitHub wraps it at 60 columns.
    fn decode(&self) -> Result<Vec<u8>, ForgeError> {
        let Some(content) = &self.content else {
            return Ok(Vec::new());
        };
        match self.encoding.as_deref() {
            Some("base64") | None => {
                let compact: String = content.chars().filter(|c| !c.is_whitespace()).collect();
                STANDARD.decode(compact).map_err(|e| ForgeError::ApiError {
                    status: 200,
                    message: format!("Failed to decode file content: {}", e),
                })
            }
            Some(_) => Ok(content.clone().into_bytes()),
        }
    }
}

#[derive(Deserialize)]
struct GitHubPullRequest {
    number: u64,
    html_url: String,
}
