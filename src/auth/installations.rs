//! auth::installations
//!
//! GitHub App installation and repository access queries.
//!
//! # Algorithm
//!
//! 1. Query `GET /app/installations` (app JWT) to list every installation
//! 2. For an installation, exchange an installation access token via
//!    `POST /app/installations/{id}/access_tokens` (app JWT)
//! 3. Query `GET /installation/repositories` (installation token) to list
//!    the repositories that installation grants access to
//!
//! Listing endpoints are paginated at 100 entries per page. A listing that
//! is still returning full pages at the page limit is an error, never a
//! shortened list.
//!
//! # Security
//!
//! All API calls use bearer token authentication. Tokens are never logged
//! or included in error messages.

use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;

use super::errors::AuthError;

/// Entries requested per page on listing endpoints.
const PER_PAGE: usize = 100;

/// Upper bound on pages fetched from one listing endpoint.
pub const MAX_PAGES: u32 = 100;

/// User-Agent header value for API requests.
pub const USER_AGENT_VALUE: &str = "vocab-publisher";

/// A GitHub App installation
#[derive(Debug, Clone, Deserialize)]
pub struct InstallationInfo {
    /// Installation ID
    pub id: u64,
    /// Account (user or org) that owns the installation
    pub account: InstallationAccount,
}

/// Account (user or org) that owns the installation
#[derive(Debug, Clone, Deserialize)]
pub struct InstallationAccount {
    /// Account login
    pub login: String,
}

/// Response from GET /installation/repositories
#[derive(Debug, Deserialize)]
struct RepositoriesResponse {
    repositories: Vec<RepositoryInfo>,
}

/// A repository accessible through an installation
#[derive(Debug, Deserialize)]
struct RepositoryInfo {
    full_name: String,
}

/// Response from POST /app/installations/{id}/access_tokens
#[derive(Deserialize)]
struct AccessTokenResponse {
    token: String,
}

/// Short-lived token scoped to one installation.
#[derive(Clone)]
pub struct InstallationToken {
    token: String,
}

impl InstallationToken {
    /// Wrap a raw token value.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }

    /// The raw token value, for building an `Authorization` header.
    pub fn secret(&self) -> &str {
        &self.token
    }
}

impl std::fmt::Debug for InstallationToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InstallationToken")
            .field("token", &"[REDACTED]")
            .finish()
    }
}

/// Common headers for GitHub API requests.
pub fn github_headers(token: &str) -> Vec<(&'static str, String)> {
    vec![
        ("Authorization", format!("Bearer {}", token)),
        ("Accept", "application/vnd.github+json".to_string()),
        ("User-Agent", USER_AGENT_VALUE.to_string()),
        ("X-GitHub-Api-Version", "2022-11-28".to_string()),
    ]
}

/// Fetch all installations of the app.
pub async fn fetch_installations(
    client: &Client,
    base_url: &str,
    app_jwt: &str,
) -> Result<Vec<InstallationInfo>, AuthError> {
    let url = format!("{}/app/installations", base_url);
    let mut installations = Vec::new();
    let mut page = 1u32;

    loop {
        let mut request = client.get(&url).query(&[
            ("page", page.to_string()),
            ("per_page", PER_PAGE.to_string()),
        ]);
        for (key, value) in github_headers(app_jwt) {
            request = request.header(key, value);
        }

        let response = check_status(request.send().await?).await?;
        let batch: Vec<InstallationInfo> = response.json().await?;
        let done = batch.len() < PER_PAGE;
        installations.extend(batch);

        if done {
            break;
        }
        if page == MAX_PAGES {
            return Err(truncated("/app/installations"));
        }
        page += 1;
    }

    Ok(installations)
}

/// Exchange the app JWT for an access token scoped to one installation.
pub async fn create_installation_token(
    client: &Client,
    base_url: &str,
    app_jwt: &str,
    installation_id: u64,
) -> Result<InstallationToken, AuthError> {
    let url = format!(
        "{}/app/installations/{}/access_tokens",
        base_url, installation_id
    );
    let mut request = client.post(&url);
    for (key, value) in github_headers(app_jwt) {
        request = request.header(key, value);
    }

    let response = check_status(request.send().await?).await?;
    let data: AccessTokenResponse = response.json().await?;
    Ok(InstallationToken::new(data.token))
}

/// List the full names of every repository the installation token can access.
pub async fn fetch_installation_repositories(
    client: &Client,
    base_url: &str,
    token: &InstallationToken,
) -> Result<Vec<String>, AuthError> {
    let url = format!("{}/installation/repositories", base_url);
    let mut names = Vec::new();
    let mut page = 1u32;

    loop {
        let mut request = client.get(&url).query(&[
            ("page", page.to_string()),
            ("per_page", PER_PAGE.to_string()),
        ]);
        for (key, value) in github_headers(token.secret()) {
            request = request.header(key, value);
        }

        let response = check_status(request.send().await?).await?;
        let data: RepositoriesResponse = response.json().await?;
        let done = data.repositories.len() < PER_PAGE;
        names.extend(data.repositories.into_iter().map(|r| r.full_name));

        if done {
            break;
        }
        if page == MAX_PAGES {
            return Err(truncated("/installation/repositories"));
        }
        page += 1;
    }

    Ok(names)
}

fn truncated(endpoint: &str) -> AuthError {
    AuthError::Truncated {
        endpoint: endpoint.to_string(),
        pages: MAX_PAGES,
    }
}

/// Map non-success statuses to `AuthError`.
async fn check_status(response: Response) -> Result<Response, AuthError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    if status == StatusCode::UNAUTHORIZED {
        return Err(AuthError::NotAuthenticated(
            "credentials rejected by GitHub".to_string(),
        ));
    }

    let message = response.text().await.unwrap_or_default();
    Err(AuthError::GitHubApi {
        status: status.as_u16(),
        message,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn github_headers_includes_auth() {
        let headers = github_headers("test_token");

        let auth_header = headers.iter().find(|(k, _)| *k == "Authorization");
        assert!(auth_header.is_some());
        assert_eq!(auth_header.unwrap().1, "Bearer test_token");
    }

    #[test]
    fn github_headers_includes_version() {
        let headers = github_headers("test_token");

        let version_header = headers.iter().find(|(k, _)| *k == "X-GitHub-Api-Version");
        assert!(version_header.is_some());
        assert_eq!(version_header.unwrap().1, "2022-11-28");
    }

    #[test]
    fn installation_token_debug_is_redacted() {
        let token = InstallationToken::new("ghs_supersecret");
        let debug = format!("{:?}", token);
        assert!(!debug.contains("ghs_supersecret"));
        assert!(debug.contains("REDACTED"));
        assert_eq!(token.secret(), "ghs_supersecret");
    }
}
