//! Integration tests for the GitHub REST client.
//!
//! These tests run `GitHubIntegration` against a local wiremock server
//! standing in for the GitHub API.

use std::sync::Arc;
use std::time::Duration;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use chrono::NaiveDate;
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use vocab_publisher::auth::StaticToken;
use vocab_publisher::core::naming::TemplateSet;
use vocab_publisher::core::types::RepoFullName;
use vocab_publisher::forge::github::GitHubIntegration;
use vocab_publisher::forge::{
    CreateFileRequest, CreatePrRequest, FileContent, ForgeError, Integration, RemoteRepository,
    RepositoryHandle, UpdateFileRequest,
};
use vocab_publisher::publish::{
    locate, LocateError, PublicationRequest, PublishError, PublishStep, Publisher,
};

const APP_JWT: &str = "app-jwt";
const INSTALLATION_TOKEN: &str = "ghs_installation";

fn integration(server: &MockServer) -> GitHubIntegration {
    GitHubIntegration::new(
        Arc::new(StaticToken::new(APP_JWT)),
        server.uri(),
        Duration::from_secs(5),
    )
    .unwrap()
}

async fn mount_token_exchange(server: &MockServer, installation_id: u64) {
    Mock::given(method("POST"))
        .and(path(format!(
            "/app/installations/{}/access_tokens",
            installation_id
        )))
        .and(header("authorization", format!("Bearer {}", APP_JWT).as_str()))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "token": INSTALLATION_TOKEN,
            "expires_at": "2030-01-01T00:00:00Z"
        })))
        .mount(server)
        .await;
}

async fn open_repo(server: &MockServer) -> Box<dyn RemoteRepository> {
    mount_token_exchange(server, 9).await;
    integration(server)
        .open(&RepositoryHandle {
            installation_id: 9,
            full_name: "org/vocabs".into(),
        })
        .await
        .unwrap()
}

// =============================================================================
// Discovery
// =============================================================================

mod discovery {
    use super::*;

    #[tokio::test]
    async fn lists_installations_with_app_jwt() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/app/installations"))
            .and(header("authorization", "Bearer app-jwt"))
            .and(query_param("page", "1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                { "id": 7, "account": { "login": "alice" } },
                { "id": 9, "account": { "login": "org" } }
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let installations = integration(&server).list_installations().await.unwrap();

        assert_eq!(installations.len(), 2);
        assert_eq!(installations[1].id, 9);
        assert_eq!(installations[1].account, "org");
    }

    #[tokio::test]
    async fn lists_repositories_with_installation_token() {
        let server = MockServer::start().await;
        mount_token_exchange(&server, 9).await;
        Mock::given(method("GET"))
            .and(path("/installation/repositories"))
            .and(header("authorization", "Bearer ghs_installation"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "total_count": 2,
                "repositories": [
                    { "full_name": "org/site" },
                    { "full_name": "org/vocabs" }
                ]
            })))
            .mount(&server)
            .await;

        let integration = integration(&server);
        let installations = vec![vocab_publisher::forge::Installation {
            id: 9,
            account: "org".into(),
        }];
        let repos = integration
            .list_repositories(&installations[0])
            .await
            .unwrap();

        assert_eq!(
            repos,
            vec![
                RepositoryHandle {
                    installation_id: 9,
                    full_name: "org/site".into()
                },
                RepositoryHandle {
                    installation_id: 9,
                    full_name: "org/vocabs".into()
                },
            ]
        );
    }

    #[tokio::test]
    async fn repository_listing_past_page_limit_is_an_error() {
        let server = MockServer::start().await;
        mount_token_exchange(&server, 9).await;
        Mock::given(method("GET"))
            .and(path("/app/installations"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                { "id": 9, "account": { "login": "org" } }
            ])))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/installation/repositories"))
            .and(query_param("page", "101"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "repositories": [{ "full_name": "org/vocabs" }]
            })))
            .mount(&server)
            .await;
        let filler: Vec<_> = (0..100)
            .map(|i| json!({ "full_name": format!("org/filler-{}", i) }))
            .collect();
        Mock::given(method("GET"))
            .and(path("/installation/repositories"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "repositories": filler })),
            )
            .mount(&server)
            .await;

        let integration = integration(&server);
        let target = RepoFullName::new("org/vocabs").unwrap();
        let err = locate(&integration, &target).await.unwrap_err();

        match err {
            LocateError::Remote(ForgeError::ApiError { message, .. }) => {
                assert!(message.contains("/installation/repositories"));
            }
            other => panic!("expected listing failure, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn rejected_app_jwt_is_auth_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/app/installations"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "message": "Bad credentials"
            })))
            .mount(&server)
            .await;

        let err = integration(&server).list_installations().await.unwrap_err();
        assert!(matches!(err, ForgeError::AuthFailed(_)));
    }
}

// =============================================================================
// Repository operations
// =============================================================================

mod repository {
    use super::*;

    #[tokio::test]
    async fn get_branch_returns_tip() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/org/vocabs/branches/main"))
            .and(header("authorization", "Bearer ghs_installation"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "name": "main",
                "commit": { "sha": "c0ffee" }
            })))
            .mount(&server)
            .await;

        let repo = open_repo(&server).await;
        let branch = repo.get_branch("main").await.unwrap();
        assert_eq!(branch.commit_sha, "c0ffee");
    }

    #[tokio::test]
    async fn create_ref_posts_ref_and_sha() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/repos/org/vocabs/git/refs"))
            .and(body_partial_json(json!({
                "ref": "refs/heads/202401020304_animals",
                "sha": "c0ffee"
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "ref": "refs/heads/202401020304_animals"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let repo = open_repo(&server).await;
        repo.create_ref("refs/heads/202401020304_animals", "c0ffee")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn existing_ref_is_conflict() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/repos/org/vocabs/git/refs"))
            .respond_with(ResponseTemplate::new(422).set_body_json(json!({
                "message": "Reference already exists"
            })))
            .mount(&server)
            .await;

        let repo = open_repo(&server).await;
        let err = repo
            .create_ref("refs/heads/202401020304_animals", "c0ffee")
            .await
            .unwrap_err();
        assert!(err.is_conflict());
    }

    #[tokio::test]
    async fn file_content_is_decoded() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/org/vocabs/contents/vocabs/animals.rdf"))
            .and(query_param("ref", "main"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "sha": "abc123",
                "encoding": "base64",
                "content": "PHJkZjpS\nREYvPg==\n"
            })))
            .mount(&server)
            .await;

        let repo = open_repo(&server).await;
        let content = repo
            .get_file_content("vocabs/animals.rdf", "main")
            .await
            .unwrap();
        assert_eq!(
            content,
            FileContent::Found {
                sha: "abc123".into(),
                bytes: b"<rdf:RDF/>".to_vec(),
            }
        );
    }

    #[tokio::test]
    async fn missing_file_is_absent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/org/vocabs/contents/animals.rdf"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "message": "Not Found"
            })))
            .mount(&server)
            .await;

        let repo = open_repo(&server).await;
        assert_eq!(
            repo.get_file_content("animals.rdf", "main").await.unwrap(),
            FileContent::Absent
        );
    }

    #[tokio::test]
    async fn file_lookup_server_error_is_not_absent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/org/vocabs/contents/animals.rdf"))
            .respond_with(ResponseTemplate::new(500).set_body_json(json!({
                "message": "Server Error"
            })))
            .mount(&server)
            .await;

        let repo = open_repo(&server).await;
        let err = repo.get_file_content("animals.rdf", "main").await.unwrap_err();
        assert!(matches!(err, ForgeError::ApiError { status: 500, .. }));
    }

    #[tokio::test]
    async fn create_file_sends_base64_without_sha() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/repos/org/vocabs/contents/animals.rdf"))
            .and(body_partial_json(json!({
                "message": "Commit into animals vocabulary",
                "content": STANDARD.encode(b"<rdf:RDF/>"),
                "branch": "202401020304_animals"
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({})))
            .expect(1)
            .mount(&server)
            .await;

        let repo = open_repo(&server).await;
        repo.create_file(CreateFileRequest {
            path: "animals.rdf".into(),
            message: "Commit into animals vocabulary".into(),
            content: b"<rdf:RDF/>".to_vec(),
            branch: "202401020304_animals".into(),
        })
        .await
        .unwrap();

        let requests = server.received_requests().await.unwrap();
        let put = requests
            .iter()
            .find(|r| r.method.as_str() == "PUT")
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&put.body).unwrap();
        assert!(body.get("sha").is_none());
    }

    #[tokio::test]
    async fn update_file_sends_previous_sha() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/repos/org/vocabs/contents/animals.rdf"))
            .and(body_partial_json(json!({
                "sha": "abc123",
                "branch": "202401020304_animals"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .expect(1)
            .mount(&server)
            .await;

        let repo = open_repo(&server).await;
        repo.update_file(UpdateFileRequest {
            path: "animals.rdf".into(),
            message: "Commit into animals vocabulary".into(),
            content: b"<rdf:RDF/>".to_vec(),
            previous_sha: "abc123".into(),
            branch: "202401020304_animals".into(),
        })
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn sha_mismatch_is_conflict() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/repos/org/vocabs/contents/animals.rdf"))
            .respond_with(ResponseTemplate::new(409).set_body_json(json!({
                "message": "animals.rdf does not match abc123"
            })))
            .mount(&server)
            .await;

        let repo = open_repo(&server).await;
        let err = repo
            .update_file(UpdateFileRequest {
                path: "animals.rdf".into(),
                message: "m".into(),
                content: b"x".to_vec(),
                previous_sha: "abc123".into(),
                branch: "b".into(),
            })
            .await
            .unwrap_err();
        assert!(err.is_conflict());
    }

    #[tokio::test]
    async fn create_over_concurrently_added_file_is_conflict() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/repos/org/vocabs/contents/animals.rdf"))
            .respond_with(ResponseTemplate::new(422).set_body_json(json!({
                "message": "Invalid request.\n\n\"sha\" wasn't supplied."
            })))
            .mount(&server)
            .await;

        let repo = open_repo(&server).await;
        let err = repo
            .create_file(CreateFileRequest {
                path: "animals.rdf".into(),
                message: "m".into(),
                content: b"x".to_vec(),
                branch: "b".into(),
            })
            .await
            .unwrap_err();
        assert!(err.is_conflict());
    }

    #[tokio::test]
    async fn create_pull_request_returns_html_url() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/repos/org/vocabs/pulls"))
            .and(body_partial_json(json!({
                "head": "202401020304_animals",
                "base": "main",
                "title": "Release: 02/01/2024 - animals"
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "number": 12,
                "html_url": "https://github.com/org/vocabs/pull/12"
            })))
            .mount(&server)
            .await;

        let repo = open_repo(&server).await;
        let pr = repo
            .create_pull_request(CreatePrRequest {
                head: "202401020304_animals".into(),
                base: "main".into(),
                title: "Release: 02/01/2024 - animals".into(),
                body: "Description of the release".into(),
            })
            .await
            .unwrap();
        assert_eq!(pr.number, 12);
        assert_eq!(pr.url, "https://github.com/org/vocabs/pull/12");
    }

    #[tokio::test]
    async fn rate_limit_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/org/vocabs/branches/main"))
            .respond_with(ResponseTemplate::new(429).set_body_json(json!({
                "message": "API rate limit exceeded"
            })))
            .mount(&server)
            .await;

        let repo = open_repo(&server).await;
        assert_eq!(
            repo.get_branch("main").await.unwrap_err(),
            ForgeError::RateLimited
        );
    }

    #[tokio::test]
    async fn slow_response_times_out() {
        let server = MockServer::start().await;
        mount_token_exchange(&server, 9).await;
        Mock::given(method("GET"))
            .and(path("/repos/org/vocabs/branches/main"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_delay(Duration::from_secs(2))
                    .set_body_json(json!({ "name": "main", "commit": { "sha": "c0ffee" } })),
            )
            .mount(&server)
            .await;

        let integration = GitHubIntegration::new(
            Arc::new(StaticToken::new(APP_JWT)),
            server.uri(),
            Duration::from_millis(200),
        )
        .unwrap();
        let repo = integration
            .open(&RepositoryHandle {
                installation_id: 9,
                full_name: "org/vocabs".into(),
            })
            .await
            .unwrap();

        assert!(matches!(
            repo.get_branch("main").await,
            Err(ForgeError::Timeout(_))
        ));
    }
}

// =============================================================================
// Full publication over HTTP
// =============================================================================

mod end_to_end {
    use super::*;

    async fn mount_discovery(server: &MockServer) {
        Mock::given(method("GET"))
            .and(path("/app/installations"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                { "id": 9, "account": { "login": "org" } }
            ])))
            .mount(server)
            .await;
        mount_token_exchange(server, 9).await;
        Mock::given(method("GET"))
            .and(path("/installation/repositories"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "repositories": [{ "full_name": "org/vocabs" }]
            })))
            .mount(server)
            .await;
        Mock::given(method("GET"))
            .and(path("/repos/org/vocabs/branches/main"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "name": "main",
                "commit": { "sha": "c0ffee" }
            })))
            .mount(server)
            .await;
    }

    fn request() -> PublicationRequest {
        let time = NaiveDate::from_ymd_opt(2024, 1, 2)
            .unwrap()
            .and_hms_opt(3, 4, 0)
            .unwrap();
        PublicationRequest::new("animals", "org/vocabs", "animals.rdf", b"<rdf:RDF/>".to_vec(), time)
            .unwrap()
    }

    #[tokio::test]
    async fn publishes_new_file() {
        let server = MockServer::start().await;
        mount_discovery(&server).await;
        Mock::given(method("POST"))
            .and(path("/repos/org/vocabs/git/refs"))
            .and(body_partial_json(json!({
                "ref": "refs/heads/202401020304_animals",
                "sha": "c0ffee"
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({})))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/repos/org/vocabs/contents/animals.rdf"))
            .and(query_param("ref", "main"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "message": "Not Found" })))
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path("/repos/org/vocabs/contents/animals.rdf"))
            .and(body_partial_json(json!({ "branch": "202401020304_animals" })))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({})))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/repos/org/vocabs/pulls"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "number": 3,
                "html_url": "https://github.com/org/vocabs/pull/3"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let publisher = Publisher::new(Arc::new(integration(&server)), TemplateSet::default(), "main");
        let result = publisher.publish(&request()).await.unwrap();

        assert_eq!(result.branch_name, "202401020304_animals");
        assert_eq!(result.pull_request_url, "https://github.com/org/vocabs/pull/3");
    }

    #[tokio::test]
    async fn existing_branch_stops_before_upload() {
        let server = MockServer::start().await;
        mount_discovery(&server).await;
        Mock::given(method("POST"))
            .and(path("/repos/org/vocabs/git/refs"))
            .respond_with(ResponseTemplate::new(422).set_body_json(json!({
                "message": "Reference already exists"
            })))
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(201))
            .expect(0)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/repos/org/vocabs/pulls"))
            .respond_with(ResponseTemplate::new(201))
            .expect(0)
            .mount(&server)
            .await;

        let publisher = Publisher::new(Arc::new(integration(&server)), TemplateSet::default(), "main");
        let err = publisher.publish(&request()).await.unwrap_err();

        assert!(matches!(err, PublishError::RemoteConflict { .. }));
        assert_eq!(err.step(), Some(PublishStep::CreateBranch));
    }
}
