use super::{SourceControl, Webhook};
use crate::remote::client::encode_path;
use crate::remote::{ApiClient, RemoteError};
use crate::repository::{Branch, RepositoryRef};
use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use serde::Deserialize;
use tracing::debug;

const REPOS: &str = "repos";

#[derive(Debug, Deserialize)]
struct BranchDoc {
    name: String,
    commit: CommitDoc,
}

#[derive(Debug, Deserialize)]
struct CommitDoc {
    id: String,
}

/// Client for the Gogs REST API (`/api/v1`).
#[derive(Debug, Clone)]
pub struct GogsClient {
    api: ApiClient,
}

impl GogsClient {
    pub fn new(api_url: &str, token: Option<&str>) -> Result<Self, RemoteError> {
        let mut api = ApiClient::new(api_url)?;
        if let Some(token) = token {
            api.set_header(AUTHORIZATION, &format!("token {}", token))?;
        }

        Ok(Self { api })
    }
}

#[async_trait]
impl SourceControl for GogsClient {
    async fn list_branches(&self, repo: &RepositoryRef) -> Result<Vec<Branch>, RemoteError> {
        let path = encode_path([REPOS, repo.owner.as_str(), repo.name.as_str(), "branches"]);
        let docs: Vec<BranchDoc> = self.api.get_json(&path).await?;

        debug!(repo = %repo, count = docs.len(), "Retrieved branches");

        Ok(docs
            .into_iter()
            .map(|doc| Branch::new(doc.name, doc.commit.id))
            .collect())
    }

    async fn fetch_file(
        &self,
        repo: &RepositoryRef,
        branch: &str,
        path: &str,
    ) -> Result<String, RemoteError> {
        let raw_path = encode_path([
            REPOS,
            repo.owner.as_str(),
            repo.name.as_str(),
            "raw",
            branch,
            path,
        ]);
        self.api.get_text(&raw_path).await
    }

    async fn list_webhooks(&self, repo: &RepositoryRef) -> Result<Vec<Webhook>, RemoteError> {
        let path = encode_path([REPOS, repo.owner.as_str(), repo.name.as_str(), "hooks"]);
        self.api.get_json(&path).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gogs::TokenError;
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn repo() -> RepositoryRef {
        RepositoryRef::new("docker", "python")
    }

    #[tokio::test]
    async fn test_list_branches() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/docker/python/branches"))
            .and(header("Authorization", "token gogs-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"name": "master", "commit": {"id": "abc123", "message": "init"}},
                {"name": "3.9", "commit": {"id": "def456"}}
            ])))
            .mount(&server)
            .await;

        let client = GogsClient::new(&server.uri(), Some("gogs-token")).unwrap();
        let branches = client.list_branches(&repo()).await.unwrap();

        assert_eq!(
            branches,
            vec![Branch::new("master", "abc123"), Branch::new("3.9", "def456")]
        );
    }

    #[tokio::test]
    async fn test_list_branches_malformed_document() {
        let server = MockServer::start().await;
        Mock::given(path("/repos/docker/python/branches"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "oops"})))
            .mount(&server)
            .await;

        let client = GogsClient::new(&server.uri(), None).unwrap();
        let err = client.list_branches(&repo()).await.unwrap_err();

        assert!(matches!(err, RemoteError::Decode { .. }));
    }

    #[tokio::test]
    async fn test_fetch_file_returns_raw_text() {
        let server = MockServer::start().await;
        Mock::given(path("/repos/docker/python/raw/master/Dockerfile"))
            .respond_with(ResponseTemplate::new(200).set_body_string("FROM python:3.9\n"))
            .mount(&server)
            .await;

        let client = GogsClient::new(&server.uri(), None).unwrap();
        let content = client
            .fetch_file(&repo(), "master", "Dockerfile")
            .await
            .unwrap();

        assert_eq!(content, "FROM python:3.9\n");
    }

    #[tokio::test]
    async fn test_fetch_file_escapes_branch_name() {
        let server = MockServer::start().await;
        Mock::given(path("/repos/docker/python/raw/fix%231/Dockerfile"))
            .respond_with(ResponseTemplate::new(200).set_body_string("FROM python:3.9\n"))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(path("/repos/docker/python/raw/fix/Dockerfile"))
            .respond_with(ResponseTemplate::new(200).set_body_string("FROM alpine:3.18\n"))
            .expect(0)
            .mount(&server)
            .await;

        let client = GogsClient::new(&server.uri(), None).unwrap();
        let content = client
            .fetch_file(&repo(), "fix#1", "Dockerfile")
            .await
            .unwrap();

        assert_eq!(content, "FROM python:3.9\n");
    }

    #[tokio::test]
    async fn test_fetch_file_keeps_slashes_in_branch_name() {
        let server = MockServer::start().await;
        Mock::given(path("/repos/docker/python/raw/feature/slim/Dockerfile"))
            .respond_with(ResponseTemplate::new(200).set_body_string("FROM python:3.9-slim\n"))
            .mount(&server)
            .await;

        let client = GogsClient::new(&server.uri(), None).unwrap();
        let content = client
            .fetch_file(&repo(), "feature/slim", "Dockerfile")
            .await
            .unwrap();

        assert_eq!(content, "FROM python:3.9-slim\n");
    }

    #[tokio::test]
    async fn test_recover_trigger_token() {
        let server = MockServer::start().await;
        Mock::given(path("/repos/docker/python/hooks"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"id": 1, "type": "gogs", "events": ["push"], "active": true,
                 "config": {"url": "http://drone/hook?access_token=tok", "content_type": "json"}}
            ])))
            .mount(&server)
            .await;

        let client = GogsClient::new(&server.uri(), None).unwrap();
        assert_eq!(client.recover_trigger_token(&repo()).await.unwrap(), "tok");
    }

    #[tokio::test]
    async fn test_recover_trigger_token_unreachable_hooks() {
        let server = MockServer::start().await;
        Mock::given(path("/repos/docker/python/hooks"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let client = GogsClient::new(&server.uri(), None).unwrap();
        let err = client.recover_trigger_token(&repo()).await.unwrap_err();

        match err {
            TokenError::Remote { repo, source } => {
                assert_eq!(repo, "docker/python");
                assert_eq!(source.status(), Some(403));
            }
            other => panic!("Expected Remote error, got {:?}", other),
        }
    }
}
