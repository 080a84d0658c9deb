use super::payload::{HookPayload, HookResponse};
use super::{BuildService, Rejection};
use crate::remote::client::header_value;
use crate::remote::{ApiClient, RemoteError};
use crate::repository::{Branch, RepositoryRef};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, AUTHORIZATION, CONTENT_TYPE};
use serde::Deserialize;
use tracing::debug;

const GOGS_EVENT_HEADER: &str = "x-gogs-event";
const HOOK_CONTENT_TYPE: &str = "application/json; charset=utf-8";

#[derive(Debug, Deserialize)]
struct RepoDoc {
    owner: String,
    name: String,
}

/// Client for the Drone REST API.
#[derive(Debug, Clone)]
pub struct DroneClient {
    api: ApiClient,
}

impl DroneClient {
    pub fn new(api_url: &str, token: Option<&str>) -> Result<Self, RemoteError> {
        let mut api = ApiClient::new(api_url)?;
        if let Some(token) = token {
            api.set_header(AUTHORIZATION, token)?;
        }

        Ok(Self { api })
    }

    fn hook_headers(token: &str) -> Result<HeaderMap, RemoteError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, header_value(&CONTENT_TYPE, HOOK_CONTENT_TYPE)?);

        let event = HeaderName::from_static(GOGS_EVENT_HEADER);
        headers.insert(event.clone(), header_value(&event, "push")?);
        headers.insert(AUTHORIZATION, header_value(&AUTHORIZATION, token)?);

        Ok(headers)
    }

    async fn post_hook(
        &self,
        repo: &RepositoryRef,
        branch: &Branch,
        source: &RepositoryRef,
        token: &str,
    ) -> Result<HookResponse, RemoteError> {
        let payload = HookPayload::push(repo, branch, source);
        self.api
            .post_json("/hook", &payload, Self::hook_headers(token)?)
            .await
    }
}

#[async_trait]
impl BuildService for DroneClient {
    async fn list_repositories(&self) -> Result<Vec<RepositoryRef>, RemoteError> {
        let docs: Option<Vec<RepoDoc>> = self.api.get_json("/user/repos").await?;

        Ok(docs
            .unwrap_or_default()
            .into_iter()
            .map(|doc| RepositoryRef::new(doc.owner, doc.name))
            .collect())
    }

    async fn trigger_build(
        &self,
        repo: &RepositoryRef,
        branch: &Branch,
        source: &RepositoryRef,
        token: &str,
    ) -> bool {
        match self.post_hook(repo, branch, source, token).await {
            Ok(response) => {
                let build = response
                    .number
                    .map(|n| format!("#{}", n))
                    .unwrap_or_else(|| "#?".to_string());
                debug!(repo = %repo, branch = %branch.name, build = %build, "Triggered build");
                true
            }
            Err(e) => {
                Rejection::classify(&e).log(repo, branch, &e);
                false
            }
        }
    }
}
