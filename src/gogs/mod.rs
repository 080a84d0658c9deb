//! Source-control side: branches, raw files and webhooks of Gogs repositories

mod client;
mod hooks;

pub use client::GogsClient;
pub use hooks::{parse_hook_token, HookConfig, TokenError, Webhook, DRONE_HOOK_TYPE};

use crate::remote::RemoteError;
use crate::repository::{Branch, RepositoryRef};
use async_trait::async_trait;

/// Operations the pipeline needs from the source-control service.
#[async_trait]
pub trait SourceControl: Send + Sync {
    /// Lists the branches of `repo`. An empty list is a valid answer.
    async fn list_branches(&self, repo: &RepositoryRef) -> Result<Vec<Branch>, RemoteError>;

    /// Fetches the raw content of `path` on `branch`.
    ///
    /// A missing file surfaces as a `RemoteError` whose status is 404.
    async fn fetch_file(
        &self,
        repo: &RepositoryRef,
        branch: &str,
        path: &str,
    ) -> Result<String, RemoteError>;

    async fn list_webhooks(&self, repo: &RepositoryRef) -> Result<Vec<Webhook>, RemoteError>;

    /// Recovers the Drone token embedded in the repository's push hook.
    async fn recover_trigger_token(&self, repo: &RepositoryRef) -> Result<String, TokenError> {
        let hooks = self
            .list_webhooks(repo)
            .await
            .map_err(|source| TokenError::Remote {
                repo: repo.full_name(),
                source,
            })?;

        parse_hook_token(repo, &hooks)
    }
}
