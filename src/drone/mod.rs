//! CI side: repository discovery and build triggering on Drone

mod client;
mod payload;

pub use client::DroneClient;
pub use payload::{HookPayload, HookResponse};

use crate::remote::RemoteError;
use crate::repository::{Branch, BuildTriggers, RepositoryRef};
use async_trait::async_trait;
use tracing::{debug, error, warn};

/// Operations the pipeline needs from the CI service.
#[async_trait]
pub trait BuildService: Send + Sync {
    /// Lists every repository Drone knows about.
    async fn list_repositories(&self) -> Result<Vec<RepositoryRef>, RemoteError>;

    /// Triggers one build of `branch`, authenticated with the repository's `token`.
    ///
    /// Rejections are logged and reported as `false`; they never abort the caller.
    async fn trigger_build(
        &self,
        repo: &RepositoryRef,
        branch: &Branch,
        source: &RepositoryRef,
        token: &str,
    ) -> bool;

    /// Triggers every branch of every repository and returns how many builds started.
    async fn trigger_builds(&self, triggers: &BuildTriggers, source: &RepositoryRef) -> usize {
        let mut builds_triggered = 0;

        for (repo, trigger) in triggers {
            debug!(repo = %repo, branches = trigger.branches.len(), "Triggering builds");
            for branch in &trigger.branches {
                if self.trigger_build(repo, branch, source, &trigger.token).await {
                    builds_triggered += 1;
                }
            }
        }

        builds_triggered
    }
}

/// Why Drone refused a trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// HTTP 400: the hook token is not valid for the repository
    InvalidToken,
    /// HTTP 401: the repository has its push hook disabled
    HookDisabled,
    Other,
}

impl Rejection {
    pub fn classify(err: &RemoteError) -> Self {
        match err.status() {
            Some(400) => Rejection::InvalidToken,
            Some(401) => Rejection::HookDisabled,
            _ => Rejection::Other,
        }
    }

    pub(crate) fn log(self, repo: &RepositoryRef, branch: &Branch, err: &RemoteError) {
        match self {
            Rejection::InvalidToken => {
                error!(repo = %repo, branch = %branch.name, "Unable to trigger build: the supplied token is invalid");
            }
            Rejection::HookDisabled => {
                warn!(repo = %repo, branch = %branch.name, "Unable to trigger build: the push hook is disabled");
            }
            Rejection::Other => {
                error!(repo = %repo, branch = %branch.name, error = %err, "Unable to trigger build");
            }
        }
    }
}
