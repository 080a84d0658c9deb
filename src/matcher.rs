//! Decides whether a branch's Dockerfile is based on the target image

use crate::dockerfile::{parse_base_image, same_image};
use crate::gogs::SourceControl;
use crate::remote::RemoteError;
use crate::repository::{Branch, RepositoryRef};
use std::sync::Arc;
use tracing::{debug, warn};

pub const DOCKERFILE: &str = "Dockerfile";
pub const DOCKERFILE_LOWERCASE: &str = "dockerfile";

/// Result of inspecting one branch.
#[derive(Debug)]
pub enum MatchOutcome {
    Matched,
    Mismatch { declared: String },
    NoDeclaration,
    /// Neither file name exists; `location` is the directory that was searched
    NoBuildFile { location: Option<String> },
    FetchFailed(RemoteError),
}

impl MatchOutcome {
    pub fn is_match(&self) -> bool {
        matches!(self, MatchOutcome::Matched)
    }
}

pub struct BuildImageMatcher {
    scm: Arc<dyn SourceControl>,
}

impl BuildImageMatcher {
    pub fn new(scm: Arc<dyn SourceControl>) -> Self {
        Self { scm }
    }

    /// Fetches the Dockerfile of `branch`, retrying the lowercase name on 404 only.
    pub async fn fetch_dockerfile(
        &self,
        repo: &RepositoryRef,
        branch: &Branch,
    ) -> Result<String, RemoteError> {
        match self.scm.fetch_file(repo, &branch.name, DOCKERFILE).await {
            Err(e) if e.is_not_found() => {
                debug!(repo = %repo, branch = %branch.name, "No Dockerfile, trying dockerfile");
                self.scm
                    .fetch_file(repo, &branch.name, DOCKERFILE_LOWERCASE)
                    .await
            }
            other => other,
        }
    }

    pub async fn inspect(
        &self,
        repo: &RepositoryRef,
        branch: &Branch,
        target_image: &str,
    ) -> MatchOutcome {
        let content = match self.fetch_dockerfile(repo, branch).await {
            Ok(content) => content,
            Err(e) if e.is_not_found() => {
                return MatchOutcome::NoBuildFile {
                    location: e.url().map(parent_location),
                }
            }
            Err(e) => return MatchOutcome::FetchFailed(e),
        };

        match parse_base_image(&content) {
            Some(declared) if same_image(declared, target_image) => MatchOutcome::Matched,
            Some(declared) => MatchOutcome::Mismatch {
                declared: declared.to_string(),
            },
            None => MatchOutcome::NoDeclaration,
        }
    }

    /// Whether `branch` builds from `target_image`. Failures count as no match.
    pub async fn matches(&self, repo: &RepositoryRef, branch: &Branch, target_image: &str) -> bool {
        let outcome = self.inspect(repo, branch, target_image).await;

        match &outcome {
            MatchOutcome::Matched => {
                debug!(repo = %repo, branch = %branch.name, image = target_image, "Dockerfile matches");
            }
            MatchOutcome::Mismatch { declared } => {
                debug!(repo = %repo, branch = %branch.name, declared = %declared, "Ignoring branch: different base image");
            }
            MatchOutcome::NoDeclaration => {
                warn!(repo = %repo, branch = %branch.name, "Ignoring branch: FROM instruction is missing");
            }
            MatchOutcome::NoBuildFile { location } => {
                warn!(
                    repo = %repo,
                    branch = %branch.name,
                    location = location.as_deref().unwrap_or("?"),
                    "Ignoring branch: no Dockerfile or dockerfile"
                );
            }
            MatchOutcome::FetchFailed(e) => {
                warn!(
                    repo = %repo,
                    branch = %branch.name,
                    url = e.url().unwrap_or("?"),
                    error = %e,
                    "Ignoring branch: error while retrieving Dockerfile"
                );
            }
        }

        outcome.is_match()
    }
}

fn parent_location(url: &str) -> String {
    match url.rsplit_once('/') {
        Some((parent, _)) => format!("{}/", parent),
        None => url.to_string(),
    }
}
