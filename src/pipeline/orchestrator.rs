use super::config::PipelineConfig;
use super::stage::{Candidate, ItemOutcome, SkipReason, Stage};
use crate::drone::BuildService;
use crate::gogs::SourceControl;
use crate::matcher::BuildImageMatcher;
use crate::progress::{NoOpHandler, ProgressEvent, ProgressHandler};
use crate::remote::RemoteError;
use crate::repository::{Branch, BuildTrigger, BuildTriggers, RepoBranchMap, RepositoryRef};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, error, warn};

/// Failures that end a run.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Unable to retrieve Drone repositories: {0}")]
    Discovery(#[source] RemoteError),
}

/// How many repositories survived each stage, and how many builds started.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PipelineReport {
    pub target_image: String,
    pub source: String,
    pub dry_run: bool,
    pub discovered: usize,
    pub with_branches: usize,
    pub with_matches: usize,
    pub with_triggers: usize,
    pub triggered: usize,
}

/// Runs discovery, branch collection, base-image filtering and triggering.
///
/// Only discovery can fail the run; every later failure drops the affected
/// repository or branch and the run goes on.
pub struct PipelineOrchestrator {
    drone: Arc<dyn BuildService>,
    scm: Arc<dyn SourceControl>,
    matcher: BuildImageMatcher,
    progress_handler: Arc<dyn ProgressHandler>,
}

impl PipelineOrchestrator {
    pub fn new(drone: Arc<dyn BuildService>, scm: Arc<dyn SourceControl>) -> Self {
        Self {
            drone,
            matcher: BuildImageMatcher::new(scm.clone()),
            scm,
            progress_handler: Arc::new(NoOpHandler),
        }
    }

    pub fn with_progress_handler(mut self, handler: Arc<dyn ProgressHandler>) -> Self {
        self.progress_handler = handler;
        self
    }

    pub async fn execute(&self, config: &PipelineConfig) -> Result<PipelineReport, PipelineError> {
        let start = Instant::now();
        self.progress_handler.on_progress(&ProgressEvent::Started {
            target_image: config.target_image.clone(),
            source: config.source.full_name(),
            dry_run: config.dry_run,
        });

        let repos = self.discover().await?;
        let branches = self.collect_branches(&repos).await;
        let matching = self.filter_matching(branches.clone(), &config.target_image).await;
        let triggers = self.create_triggers(matching.clone()).await;

        let triggered = if config.dry_run {
            let builds = triggers.values().map(|t| t.branches.len()).sum();
            self.progress_handler
                .on_progress(&ProgressEvent::DryRun { builds });
            0
        } else {
            self.drone.trigger_builds(&triggers, &config.source).await
        };

        self.progress_handler.on_progress(&ProgressEvent::Completed {
            triggered,
            total_time: start.elapsed(),
        });

        Ok(PipelineReport {
            target_image: config.target_image.clone(),
            source: config.source.full_name(),
            dry_run: config.dry_run,
            discovered: repos.len(),
            with_branches: branches.len(),
            with_matches: matching.len(),
            with_triggers: triggers.len(),
            triggered,
        })
    }

    pub async fn discover(&self) -> Result<Vec<RepositoryRef>, PipelineError> {
        let repos = self
            .drone
            .list_repositories()
            .await
            .map_err(PipelineError::Discovery)?;

        self.report_stage(
            Stage::Discover,
            repos
                .iter()
                .map(|repo| Candidate {
                    repo: repo.clone(),
                    branches: Vec::new(),
                })
                .collect(),
        );
        Ok(repos)
    }

    /// Keeps every repository whose branches could be listed and that has any.
    pub async fn collect_branches(&self, repos: &[RepositoryRef]) -> RepoBranchMap {
        let mut branches_of_repos = RepoBranchMap::new();

        for repo in repos {
            match self.branches_of(repo).await {
                ItemOutcome::Retained(branches) => {
                    branches_of_repos.insert(repo.clone(), branches);
                }
                ItemOutcome::Skipped(reason) => log_skip(Stage::CollectBranches, repo, &reason),
            }
        }

        self.report_stage(
            Stage::CollectBranches,
            Candidate::from_branches(&branches_of_repos),
        );
        branches_of_repos
    }

    /// Narrows each repository to the branches whose Dockerfile builds from `target_image`.
    pub async fn filter_matching(
        &self,
        branches_of_repos: RepoBranchMap,
        target_image: &str,
    ) -> RepoBranchMap {
        let mut matching = RepoBranchMap::new();

        for (repo, branches) in branches_of_repos {
            match self.matching_branches(&repo, branches, target_image).await {
                ItemOutcome::Retained(branches) => {
                    matching.insert(repo, branches);
                }
                ItemOutcome::Skipped(reason) => log_skip(Stage::FilterByMatch, &repo, &reason),
            }
        }

        self.report_stage(Stage::FilterByMatch, Candidate::from_branches(&matching));
        matching
    }

    /// Pairs each repository with its Drone token; repositories without one are dropped.
    pub async fn create_triggers(&self, matching: RepoBranchMap) -> BuildTriggers {
        let mut triggers = BuildTriggers::new();

        for (repo, branches) in matching {
            match self.trigger_for(&repo, branches).await {
                ItemOutcome::Retained(trigger) => {
                    triggers.insert(repo, trigger);
                }
                ItemOutcome::Skipped(reason) => log_skip(Stage::BuildTriggers, &repo, &reason),
            }
        }

        self.report_stage(Stage::BuildTriggers, Candidate::from_triggers(&triggers));
        triggers
    }

    async fn branches_of(&self, repo: &RepositoryRef) -> ItemOutcome<Vec<Branch>> {
        match self.scm.list_branches(repo).await {
            Ok(branches) if branches.is_empty() => ItemOutcome::Skipped(SkipReason::NoBranches),
            Ok(branches) => ItemOutcome::Retained(branches),
            Err(e) => ItemOutcome::Skipped(SkipReason::BranchListingFailed(e)),
        }
    }

    async fn matching_branches(
        &self,
        repo: &RepositoryRef,
        branches: Vec<Branch>,
        target_image: &str,
    ) -> ItemOutcome<Vec<Branch>> {
        let mut matched = Vec::new();
        for branch in branches {
            if self.matcher.matches(repo, &branch, target_image).await {
                matched.push(branch);
            }
        }

        if matched.is_empty() {
            ItemOutcome::Skipped(SkipReason::NoMatchingBranches)
        } else {
            ItemOutcome::Retained(matched)
        }
    }

    async fn trigger_for(&self, repo: &RepositoryRef, branches: Vec<Branch>) -> ItemOutcome<BuildTrigger> {
        match self.scm.recover_trigger_token(repo).await {
            Ok(token) => ItemOutcome::Retained(BuildTrigger { branches, token }),
            Err(e) => ItemOutcome::Skipped(SkipReason::TokenUnavailable(e)),
        }
    }

    fn report_stage(&self, stage: Stage, candidates: Vec<Candidate>) {
        self.progress_handler
            .on_progress(&ProgressEvent::StageComplete { stage, candidates });
    }
}

fn log_skip(stage: Stage, repo: &RepositoryRef, reason: &SkipReason) {
    match reason {
        SkipReason::BranchListingFailed(_) => {
            warn!(repo = %repo, stage = %stage, "Ignoring repository, {}", reason);
        }
        SkipReason::TokenUnavailable(_) => {
            error!(repo = %repo, stage = %stage, "Not triggering build: {}", reason);
        }
        SkipReason::NoBranches | SkipReason::NoMatchingBranches => {
            debug!(repo = %repo, stage = %stage, "Ignoring repository, {}", reason);
        }
    }
}
