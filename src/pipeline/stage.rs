//! Stages of a trigger run and the per-item outcomes they produce

use crate::gogs::TokenError;
use crate::remote::RemoteError;
use crate::repository::{BuildTriggers, RepoBranchMap, RepositoryRef};
use serde::Serialize;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Discover,
    CollectBranches,
    FilterByMatch,
    BuildTriggers,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Discover => "discover repositories",
            Stage::CollectBranches => "collect branches",
            Stage::FilterByMatch => "filter by base image",
            Stage::BuildTriggers => "build triggers",
        };
        f.write_str(name)
    }
}

/// A repository still in the running after a stage, with the branches it keeps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub repo: RepositoryRef,
    pub branches: Vec<String>,
}

impl Candidate {
    pub fn from_branches(map: &RepoBranchMap) -> Vec<Self> {
        map.iter()
            .map(|(repo, branches)| Candidate {
                repo: repo.clone(),
                branches: branches.iter().map(|b| b.name.clone()).collect(),
            })
            .collect()
    }

    pub fn from_triggers(triggers: &BuildTriggers) -> Vec<Self> {
        triggers
            .iter()
            .map(|(repo, trigger)| Candidate {
                repo: repo.clone(),
                branches: trigger.branches.iter().map(|b| b.name.clone()).collect(),
            })
            .collect()
    }
}

impl fmt::Display for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.branches.is_empty() {
            write!(f, "{}", self.repo)
        } else {
            write!(f, "{} [{}]", self.repo, self.branches.join(", "))
        }
    }
}

/// Why a repository left the pipeline.
#[derive(Debug, Error)]
pub enum SkipReason {
    #[error("its branches could not be retrieved: {0}")]
    BranchListingFailed(#[source] RemoteError),

    #[error("it has no branches")]
    NoBranches,

    #[error("no branch has a matching Dockerfile")]
    NoMatchingBranches,

    #[error("{0}")]
    TokenUnavailable(#[source] TokenError),
}

/// Outcome of running one repository through a stage.
#[derive(Debug)]
pub enum ItemOutcome<T> {
    Retained(T),
    Skipped(SkipReason),
}
