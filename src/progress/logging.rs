//! Logging-based progress handler

use super::{ProgressEvent, ProgressHandler};
use crate::pipeline::stage::{Candidate, Stage};
use tracing::{debug, info};

/// Handler that logs progress events using tracing.
///
/// Early stages list their candidates at DEBUG, the final trigger set and
/// totals are logged at INFO.
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingHandler;

impl LoggingHandler {
    fn log_stage(stage: Stage, candidates: &[Candidate]) {
        let listing = candidates
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ");

        match stage {
            Stage::Discover => {
                info!(count = candidates.len(), "Discovered repositories");
                debug!(repos = %listing, "Repositories known to Drone");
            }
            Stage::CollectBranches => {
                debug!(count = candidates.len(), repos = %listing, "Repositories with branches");
            }
            Stage::FilterByMatch => {
                debug!(count = candidates.len(), repos = %listing, "Repositories with matching Dockerfiles");
            }
            Stage::BuildTriggers => {
                info!(count = candidates.len(), repos = %listing, "Repositories to trigger");
            }
        }
    }
}

impl ProgressHandler for LoggingHandler {
    fn on_progress(&self, event: &ProgressEvent) {
        match event {
            ProgressEvent::Started {
                target_image,
                source,
                dry_run,
            } => {
                info!(
                    image = %target_image,
                    source = %source,
                    dry_run,
                    "Triggering builds of Docker repos with FROM directive"
                );
            }
            ProgressEvent::StageComplete { stage, candidates } => {
                Self::log_stage(*stage, candidates);
            }
            ProgressEvent::DryRun { builds } => {
                info!(builds, "Dry run: not triggering any builds");
            }
            ProgressEvent::Completed {
                triggered,
                total_time,
            } => {
                info!(
                    triggered,
                    total_time_ms = total_time.as_millis() as u64,
                    "Triggered builds"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::RepositoryRef;
    use std::time::Duration;

    #[test]
    fn test_logging_handler_all_events() {
        let handler = LoggingHandler;
        let candidates = vec![Candidate {
            repo: RepositoryRef::new("docker", "app"),
            branches: vec!["main".to_string()],
        }];

        handler.on_progress(&ProgressEvent::Started {
            target_image: "python:3.9".to_string(),
            source: "docker/python".to_string(),
            dry_run: true,
        });
        for stage in [
            Stage::Discover,
            Stage::CollectBranches,
            Stage::FilterByMatch,
            Stage::BuildTriggers,
        ] {
            handler.on_progress(&ProgressEvent::StageComplete {
                stage,
                candidates: candidates.clone(),
            });
        }
        handler.on_progress(&ProgressEvent::DryRun { builds: 1 });
        handler.on_progress(&ProgressEvent::Completed {
            triggered: 0,
            total_time: Duration::from_secs(1),
        });
    }
}
