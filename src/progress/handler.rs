//! Progress handler trait and events

use crate::pipeline::stage::{Candidate, Stage};
use std::time::Duration;

/// Events emitted while a trigger run progresses
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    /// Run started
    Started {
        target_image: String,
        source: String,
        dry_run: bool,
    },

    /// A stage finished; `candidates` are the repositories it kept
    StageComplete {
        stage: Stage,
        candidates: Vec<Candidate>,
    },

    /// Triggering was skipped; `builds` would have been requested
    DryRun { builds: usize },

    /// Run completed
    Completed {
        triggered: usize,
        total_time: Duration,
    },
}

/// Trait for handling progress events during a run
pub trait ProgressHandler: Send + Sync {
    /// Called when a progress event occurs
    fn on_progress(&self, event: &ProgressEvent);
}

/// No-op handler that ignores all events
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpHandler;

impl ProgressHandler for NoOpHandler {
    fn on_progress(&self, _event: &ProgressEvent) {}
}
