pub mod config;
pub mod orchestrator;
pub mod stage;

pub use config::PipelineConfig;
pub use orchestrator::{PipelineError, PipelineOrchestrator, PipelineReport};
pub use stage::{Candidate, ItemOutcome, SkipReason, Stage};
