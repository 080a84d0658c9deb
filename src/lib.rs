//! drone-trigger - rebuild downstream Docker images after an upstream build
//!
//! When the build of a base image finishes, this plugin finds every repository
//! Drone knows about whose Dockerfile starts `FROM` that image, on any branch,
//! and asks Drone to build it again.
//!
//! # Stages
//!
//! 1. **Discover**: list the repositories Drone builds
//! 2. **Collect branches**: list each repository's branches on Gogs
//! 3. **Filter by match**: keep the branches whose Dockerfile names the image
//! 4. **Build triggers**: recover the per-repository hook token from Gogs
//! 5. **Trigger**: post a push event to Drone for every remaining branch
//!
//! A failure in any stage after discovery only drops the repository or branch
//! it concerns.
//!
//! # Example
//!
//! ```no_run
//! use drone_trigger::{DroneClient, GogsClient, PipelineConfig, PipelineOrchestrator, RepositoryRef};
//! use std::sync::Arc;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let drone = DroneClient::new("https://drone.example.com/api", Some("drone-token"))?;
//! let gogs = GogsClient::new("https://git.example.com/api/v1", Some("gogs-token"))?;
//!
//! let config = PipelineConfig::new("python:3.9", RepositoryRef::new("docker", "python"));
//! let report = PipelineOrchestrator::new(Arc::new(drone), Arc::new(gogs))
//!     .execute(&config)
//!     .await?;
//!
//! println!("{} builds triggered", report.triggered);
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod dockerfile;
pub mod drone;
pub mod gogs;
pub mod matcher;
pub mod pipeline;
pub mod progress;
pub mod remote;
pub mod repository;
pub mod util;

pub use config::{ConfigError, TriggerConfig, ValidatedConfig};
pub use drone::{BuildService, DroneClient};
pub use gogs::{GogsClient, SourceControl, TokenError};
pub use matcher::{BuildImageMatcher, MatchOutcome};
pub use pipeline::{PipelineConfig, PipelineError, PipelineOrchestrator, PipelineReport};
pub use remote::RemoteError;
pub use repository::{Branch, BuildTrigger, BuildTriggers, RepoBranchMap, RepositoryRef};
pub use util::{init_logging, LoggingConfig};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_exists() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_name() {
        assert_eq!(NAME, "drone-trigger");
    }
}
