use super::commands::CliArgs;
use super::output::{OutputFormat, OutputFormatter};
use crate::config::{TriggerConfig, ValidatedConfig};
use crate::drone::DroneClient;
use crate::gogs::GogsClient;
use crate::pipeline::PipelineOrchestrator;
use crate::progress::LoggingHandler;
use std::sync::Arc;
use tracing::{debug, error};

/// Runs the whole trigger pipeline and returns the process exit code.
pub async fn handle_run(config: &TriggerConfig, args: &CliArgs) -> i32 {
    let validated = match config.validate() {
        Ok(validated) => validated,
        Err(e) => {
            error!("{}", e);
            return 1;
        }
    };
    debug!("Configuration: {:?}", validated.pipeline);

    let orchestrator = match build_orchestrator(&validated) {
        Ok(orchestrator) => orchestrator,
        Err(e) => {
            error!("Failed to create API clients: {}", e);
            return 1;
        }
    };

    let report = match orchestrator.execute(&validated.pipeline).await {
        Ok(report) => report,
        Err(e) => {
            error!("{}", e);
            return 1;
        }
    };

    let formatter = OutputFormatter::new(OutputFormat::from(args.format));
    match formatter.format_report(&report) {
        Ok(output) => {
            println!("{}", output);
            0
        }
        Err(e) => {
            error!("Failed to format report: {:#}", e);
            1
        }
    }
}

/// Prints the resolved configuration, tokens masked.
pub fn handle_config(config: &TriggerConfig, args: &CliArgs) -> i32 {
    let formatter = OutputFormatter::new(OutputFormat::from(args.format));
    match formatter.format_config(config) {
        Ok(output) => {
            println!("{}", output);
            0
        }
        Err(e) => {
            error!("Failed to format configuration: {:#}", e);
            1
        }
    }
}

fn build_orchestrator(
    config: &ValidatedConfig,
) -> Result<PipelineOrchestrator, crate::remote::RemoteError> {
    let drone = DroneClient::new(&config.drone.api_url, config.drone.token.as_deref())?;
    let gogs = GogsClient::new(&config.gogs.api_url, config.gogs.token.as_deref())?;

    Ok(PipelineOrchestrator::new(Arc::new(drone), Arc::new(gogs))
        .with_progress_handler(Arc::new(LoggingHandler)))
}
