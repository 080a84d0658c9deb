use drone_trigger::cli::commands::{CliArgs, Commands};
use drone_trigger::cli::handlers::{handle_config, handle_run};
use drone_trigger::util::{init_logging, LoggingConfig};
use drone_trigger::{TriggerConfig, VERSION};

use clap::Parser;
use tracing::debug;

#[tokio::main]
async fn main() {
    let args = CliArgs::parse();

    let mut config = TriggerConfig::from_env();
    args.apply_to(&mut config);

    init_logging(
        LoggingConfig::for_run(args.log_level.as_deref(), config.verbose, args.quiet)
            .json(args.log_json),
    );

    debug!("drone-trigger v{} starting", VERSION);
    debug!("Arguments: {:?}", args);

    let exit_code = match args.selected_command() {
        Commands::Run => handle_run(&config, &args).await,
        Commands::Config => handle_config(&config, &args),
    };

    std::process::exit(exit_code);
}
