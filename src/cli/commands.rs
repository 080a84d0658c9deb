use crate::config::TriggerConfig;
use clap::{Parser, Subcommand, ValueEnum};

/// Rebuild every Docker repository based on an upstream image
#[derive(Parser, Debug)]
#[command(
    name = "drone-trigger",
    about = "Trigger Drone builds of Gogs repositories whose Dockerfile is based on a given image",
    version,
    long_about = "drone-trigger asks Drone for every repository it builds, looks at the Dockerfile \
                  of each branch in Gogs and triggers a new build for every branch whose FROM \
                  instruction names the given image.\n\n\
                  Settings are read from PLUGIN_* / TRIGGER_* environment variables; the options \
                  below override them."
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Option<Commands>,

    #[arg(long, global = true, value_name = "URL", help = "Drone API URL")]
    pub drone_api: Option<String>,

    #[arg(long, global = true, value_name = "URL", help = "Gogs API URL")]
    pub gogs_api: Option<String>,

    #[arg(
        long = "from",
        global = true,
        value_name = "IMAGE",
        help = "Base image whose dependents get rebuilt"
    )]
    pub from_image: Option<String>,

    #[arg(
        long,
        global = true,
        value_name = "OWNER/NAME",
        help = "Upstream repository named in the triggered builds"
    )]
    pub source: Option<String>,

    #[arg(long, global = true, help = "Run everything but the trigger calls")]
    pub dry_run: bool,

    #[arg(long, global = true, value_name = "LEVEL", help = "Set logging level")]
    pub log_level: Option<String>,

    #[arg(long, global = true, help = "Write logs as JSON")]
    pub log_json: bool,

    #[arg(
        short = 'v',
        long,
        global = true,
        help = "Log the candidates of every stage"
    )]
    pub verbose: bool,

    #[arg(
        short = 'q',
        long,
        global = true,
        conflicts_with = "verbose",
        help = "Quiet mode - suppress non-error output"
    )]
    pub quiet: bool,

    #[arg(
        short = 'f',
        long,
        global = true,
        value_enum,
        default_value = "human",
        help = "Output format"
    )]
    pub format: OutputFormatArg,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Commands {
    #[command(about = "Find matching repositories and trigger their builds (default)")]
    Run,

    #[command(about = "Show the resolved configuration without calling any API")]
    Config,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormatArg {
    Json,
    Human,
}

impl From<OutputFormatArg> for super::output::OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Json => super::output::OutputFormat::Json,
            OutputFormatArg::Human => super::output::OutputFormat::Human,
        }
    }
}

impl CliArgs {
    pub fn selected_command(&self) -> Commands {
        self.command.unwrap_or(Commands::Run)
    }

    /// Overrides environment settings with the ones given on the command line.
    pub fn apply_to(&self, config: &mut TriggerConfig) {
        if let Some(url) = &self.drone_api {
            config.drone_api = Some(url.clone());
        }
        if let Some(url) = &self.gogs_api {
            config.gogs_api = Some(url.clone());
        }
        if let Some(image) = &self.from_image {
            config.from_image = Some(image.clone());
        }
        if let Some(source) = &self.source {
            config.source = Some(source.clone());
        }
        config.dry_run |= self.dry_run;
        config.verbose |= self.verbose;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_args_verify() {
        CliArgs::command().debug_assert();
    }

    #[test]
    fn test_run_is_default_command() {
        let args = CliArgs::parse_from(["drone-trigger"]);
        assert_eq!(args.selected_command(), Commands::Run);
        assert_eq!(args.format, OutputFormatArg::Human);
        assert!(!args.dry_run);
    }

    #[test]
    fn test_config_command_with_global_flags() {
        let args = CliArgs::parse_from(["drone-trigger", "config", "--format", "json", "-v"]);
        assert_eq!(args.selected_command(), Commands::Config);
        assert_eq!(args.format, OutputFormatArg::Json);
        assert!(args.verbose);
    }

    #[test]
    fn test_verbose_conflicts_with_quiet() {
        assert!(CliArgs::try_parse_from(["drone-trigger", "-v", "-q"]).is_err());
    }

    #[test]
    fn test_apply_to_overrides_environment() {
        let mut config = TriggerConfig {
            drone_api: Some("http://env-drone".to_string()),
            from_image: Some("python:2.7".to_string()),
            verbose: true,
            ..Default::default()
        };

        let args = CliArgs::parse_from([
            "drone-trigger",
            "--from",
            "python:3.9",
            "--source",
            "docker/python",
            "--dry-run",
        ]);
        args.apply_to(&mut config);

        assert_eq!(config.drone_api.as_deref(), Some("http://env-drone"));
        assert_eq!(config.from_image.as_deref(), Some("python:3.9"));
        assert_eq!(config.source.as_deref(), Some("docker/python"));
        assert!(config.dry_run);
        assert!(config.verbose);
    }
}
