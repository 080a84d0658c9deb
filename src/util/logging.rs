//! Structured logging setup for drone-trigger
//!
//! Logging goes through the `tracing` ecosystem and is written to stderr, so
//! stdout stays free for the run report. `RUST_LOG` overrides the configured
//! level when set.
//!
//! # Example
//!
//! ```no_run
//! use drone_trigger::util::{init_logging, LoggingConfig};
//!
//! // Verbose runs also list the candidates of every stage
//! init_logging(LoggingConfig::for_run(None, true, false));
//!
//! tracing::info!("Application started");
//! ```

use std::env;
use std::sync::Once;
use tracing::level_filters::LevelFilter;
use tracing::Level;
use tracing_subscriber::filter::Directive;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Ensures logging is only initialized once
static INIT: Once = Once::new();

/// Configuration for logging initialization
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Minimum log level to display
    pub level: Level,

    /// Use JSON output format
    pub use_json: bool,

    /// Include the module target (e.g., drone_trigger::matcher) in logs
    pub include_target: bool,

    /// Include file and line number information
    pub include_location: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            use_json: false,
            include_target: false,
            include_location: false,
        }
    }
}

impl LoggingConfig {
    pub fn with_level(level: Level) -> Self {
        Self {
            level,
            ..Default::default()
        }
    }

    /// Resolves the level of a run.
    ///
    /// An explicit level wins, then verbose (DEBUG), then quiet (ERROR).
    pub fn for_run(log_level: Option<&str>, verbose: bool, quiet: bool) -> Self {
        let level = match log_level {
            Some(level_str) => parse_level(level_str),
            None if verbose => Level::DEBUG,
            None if quiet => Level::ERROR,
            None => Level::INFO,
        };

        Self::with_level(level)
    }

    pub fn json(mut self, use_json: bool) -> Self {
        self.use_json = use_json;
        self
    }
}

/// Parses a log level from a string, falling back to INFO.
///
/// ```
/// use drone_trigger::util::logging::parse_level;
/// use tracing::Level;
///
/// assert_eq!(parse_level("debug"), Level::DEBUG);
/// assert_eq!(parse_level("INFO"), Level::INFO);
/// assert_eq!(parse_level("invalid"), Level::INFO);
/// ```
pub fn parse_level(level_str: &str) -> Level {
    match level_str.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => {
            eprintln!(
                "Invalid log level '{}', defaulting to INFO. Valid levels: trace, debug, info, warn, error",
                level_str
            );
            Level::INFO
        }
    }
}

/// Initializes the logging system. Only the first call has any effect.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let mut filter = EnvFilter::from_default_env();

        if env::var("RUST_LOG").is_err() {
            filter = filter.add_directive(LevelFilter::from_level(config.level).into());
            for directive in ["h2=warn", "hyper=warn", "hyper_util=warn", "reqwest=warn"] {
                if let Ok(directive) = directive.parse::<Directive>() {
                    filter = filter.add_directive(directive);
                }
            }
        }

        let layer = fmt::layer()
            .with_target(config.include_target)
            .with_file(config.include_location)
            .with_line_number(config.include_location)
            .with_writer(std::io::stderr);

        if config.use_json {
            tracing_subscriber::registry()
                .with(filter)
                .with(layer.json())
                .init();
        } else {
            tracing_subscriber::registry().with(filter).with(layer).init();
        }
    });
}
