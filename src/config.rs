//! Configuration management for drone-trigger
//!
//! The plugin is configured through environment variables, the way Drone hands
//! settings to plugins. Every option `X` is read from `PLUGIN_X` (a setting in
//! `.drone.yml`) and falls back to `TRIGGER_X` (an encrypted secret).
//!
//! # Options
//!
//! - `DRONE_API`: Drone API URL - **required**
//! - `DRONE_TOKEN`: Drone API token - optional, calls are unauthenticated without it
//! - `GOGS_API`: Gogs API URL - **required**
//! - `GOGS_TOKEN`: Gogs API token - optional, calls are unauthenticated without it
//! - `FROM`: Base image whose dependents get rebuilt - **required**
//! - `DRY_RUN`: Run everything but the trigger calls (true|yes)
//! - `VERBOSE`: Log per-stage candidate listings (true|yes)
//!
//! The upstream repository is read from `DRONE_REPO`, which Drone sets for
//! every plugin step.
//!
//! # Example
//!
//! ```no_run
//! use drone_trigger::TriggerConfig;
//!
//! let config = TriggerConfig::from_env();
//! let validated = config.validate().expect("Invalid configuration");
//! println!("{}", validated.pipeline.target_image);
//! ```

use crate::pipeline::PipelineConfig;
use crate::repository::RepositoryRef;
use std::collections::BTreeMap;
use std::env;
use std::fmt;
use thiserror::Error;
use tracing::warn;
use url::Url;

pub const PREFIX_YAML: &str = "PLUGIN_";
pub const PREFIX_ENCRYPTED: &str = "TRIGGER_";

pub const DRONE_API: &str = "DRONE_API";
pub const DRONE_TOKEN: &str = "DRONE_TOKEN";
pub const GOGS_API: &str = "GOGS_API";
pub const GOGS_TOKEN: &str = "GOGS_TOKEN";
pub const FROM: &str = "FROM";
pub const DRY_RUN: &str = "DRY_RUN";
pub const VERBOSE: &str = "VERBOSE";
/// Set by Drone itself, never prefixed
pub const SOURCE: &str = "DRONE_REPO";

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A mandatory plugin option is not set
    #[error("Mandatory value for {option} is missing. You must declare it either in .drone.yml via '{option}: some_value' or as encrypted secret '{secret}'.")]
    Missing { option: String, secret: String },

    /// A mandatory variable Drone should have set is absent
    #[error("Mandatory environment variable {0} is missing.")]
    MissingEnvironment(String),

    #[error("Invalid URL specified as {option}: {url}")]
    InvalidUrl { option: String, url: String },

    #[error("Invalid source repository: {0}")]
    InvalidSource(String),
}

/// One remote API the plugin talks to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceEndpoint {
    pub api_url: String,
    pub token: Option<String>,
}

/// Configuration that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedConfig {
    pub drone: ServiceEndpoint,
    pub gogs: ServiceEndpoint,
    pub pipeline: PipelineConfig,
}

/// Raw plugin settings, as found in the environment and on the command line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TriggerConfig {
    pub drone_api: Option<String>,
    pub drone_token: Option<String>,
    pub gogs_api: Option<String>,
    pub gogs_token: Option<String>,
    pub from_image: Option<String>,
    pub source: Option<String>,
    pub dry_run: bool,
    pub verbose: bool,
}

impl TriggerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let option = |name: &str| {
            lookup(&format!("{}{}", PREFIX_YAML, name))
                .or_else(|| lookup(&format!("{}{}", PREFIX_ENCRYPTED, name)))
                .filter(|value| !value.is_empty())
        };

        Self {
            drone_api: option(DRONE_API),
            drone_token: option(DRONE_TOKEN),
            gogs_api: option(GOGS_API),
            gogs_token: option(GOGS_TOKEN),
            from_image: option(FROM),
            source: lookup(SOURCE).filter(|value| !value.is_empty()),
            dry_run: option(DRY_RUN).map_or(false, |v| parse_flag(&v)),
            verbose: option(VERBOSE).map_or(false, |v| parse_flag(&v)),
        }
    }

    /// Checks every option and resolves the typed configuration.
    ///
    /// Missing optional tokens only produce a warning.
    pub fn validate(&self) -> Result<ValidatedConfig, ConfigError> {
        let drone_api = mandatory(&self.drone_api, DRONE_API)?;
        validate_url(drone_api, DRONE_API)?;
        warn_if_missing(&self.drone_token, DRONE_TOKEN, "Without the token, API calls to drone won't be authenticated.");

        let gogs_api = mandatory(&self.gogs_api, GOGS_API)?;
        validate_url(gogs_api, GOGS_API)?;
        warn_if_missing(&self.gogs_token, GOGS_TOKEN, "Without the token, API calls to gogs won't be authenticated.");

        let from_image = mandatory(&self.from_image, FROM)?;

        let source = self
            .source
            .as_deref()
            .ok_or_else(|| ConfigError::MissingEnvironment(SOURCE.to_string()))?
            .parse::<RepositoryRef>()
            .map_err(ConfigError::InvalidSource)?;

        Ok(ValidatedConfig {
            drone: ServiceEndpoint {
                api_url: drone_api.to_string(),
                token: self.drone_token.clone(),
            },
            gogs: ServiceEndpoint {
                api_url: gogs_api.to_string(),
                token: self.gogs_token.clone(),
            },
            pipeline: PipelineConfig::new(from_image, source).with_dry_run(self.dry_run),
        })
    }

    /// Settings keyed by option name, with tokens masked.
    pub fn to_display_map(&self) -> BTreeMap<String, String> {
        let mut map = BTreeMap::new();
        let unset = || "<unset>".to_string();

        map.insert("drone_api".to_string(), self.drone_api.clone().unwrap_or_else(unset));
        map.insert("drone_token".to_string(), mask(&self.drone_token).to_string());
        map.insert("gogs_api".to_string(), self.gogs_api.clone().unwrap_or_else(unset));
        map.insert("gogs_token".to_string(), mask(&self.gogs_token).to_string());
        map.insert("from".to_string(), self.from_image.clone().unwrap_or_else(unset));
        map.insert("source".to_string(), self.source.clone().unwrap_or_else(unset));
        map.insert("dry_run".to_string(), self.dry_run.to_string());
        map.insert("verbose".to_string(), self.verbose.to_string());

        map
    }
}

fn mask(value: &Option<String>) -> &'static str {
    if value.is_some() {
        "<set>"
    } else {
        "<unset>"
    }
}

impl fmt::Display for TriggerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let show = |value: &Option<String>| value.clone().unwrap_or_else(|| "<unset>".to_string());

        writeln!(f, "Trigger Configuration:")?;
        writeln!(f, "  Drone API: {}", show(&self.drone_api))?;
        writeln!(f, "  Drone Token: {}", mask(&self.drone_token))?;
        writeln!(f, "  Gogs API: {}", show(&self.gogs_api))?;
        writeln!(f, "  Gogs Token: {}", mask(&self.gogs_token))?;
        writeln!(f, "  From: {}", show(&self.from_image))?;
        writeln!(f, "  Source: {}", show(&self.source))?;
        writeln!(f, "  Dry Run: {}", self.dry_run)?;
        writeln!(f, "  Verbose: {}", self.verbose)?;
        Ok(())
    }
}

/// Plugin booleans accept "true" and "yes", in any case.
pub fn parse_flag(value: &str) -> bool {
    matches!(value.to_lowercase().as_str(), "true" | "yes")
}

fn mandatory<'a>(value: &'a Option<String>, option: &str) -> Result<&'a str, ConfigError> {
    value.as_deref().ok_or_else(|| ConfigError::Missing {
        option: option.to_lowercase(),
        secret: format!("{}{}", PREFIX_ENCRYPTED, option),
    })
}

fn warn_if_missing(value: &Option<String>, option: &str, consequence: &str) {
    if value.is_none() {
        warn!(
            "Optional value for {} is missing. You have the option to declare it either in .drone.yml via '{}: some_value' or as encrypted secret '{}{}'. {}",
            option.to_lowercase(),
            option.to_lowercase(),
            PREFIX_ENCRYPTED,
            option,
            consequence
        );
    }
}

fn validate_url(url: &str, option: &str) -> Result<(), ConfigError> {
    let invalid = || ConfigError::InvalidUrl {
        option: option.to_lowercase(),
        url: url.to_string(),
    };

    let parsed = Url::parse(url).map_err(|_| invalid())?;
    if parsed.host_str().map_or(true, str::is_empty) {
        return Err(invalid());
    }
    Ok(())
}
