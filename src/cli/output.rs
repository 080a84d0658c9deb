//! Output formatting for run reports
//!
//! Reports go to stdout, either as indented JSON for scripts or as a short
//! human-readable summary. Logs never end up here.

use anyhow::{Context, Result};

use crate::config::TriggerConfig;
use crate::pipeline::PipelineReport;

const RULE: &str = "\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}\u{2501}";

/// Output format enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// JSON format (machine-readable)
    Json,
    /// Human-readable formatted text
    Human,
}

pub struct OutputFormatter {
    format: OutputFormat,
}

impl OutputFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    pub fn format_report(&self, report: &PipelineReport) -> Result<String> {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(report)
                .context("Failed to serialize run report to JSON"),
            OutputFormat::Human => Ok(self.format_report_human(report)),
        }
    }

    pub fn format_config(&self, config: &TriggerConfig) -> Result<String> {
        match self.format {
            OutputFormat::Json => serde_json::to_string_pretty(&config.to_display_map())
                .context("Failed to serialize config to JSON"),
            OutputFormat::Human => Ok(config.to_string()),
        }
    }

    fn format_report_human(&self, report: &PipelineReport) -> String {
        let mut output = String::new();

        if report.dry_run {
            output.push_str("Trigger Report (dry run)\n");
        } else {
            output.push_str("Trigger Report\n");
        }
        output.push_str(RULE);
        output.push_str("\n\n");

        output.push_str(&format!("Base Image:  {}\n", report.target_image));
        output.push_str(&format!("Source:      {}\n\n", report.source));

        output.push_str("Repositories:\n");
        output.push_str(&format!("\u{251C}\u{2500} Known to Drone:   {}\n", report.discovered));
        output.push_str(&format!("\u{251C}\u{2500} With branches:    {}\n", report.with_branches));
        output.push_str(&format!("\u{251C}\u{2500} Matching image:   {}\n", report.with_matches));
        output.push_str(&format!("\u{2514}\u{2500} With hook token:  {}\n\n", report.with_triggers));

        if report.dry_run {
            output.push_str("Builds triggered: none (dry run)\n");
        } else {
            output.push_str(&format!("Builds triggered: {}\n", report.triggered));
        }

        output
    }
}
