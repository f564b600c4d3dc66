//! Configuration management for the limits CLI
//!
//! Values come from environment variables with sensible defaults and can be
//! overridden per invocation by command-line flags.

use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use clap::ValueEnum;
use std::{env, path::PathBuf};
use tally_entitlements::time::format_instant_at_offset;

/// Output format of command results
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Human,
    Json,
}

/// Parse output format from string
pub fn parse_output_format(format_str: &str) -> Result<OutputFormat> {
    match format_str.to_lowercase().as_str() {
        "human" => Ok(OutputFormat::Human),
        "json" => Ok(OutputFormat::Json),
        _ => Err(anyhow!("Invalid output format: {format_str}")),
    }
}

/// Centralized configuration for the limits CLI
#[derive(Debug, Clone)]
pub struct LimitsCliConfig {
    /// Payment ledger read when `--ledger` is not given
    pub ledger_path: PathBuf,

    /// Default output format for CLI commands
    pub default_output_format: String,

    /// UTC offset, in minutes, used for instants in human output
    pub display_offset_minutes: i32,
}

impl LimitsCliConfig {
    /// Create a new configuration instance with values from environment variables
    /// or sensible defaults if not set
    #[must_use]
    pub fn new() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable lookup
    #[must_use]
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            ledger_path: lookup("TALLY_LEDGER_PATH")
                .map_or_else(|| PathBuf::from("payments.json"), PathBuf::from),

            default_output_format: lookup("TALLY_DEFAULT_OUTPUT_FORMAT")
                .unwrap_or_else(|| "human".to_string()),

            display_offset_minutes: lookup("TALLY_DISPLAY_OFFSET_MINUTES")
                .and_then(|s| s.trim().parse().ok())
                .unwrap_or(0),
        }
    }

    /// Format an instant for human output at the configured display offset
    #[must_use]
    pub fn format_instant(&self, instant: &DateTime<Utc>) -> String {
        format_instant_at_offset(instant, self.display_offset_minutes)
    }
}

impl Default for LimitsCliConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tally_entitlements::time::parse_instant;

    fn config_from(vars: &[(&str, &str)]) -> LimitsCliConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(key, value)| ((*key).to_string(), (*value).to_string()))
            .collect();
        LimitsCliConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_config_defaults() {
        let config = config_from(&[]);

        assert_eq!(config.ledger_path, PathBuf::from("payments.json"));
        assert_eq!(config.default_output_format, "human");
        assert_eq!(config.display_offset_minutes, 0);
    }

    #[test]
    fn test_config_overrides() {
        let config = config_from(&[
            ("TALLY_LEDGER_PATH", "/var/lib/tally/ledger.json"),
            ("TALLY_DEFAULT_OUTPUT_FORMAT", "json"),
            ("TALLY_DISPLAY_OFFSET_MINUTES", "-300"),
        ]);

        assert_eq!(config.ledger_path, PathBuf::from("/var/lib/tally/ledger.json"));
        assert_eq!(
            parse_output_format(&config.default_output_format).unwrap(),
            OutputFormat::Json
        );
        assert_eq!(config.display_offset_minutes, -300);
    }

    #[test]
    fn test_invalid_offset_falls_back_to_utc() {
        let config = config_from(&[("TALLY_DISPLAY_OFFSET_MINUTES", "east")]);
        assert_eq!(config.display_offset_minutes, 0);
    }

    #[test]
    fn test_format_instant_at_display_offset() {
        let instant = parse_instant("2008-04-01T00:00:00.000-0500").unwrap();

        let utc = config_from(&[]);
        assert_eq!(utc.format_instant(&instant), "2008-04-01T05:00:00.000Z");

        let prague = config_from(&[("TALLY_DISPLAY_OFFSET_MINUTES", "60")]);
        assert_eq!(prague.format_instant(&instant), "2008-04-01T06:00:00.000+01:00");
    }

    #[test]
    fn test_parse_output_format() {
        assert_eq!(parse_output_format("HUMAN").unwrap(), OutputFormat::Human);
        assert_eq!(parse_output_format("json").unwrap(), OutputFormat::Json);
        assert!(parse_output_format("yaml").is_err());
    }
}
