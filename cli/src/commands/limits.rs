//! Service limits command implementation

use crate::{
    config::{LimitsCliConfig, OutputFormat},
    ledger::LedgerFacade,
    utils::formatting::{format_limits_human, format_limits_json, LimitsReport},
};
use anyhow::{anyhow, Result};
use chrono::Utc;
use tally_entitlements::time::parse_instant;
use tracing::info;

/// Execute the limits command
///
/// Without `at_str` the limits are computed for the current instant.
///
/// # Errors
/// Returns error if the instant cannot be parsed or the payments are unavailable
pub fn execute(
    facade: &LedgerFacade,
    organization_id: &str,
    at_str: Option<&str>,
    output_format: OutputFormat,
    config: &LimitsCliConfig,
) -> Result<String> {
    let at = match at_str {
        Some(text) => parse_instant(text).map_err(|e| anyhow!("Invalid --at instant: {e}"))?,
        None => Utc::now(),
    };
    info!("Computing service limits for organization {organization_id} at {at}");

    let limits = facade.service_limits_at(organization_id, &at)?;
    let report = LimitsReport {
        organization_id,
        at,
        limits: &limits,
    };

    match output_format {
        OutputFormat::Human => format_limits_human(&report, config),
        OutputFormat::Json => format_limits_json(&report),
    }
}
