//! Current limits of every organization in the ledger

use crate::{
    config::{LimitsCliConfig, OutputFormat},
    ledger::LedgerFacade,
    utils::formatting::{format_workspaces_human, format_workspaces_json},
};
use anyhow::Result;
use tracing::info;

/// Execute the workspaces command
///
/// # Errors
/// Returns error if the payments of any organization are unavailable
pub fn execute(
    facade: &LedgerFacade,
    output_format: OutputFormat,
    config: &LimitsCliConfig,
) -> Result<String> {
    let ledger = facade.store().to_ledger();
    let limits = facade.current_service_limits_for(ledger.organization_ids())?;
    info!("Computed current limits for {} organizations", limits.len());

    match output_format {
        OutputFormat::Human => format_workspaces_human(&limits, config),
        OutputFormat::Json => format_workspaces_json(&limits),
    }
}
