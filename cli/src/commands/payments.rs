//! List payments command implementation

use crate::{
    config::{LimitsCliConfig, OutputFormat},
    ledger::LedgerFacade,
    utils::formatting::{format_payments_human, format_payments_json},
};
use anyhow::Result;
use tracing::info;

/// Execute the payments command
///
/// # Errors
/// Returns error if the payments are unavailable
pub fn execute(
    facade: &LedgerFacade,
    organization_id: &str,
    output_format: OutputFormat,
    config: &LimitsCliConfig,
) -> Result<String> {
    let payments = facade.payments(organization_id)?;
    info!("Found {} payments for organization {organization_id}", payments.len());

    match output_format {
        OutputFormat::Human => format_payments_human(organization_id, &payments, config),
        OutputFormat::Json => format_payments_json(organization_id, &payments),
    }
}
