//! Ledger check command implementation
//!
//! Reports payments whose window is inverted. Such records never grant
//! coverage, so an organization relying on one silently falls back to the
//! free tier.

use crate::{
    config::{LimitsCliConfig, OutputFormat},
    ledger::LedgerFacade,
    utils::formatting::{format_check_human, format_check_json, MalformedPayments},
};
use anyhow::Result;
use tally_entitlements::find_malformed;
use tracing::{info, warn};

/// Execute the check command
///
/// # Errors
/// Returns error if the report cannot be rendered
pub fn execute(
    facade: &LedgerFacade,
    output_format: OutputFormat,
    config: &LimitsCliConfig,
) -> Result<String> {
    let ledger = facade.store().to_ledger();

    let findings: Vec<MalformedPayments<'_>> = ledger
        .organizations
        .iter()
        .filter_map(|(organization_id, records)| {
            let payments = find_malformed(records);
            if payments.is_empty() {
                return None;
            }
            warn!(
                organization_id = %organization_id,
                count = payments.len(),
                "Organization has malformed payments"
            );
            Some(MalformedPayments {
                organization_id,
                payments,
            })
        })
        .collect();
    info!(
        "Checked {} organizations, {} with malformed payments",
        ledger.organizations.len(),
        findings.len()
    );

    match output_format {
        OutputFormat::Human => format_check_human(&findings, config),
        OutputFormat::Json => format_check_json(&findings),
    }
}
