//! Ledger loading
//!
//! The CLI reads a JSON payment ledger once per invocation and serves every
//! command from an in-memory store built from it.

use anyhow::{anyhow, Result};
use std::path::Path;
use tally_entitlements::{EntitlementFacade, InMemoryPaymentStore, PaymentLedger};
use tracing::{debug, info};

/// Facade over the payments of a loaded ledger
pub type LedgerFacade = EntitlementFacade<InMemoryPaymentStore>;

/// Read and parse a payment ledger file
///
/// # Errors
/// Returns an error if the file cannot be read or is not a valid ledger
pub async fn load_ledger(path: &Path) -> Result<PaymentLedger> {
    debug!("Reading payment ledger from {}", path.display());

    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| anyhow!("Failed to read ledger '{}': {e}", path.display()))?;

    let ledger = PaymentLedger::from_json(&text)
        .map_err(|e| anyhow!("Invalid ledger '{}': {e}", path.display()))?;

    info!(
        organizations = ledger.organizations.len(),
        "Loaded payment ledger"
    );
    Ok(ledger)
}

/// Load a ledger and wrap it into an entitlement facade
///
/// # Errors
/// Returns an error if the ledger cannot be loaded
pub async fn open_facade(path: &Path) -> Result<LedgerFacade> {
    let ledger = load_ledger(path).await?;
    Ok(EntitlementFacade::new(InMemoryPaymentStore::from_ledger(
        ledger,
    )))
}
