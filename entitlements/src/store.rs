//! Payment store seam
//!
//! The engine reads payments through [`PaymentStore`] and never writes them.
//! [`InMemoryPaymentStore`] is the reference implementation used by tests and
//! the CLI; besides reads it simulates the external payment lifecycle
//! (creation and gateway confirmation) so scenarios can be replayed.

use crate::{
    error::{EntitlementError, Result},
    payment::{PaymentRecord, PaymentState},
    validation::validate_new_payment,
};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

/// Failure reported by a payment store implementation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Payment store error: {message}")]
pub struct StoreError {
    message: String,
}

impl StoreError {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Read-only source of an organization's payments
///
/// Implementations return a point-in-time snapshot in any order. An unknown
/// organization is an empty snapshot, not an error.
pub trait PaymentStore: Send + Sync {
    /// All payments of the organization
    fn list_payment_records(
        &self,
        organization_id: &str,
    ) -> std::result::Result<Vec<PaymentRecord>, StoreError>;
}

impl<S: PaymentStore + ?Sized> PaymentStore for Arc<S> {
    fn list_payment_records(
        &self,
        organization_id: &str,
    ) -> std::result::Result<Vec<PaymentRecord>, StoreError> {
        (**self).list_payment_records(organization_id)
    }
}

impl<S: PaymentStore + ?Sized> PaymentStore for &S {
    fn list_payment_records(
        &self,
        organization_id: &str,
    ) -> std::result::Result<Vec<PaymentRecord>, StoreError> {
        (**self).list_payment_records(organization_id)
    }
}

/// Serialized snapshot of payments grouped by organization
///
/// ```json
/// { "organizations": { "org-1": [ { "id": "p-1", ... } ] } }
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentLedger {
    #[serde(default)]
    pub organizations: BTreeMap<String, Vec<PaymentRecord>>,
}

impl PaymentLedger {
    /// Parse a ledger from JSON text
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Render the ledger as pretty JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Organization ids in ascending order
    pub fn organization_ids(&self) -> impl Iterator<Item = &str> {
        self.organizations.keys().map(String::as_str)
    }
}

/// Thread-safe in-memory payment store
#[derive(Debug, Default)]
pub struct InMemoryPaymentStore {
    payments: RwLock<HashMap<String, Vec<PaymentRecord>>>,
}

impl InMemoryPaymentStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store holding every payment of a ledger
    #[must_use]
    pub fn from_ledger(ledger: PaymentLedger) -> Self {
        Self {
            payments: RwLock::new(ledger.organizations.into_iter().collect()),
        }
    }

    /// Snapshot of the whole store as a ledger
    #[must_use]
    pub fn to_ledger(&self) -> PaymentLedger {
        PaymentLedger {
            organizations: self
                .payments
                .read()
                .iter()
                .map(|(organization_id, records)| (organization_id.clone(), records.clone()))
                .collect(),
        }
    }

    /// Store a payment for an organization as is, in whatever state it holds
    ///
    /// # Errors
    /// Returns an error if the organization already has a payment with the same id
    pub fn insert_payment(&self, organization_id: &str, record: PaymentRecord) -> Result<()> {
        let mut payments = self.payments.write();
        let records = payments.entry(organization_id.to_string()).or_default();
        if records.iter().any(|existing| existing.id == record.id) {
            return Err(EntitlementError::Generic(format!(
                "Payment {} already exists for organization {organization_id}",
                record.id
            )));
        }
        debug!(
            organization_id,
            payment_id = %record.id,
            state = %record.state,
            "Stored payment"
        );
        records.push(record);
        Ok(())
    }

    /// Create a new payment, as the payment initiation flow does
    ///
    /// The record is checked with [`validate_new_payment`] before it is stored.
    ///
    /// # Errors
    /// Returns [`EntitlementError::InvalidRecord`] if the payment is not a valid
    /// new payment, or an error if its id is already taken
    pub fn create_payment(&self, organization_id: &str, record: PaymentRecord) -> Result<()> {
        validate_new_payment(&record)?;
        self.insert_payment(organization_id, record)
    }

    /// Confirm a pending payment, as the gateway notification does
    ///
    /// # Errors
    /// Returns an error if the payment does not exist or is no longer pending
    pub fn mark_paid(&self, organization_id: &str, payment_id: &str) -> Result<PaymentRecord> {
        let mut payments = self.payments.write();
        let record = payments
            .get_mut(organization_id)
            .and_then(|records| records.iter_mut().find(|record| record.id == payment_id))
            .ok_or_else(|| EntitlementError::PaymentNotFound {
                organization_id: organization_id.to_string(),
                payment_id: payment_id.to_string(),
            })?;

        if !record.state.is_pending() {
            return Err(EntitlementError::InvalidStateTransition {
                id: record.id.clone(),
                from: record.state,
                to: PaymentState::Paid,
            });
        }

        record.state = PaymentState::Paid;
        debug!(organization_id, payment_id, "Payment marked as paid");
        Ok(record.clone())
    }

}

impl PaymentStore for InMemoryPaymentStore {
    fn list_payment_records(
        &self,
        organization_id: &str,
    ) -> std::result::Result<Vec<PaymentRecord>, StoreError> {
        Ok(self
            .payments
            .read()
            .get(organization_id)
            .cloned()
            .unwrap_or_default())
    }
}
