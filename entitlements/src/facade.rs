//! Entitlement facade
//!
//! Entry point for quota-checking call sites. The facade owns nothing but its
//! payment store: each call fetches a fresh snapshot, resolves coverage and
//! packages the result. There is no caching, so a payment confirmed a moment
//! ago is reflected by the next call.

use crate::{
    error::{EntitlementError, Result},
    limits::{compute_service_limits_at, ServiceLimits},
    payment::PaymentRecord,
    store::PaymentStore,
};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Computes service limits of organizations from their payment history
#[derive(Debug, Clone)]
pub struct EntitlementFacade<S> {
    store: S,
}

impl<S: PaymentStore> EntitlementFacade<S> {
    /// Create a facade reading payments from `store`
    #[must_use]
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    /// The underlying payment store
    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Service limits of an organization at a given instant
    ///
    /// # Errors
    /// Returns [`EntitlementError::Unavailable`] if the payment store fails
    ///
    /// # Example
    /// ```
    /// use tally_entitlements::{
    ///     time::parse_instant, EntitlementFacade, InMemoryPaymentStore, PaymentRecord,
    ///     ServiceLevel,
    /// };
    ///
    /// # fn main() -> tally_entitlements::Result<()> {
    /// let store = InMemoryPaymentStore::new();
    /// let payment = PaymentRecord::new(
    ///     "p-1",
    ///     parse_instant("2011-04-01T00:00:00.000+0100")?,
    ///     parse_instant("2011-04-30T23:59:59.999+0100")?,
    ///     ServiceLevel::Basic,
    /// );
    /// store.insert_payment("org-1", payment)?;
    /// store.mark_paid("org-1", "p-1")?;
    ///
    /// let facade = EntitlementFacade::new(store);
    /// let limits = facade.service_limits_at("org-1", &parse_instant("2011-04-15T12:00:00.000+0100")?)?;
    /// assert_eq!(limits.service_level, ServiceLevel::Basic);
    /// # Ok(())
    /// # }
    /// ```
    pub fn service_limits_at(
        &self,
        organization_id: &str,
        at: &DateTime<Utc>,
    ) -> Result<ServiceLimits> {
        let records = self.fetch(organization_id)?;
        let limits = compute_service_limits_at(&records, at);
        debug!(
            organization_id,
            service_level = %limits.service_level,
            records = records.len(),
            "Computed service limits at {at}"
        );
        Ok(limits)
    }

    /// Service limits of an organization right now
    ///
    /// # Errors
    /// Returns [`EntitlementError::Unavailable`] if the payment store fails
    pub fn current_service_limits(&self, organization_id: &str) -> Result<ServiceLimits> {
        self.service_limits_at(organization_id, &Utc::now())
    }

    /// Current service limits for several organizations, keyed by id
    ///
    /// All organizations are evaluated at the same instant.
    ///
    /// # Errors
    /// Returns the first [`EntitlementError::Unavailable`] encountered
    pub fn current_service_limits_for<'a, I>(
        &self,
        organization_ids: I,
    ) -> Result<BTreeMap<String, ServiceLimits>>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let now = Utc::now();
        organization_ids
            .into_iter()
            .map(|organization_id| {
                self.service_limits_at(organization_id, &now)
                    .map(|limits| (organization_id.to_string(), limits))
            })
            .collect()
    }

    /// All payments of an organization, newest coverage first
    ///
    /// Sorted by `valid_until` descending, then `valid_from` descending, then id.
    ///
    /// # Errors
    /// Returns [`EntitlementError::Unavailable`] if the payment store fails
    pub fn payments(&self, organization_id: &str) -> Result<Vec<PaymentRecord>> {
        let mut records = self.fetch(organization_id)?;
        records.sort_by(|a, b| {
            b.valid_until
                .cmp(&a.valid_until)
                .then_with(|| b.valid_from.cmp(&a.valid_from))
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(records)
    }

    /// A single payment of an organization
    ///
    /// # Errors
    /// Returns [`EntitlementError::PaymentNotFound`] if no such payment exists,
    /// or [`EntitlementError::Unavailable`] if the payment store fails
    pub fn payment(&self, organization_id: &str, payment_id: &str) -> Result<PaymentRecord> {
        self.fetch(organization_id)?
            .into_iter()
            .find(|record| record.id == payment_id)
            .ok_or_else(|| EntitlementError::PaymentNotFound {
                organization_id: organization_id.to_string(),
                payment_id: payment_id.to_string(),
            })
    }

    fn fetch(&self, organization_id: &str) -> Result<Vec<PaymentRecord>> {
        self.store
            .list_payment_records(organization_id)
            .map_err(|source| {
                warn!(organization_id, error = %source, "Payment store unavailable");
                EntitlementError::unavailable(organization_id, source)
            })
    }
}
