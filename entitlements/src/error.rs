//! Error types for the entitlements engine
//!
//! Entitlement computation itself never fails on bad data: malformed payment
//! records are skipped and an organization without paid coverage simply lands
//! on the free tier. The variants below cover the cases a caller has to decide
//! about on its own:
//!
//! - **`Unavailable`**: the payment store could not be read. Whether that means
//!   fail-open or fail-closed is the caller's policy.
//! - **`ParamCoercion`**: a stored parameter exists but has the wrong shape for
//!   the requested accessor.
//! - **`InvalidRecord`** / **`InvalidStateTransition`**: raised by validation
//!   helpers and by the in-memory store, never by the resolver.
//!
//! # Example
//!
//! ```rust
//! use tally_entitlements::{EntitlementError, EntitlementFacade, InMemoryPaymentStore};
//!
//! let facade = EntitlementFacade::new(InMemoryPaymentStore::new());
//! match facade.current_service_limits("org-1") {
//!     Ok(limits) => println!("tier: {}", limits.service_level),
//!     Err(EntitlementError::Unavailable { organization_id, .. }) => {
//!         println!("payment history of {organization_id} is unavailable");
//!     }
//!     Err(other) => println!("other error: {other}"),
//! }
//! ```

use crate::payment::{ParamKey, PaymentState};
use crate::store::StoreError;
use thiserror::Error;

/// Result type for entitlement operations
pub type Result<T> = std::result::Result<T, EntitlementError>;

/// Error types that can occur when computing entitlements
#[derive(Error, Debug)]
pub enum EntitlementError {
    /// The payment store could not provide the organization's records
    #[error("Entitlement unavailable for organization {organization_id}: {source}")]
    Unavailable {
        organization_id: String,
        #[source]
        source: StoreError,
    },

    /// A stored parameter cannot be read as the requested type
    #[error("Parameter {key} holds {found}, which cannot be read as {expected}")]
    ParamCoercion {
        key: ParamKey,
        expected: &'static str,
        found: String,
    },

    /// Payment record violates a data invariant
    #[error("Invalid payment record {id}: {reason}")]
    InvalidRecord { id: String, reason: String },

    /// Payment state change that the lifecycle does not allow
    #[error("Payment {id} cannot move from {from} to {to}")]
    InvalidStateTransition {
        id: String,
        from: PaymentState,
        to: PaymentState,
    },

    /// Payment does not exist for the organization
    #[error("Payment {payment_id} not found for organization {organization_id}")]
    PaymentNotFound {
        organization_id: String,
        payment_id: String,
    },

    /// Instant text could not be parsed
    #[error("Invalid instant: {0}")]
    InvalidInstant(String),

    /// Error from serde JSON
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with message
    #[error("Entitlements error: {0}")]
    Generic(String),
}

impl From<String> for EntitlementError {
    fn from(msg: String) -> Self {
        Self::Generic(msg)
    }
}

impl From<&str> for EntitlementError {
    fn from(msg: &str) -> Self {
        Self::Generic(msg.to_string())
    }
}

impl EntitlementError {
    /// Wrap a store failure for the given organization
    #[must_use]
    pub fn unavailable(organization_id: &str, source: StoreError) -> Self {
        Self::Unavailable {
            organization_id: organization_id.to_string(),
            source,
        }
    }

    /// Whether the error comes from the payment store rather than from the data
    #[must_use]
    pub const fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable { .. })
    }
}
