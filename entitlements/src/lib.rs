//! Tally Entitlements - service levels and resource limits from payment history
//!
//! This crate decides what an organization is entitled to at a given instant
//! based on its payments. It includes:
//!
//! - The payment record model with typed parameter overrides
//! - Coverage resolution over overlapping, gapped and back-to-back windows
//! - A facade that reads payments through a pluggable [`PaymentStore`]
//! - Validation helpers and an in-memory store for tests and tooling
//!
//! Computation is pure: identical payments and instant always yield identical
//! [`ServiceLimits`]. Nothing is cached and nothing is written.
//!
//! # Example Usage
//!
//! ```
//! use tally_entitlements::{
//!     time::parse_instant, EntitlementFacade, InMemoryPaymentStore, ParamKey, ParamSource,
//!     PaymentRecord, ServiceLevel,
//! };
//!
//! # fn main() -> tally_entitlements::Result<()> {
//! let store = InMemoryPaymentStore::new();
//! let april = PaymentRecord::new(
//!     "p-april",
//!     parse_instant("2007-04-01T00:00:00.000-0500")?,
//!     parse_instant("2007-04-30T23:59:59.999-0500")?,
//!     ServiceLevel::Basic,
//! )
//! .with_param(ParamKey::MaxCreatedRecords, 300);
//! let may = PaymentRecord::new(
//!     "p-may",
//!     parse_instant("2007-05-01T00:00:00.000-0500")?,
//!     parse_instant("2007-05-31T23:59:59.999-0500")?,
//!     ServiceLevel::Basic,
//! );
//! store.insert_payment("org-1", april)?;
//! store.insert_payment("org-1", may)?;
//! store.mark_paid("org-1", "p-april")?;
//! store.mark_paid("org-1", "p-may")?;
//!
//! let facade = EntitlementFacade::new(store);
//! let limits = facade.service_limits_at("org-1", &parse_instant("2007-04-15T12:00:00.000+0100")?)?;
//!
//! assert_eq!(limits.service_level, ServiceLevel::Basic);
//! assert_eq!(limits.valid_until, Some(parse_instant("2007-05-31T23:59:59.999-0500")?));
//! assert_eq!(limits.get_param_int(ParamKey::MaxCreatedRecords, 0)?, 300);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod coverage;
pub mod error;
pub mod facade;
pub mod limits;
pub mod params;
pub mod payment;
pub mod store;
pub mod time;
pub mod validation;

// Re-export commonly used items
pub use coverage::{resolve_coverage, Coverage};
pub use error::{EntitlementError, Result};
pub use facade::EntitlementFacade;
pub use limits::{compute_service_limits_at, ServiceLimits};
pub use params::ParamSource;
pub use payment::{ParamKey, ParamMap, ParamValue, PaymentRecord, PaymentState, ServiceLevel};
pub use store::{InMemoryPaymentStore, PaymentLedger, PaymentStore, StoreError};
pub use validation::{find_malformed, validate_new_payment, validate_payment_record};
