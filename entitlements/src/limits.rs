//! Computed service limits
//!
//! [`ServiceLimits`] is the per-call answer to "what is this organization
//! entitled to at instant T". It is never stored: every call derives it again
//! from the current payment snapshot.

use crate::{
    coverage::resolve_coverage,
    params::ParamSource,
    payment::{ParamMap, PaymentRecord, ServiceLevel},
    time,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Effective tier, expiry and parameters of an organization
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceLimits {
    /// Effective tier at the query instant
    pub service_level: ServiceLevel,
    /// Last instant of uninterrupted paid coverage; `None` on the free tier
    #[serde(with = "time::instant::option", default)]
    pub valid_until: Option<DateTime<Utc>>,
    /// Parameters of the covering payment
    #[serde(default)]
    pub params: ParamMap,
}

impl ServiceLimits {
    /// Free tier without expiry and without overrides
    pub const FREE: Self = Self {
        service_level: ServiceLevel::Free,
        valid_until: None,
        params: ParamMap::new(),
    };

    /// Whether this is the free tier
    #[must_use]
    pub fn is_free(&self) -> bool {
        self.service_level == ServiceLevel::Free
    }

    /// Whether the paid coverage still holds at `at`
    ///
    /// Always true on the free tier, which never expires.
    #[must_use]
    pub fn is_valid_at(&self, at: &DateTime<Utc>) -> bool {
        self.valid_until
            .map_or(true, |until| time::to_millis(at) <= time::to_millis(&until))
    }
}

impl Default for ServiceLimits {
    fn default() -> Self {
        Self::FREE
    }
}

impl ParamSource for ServiceLimits {
    fn params(&self) -> &ParamMap {
        &self.params
    }
}

/// Compute service limits from a payment snapshot at a given instant
///
/// Pure and deterministic: the same records and instant always produce the
/// same result. Records are never modified.
///
/// # Example
/// ```
/// use tally_entitlements::{compute_service_limits_at, ServiceLevel, ServiceLimits};
/// use chrono::Utc;
///
/// let limits = compute_service_limits_at(&[], &Utc::now());
/// assert_eq!(limits, ServiceLimits::FREE);
/// assert_eq!(limits.service_level, ServiceLevel::Free);
/// ```
#[must_use]
pub fn compute_service_limits_at(records: &[PaymentRecord], at: &DateTime<Utc>) -> ServiceLimits {
    resolve_coverage(records, at).map_or(ServiceLimits::FREE, |coverage| ServiceLimits {
        service_level: coverage.record.service_level,
        valid_until: Some(coverage.valid_until),
        params: coverage.record.params.clone(),
    })
}
