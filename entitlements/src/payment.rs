//! Payment record model
//!
//! A payment record describes one purchased coverage window for an
//! organization. Records are created by the payment initiation flow, switch to
//! [`PaymentState::Paid`] exactly once when the gateway confirms them, and are
//! read-only for the entitlements engine.

use crate::time::{self, to_millis};
use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Ordered service tiers. Later variants grant more.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ServiceLevel {
    /// Default tier without any paid coverage
    #[default]
    Free,
    /// Paid tier
    Basic,
}

impl ServiceLevel {
    /// Name used on the wire and in CLI output
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Free => "FREE",
            Self::Basic => "BASIC",
        }
    }
}

impl fmt::Display for ServiceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payment lifecycle states as reported by the gateway
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentState {
    Created,
    PaymentMethodChosen,
    Authorized,
    Paid,
    Canceled,
    Timeouted,
    Refunded,
    PartiallyRefunded,
}

impl PaymentState {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Created => "CREATED",
            Self::PaymentMethodChosen => "PAYMENT_METHOD_CHOSEN",
            Self::Authorized => "AUTHORIZED",
            Self::Paid => "PAID",
            Self::Canceled => "CANCELED",
            Self::Timeouted => "TIMEOUTED",
            Self::Refunded => "REFUNDED",
            Self::PartiallyRefunded => "PARTIALLY_REFUNDED",
        }
    }

    /// Whether the payment may still be confirmed by the gateway
    #[must_use]
    pub const fn is_pending(self) -> bool {
        matches!(
            self,
            Self::Created | Self::PaymentMethodChosen | Self::Authorized
        )
    }
}

impl fmt::Display for PaymentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Closed set of parameters a payment may override
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ParamKey {
    /// Maximum number of records an organization may create
    MaxCreatedRecords,
    /// Audit log retention in days
    AuditDays,
    MaxUsers,
    MaxProjects,
    MaxCollections,
    MaxFunctionsPerCollection,
    MaxRulesPerCollection,
    /// Whether automations are enabled
    Automation,
    /// Whether a custom domain may be configured
    CustomDomain,
}

impl ParamKey {
    /// Every key, in declaration order
    pub const ALL: [Self; 9] = [
        Self::MaxCreatedRecords,
        Self::AuditDays,
        Self::MaxUsers,
        Self::MaxProjects,
        Self::MaxCollections,
        Self::MaxFunctionsPerCollection,
        Self::MaxRulesPerCollection,
        Self::Automation,
        Self::CustomDomain,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MaxCreatedRecords => "MAX_CREATED_RECORDS",
            Self::AuditDays => "AUDIT_DAYS",
            Self::MaxUsers => "MAX_USERS",
            Self::MaxProjects => "MAX_PROJECTS",
            Self::MaxCollections => "MAX_COLLECTIONS",
            Self::MaxFunctionsPerCollection => "MAX_FUNCTIONS_PER_COLLECTION",
            Self::MaxRulesPerCollection => "MAX_RULES_PER_COLLECTION",
            Self::Automation => "AUTOMATION",
            Self::CustomDomain => "CUSTOM_DOMAIN",
        }
    }
}

impl fmt::Display for ParamKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Untyped parameter value as stored on a payment
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Int(i64),
    Bool(bool),
    Text(String),
}

impl ParamValue {
    /// Short description used in coercion errors
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::Int(value) => format!("integer {value}"),
            Self::Bool(value) => format!("boolean {value}"),
            Self::Text(value) => format!("string \"{value}\""),
        }
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for ParamValue {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// Parameter overrides carried by a payment
pub type ParamMap = BTreeMap<ParamKey, ParamValue>;

/// One purchased coverage window of an organization
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRecord {
    /// Unique payment identifier
    pub id: String,
    /// Creation instant, audit only
    #[serde(with = "time::instant")]
    pub created_at: DateTime<Utc>,
    /// Amount in minor currency units
    pub amount: i64,
    #[serde(default)]
    pub payment_method: String,
    /// First covered instant (inclusive)
    #[serde(with = "time::instant")]
    pub valid_from: DateTime<Utc>,
    /// Last covered instant (inclusive)
    #[serde(with = "time::instant")]
    pub valid_until: DateTime<Utc>,
    pub state: PaymentState,
    pub service_level: ServiceLevel,
    /// Number of purchased user seats
    #[serde(default)]
    pub users: u32,
    #[serde(default)]
    pub language: String,
    pub currency: String,
    #[serde(default)]
    pub params: ParamMap,
}

impl PaymentRecord {
    /// Create a new record in the [`PaymentState::Created`] state
    ///
    /// The creation instant is now, truncated to the millisecond timeline;
    /// billing metadata starts empty.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        valid_from: DateTime<Utc>,
        valid_until: DateTime<Utc>,
        service_level: ServiceLevel,
    ) -> Self {
        Self {
            id: id.into(),
            created_at: Utc::now().trunc_subsecs(3),
            amount: 0,
            payment_method: String::new(),
            valid_from,
            valid_until,
            state: PaymentState::Created,
            service_level,
            users: 0,
            language: String::new(),
            currency: String::new(),
            params: ParamMap::new(),
        }
    }

    /// Set the payment state
    #[must_use]
    pub fn with_state(mut self, state: PaymentState) -> Self {
        self.state = state;
        self
    }

    /// Set amount and currency
    #[must_use]
    pub fn with_price(mut self, amount: i64, currency: impl Into<String>) -> Self {
        self.amount = amount;
        self.currency = currency.into();
        self
    }

    /// Set the number of purchased user seats
    #[must_use]
    pub fn with_users(mut self, users: u32) -> Self {
        self.users = users;
        self
    }

    /// Add a parameter override
    #[must_use]
    pub fn with_param(mut self, key: ParamKey, value: impl Into<ParamValue>) -> Self {
        self.params.insert(key, value.into());
        self
    }

    /// Whether the gateway confirmed this payment
    #[must_use]
    pub fn is_paid(&self) -> bool {
        self.state == PaymentState::Paid
    }

    /// Whether the window satisfies `valid_from <= valid_until` on the millisecond timeline
    #[must_use]
    pub fn has_valid_window(&self) -> bool {
        to_millis(&self.valid_from) <= to_millis(&self.valid_until)
    }

    /// Whether the closed window contains `at`
    #[must_use]
    pub fn covers(&self, at: &DateTime<Utc>) -> bool {
        let at = to_millis(at);
        to_millis(&self.valid_from) <= at && at <= to_millis(&self.valid_until)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::parse_instant;

    fn april_2011() -> PaymentRecord {
        PaymentRecord::new(
            "p-1",
            parse_instant("2011-04-01T00:00:00.000+0100").unwrap(),
            parse_instant("2011-04-30T23:59:59.999+0100").unwrap(),
            ServiceLevel::Basic,
        )
    }

    #[test]
    fn test_service_level_ordering() {
        assert!(ServiceLevel::Free < ServiceLevel::Basic);
        assert_eq!(ServiceLevel::default(), ServiceLevel::Free);
    }

    #[test]
    fn test_new_record_is_created_and_unpaid() {
        let record = april_2011();
        assert_eq!(record.state, PaymentState::Created);
        assert!(!record.is_paid());
        assert!(record.with_state(PaymentState::Paid).is_paid());
    }

    #[test]
    fn test_pending_states() {
        assert!(PaymentState::Created.is_pending());
        assert!(PaymentState::Authorized.is_pending());
        assert!(!PaymentState::Paid.is_pending());
        assert!(!PaymentState::Canceled.is_pending());
    }

    #[test]
    fn test_covers_is_inclusive() {
        let record = april_2011();
        assert!(record.covers(&record.valid_from));
        assert!(record.covers(&record.valid_until));
        assert!(!record.covers(&parse_instant("2011-03-31T23:59:59.999+0100").unwrap()));
        assert!(!record.covers(&parse_instant("2011-05-01T00:00:00.000+0100").unwrap()));
    }

    #[test]
    fn test_window_within_one_millisecond_is_valid() {
        let until = parse_instant("2011-04-30T23:59:59.999100+0100").unwrap();
        let from = parse_instant("2011-04-30T23:59:59.999700+0100").unwrap();
        let record = PaymentRecord::new("p-1", from, until, ServiceLevel::Basic);

        assert!(record.has_valid_window());
        assert!(record.covers(&parse_instant("2011-04-30T23:59:59.999+0100").unwrap()));

        let inverted = PaymentRecord::new(
            "p-2",
            parse_instant("2011-05-01T00:00:00.000+0100").unwrap(),
            until,
            ServiceLevel::Basic,
        );
        assert!(!inverted.has_valid_window());
    }

    #[test]
    fn test_record_json_shape() {
        let record = april_2011()
            .with_price(1770, "CZK")
            .with_users(10)
            .with_param(ParamKey::MaxCreatedRecords, 300)
            .with_param(ParamKey::Automation, true);
        let json = serde_json::to_value(&record).unwrap();

        assert_eq!(json["validFrom"], "2011-03-31T23:00:00.000Z");
        assert_eq!(json["serviceLevel"], "BASIC");
        assert_eq!(json["state"], "CREATED");
        assert_eq!(json["params"]["MAX_CREATED_RECORDS"], 300);
        assert_eq!(json["params"]["AUTOMATION"], true);
    }

    #[test]
    fn test_record_from_platform_export() {
        let json = r#"{
            "id": "5ab0e2b1",
            "createdAt": "2011-03-20T10:00:00.000+0100",
            "amount": 1770,
            "validFrom": "2011-04-01T00:00:00.000+0100",
            "validUntil": "2011-04-30T23:59:59.999+0100",
            "state": "PAID",
            "serviceLevel": "BASIC",
            "currency": "CZK",
            "params": { "AUDIT_DAYS": 45, "CUSTOM_DOMAIN": "yes" }
        }"#;
        let record: PaymentRecord = serde_json::from_str(json).unwrap();

        assert!(record.is_paid());
        assert_eq!(record.valid_until, april_2011().valid_until);
        assert_eq!(record.params[&ParamKey::AuditDays], ParamValue::Int(45));
        assert_eq!(
            record.params[&ParamKey::CustomDomain],
            ParamValue::Text("yes".to_string())
        );
        assert_eq!(record.users, 0);
    }

    #[test]
    fn test_param_key_names_match_serde() {
        for key in ParamKey::ALL {
            let json = serde_json::to_value(key).unwrap();
            assert_eq!(json, key.as_str());
        }
    }
}
