//! Typed access to payment parameters
//!
//! Parameters are stored untyped on each payment. Readers ask for a specific
//! type together with a default: a missing key yields the default, a present
//! key with an incompatible value yields [`EntitlementError::ParamCoercion`]
//! so that a wrong value is never silently used.
//!
//! | accessor            | `Int`        | `Bool`          | `Text`                              |
//! |---------------------|--------------|-----------------|-------------------------------------|
//! | [`ParamSource::get_param_int`]    | value        | error           | parsed as `i64`, else error         |
//! | [`ParamSource::get_param_bool`]   | error        | value           | `true` / `false`, else error        |
//! | [`ParamSource::get_param_string`] | decimal text | `true`/`false`  | value                               |

use crate::error::{EntitlementError, Result};
use crate::payment::{ParamKey, ParamMap, ParamValue, PaymentRecord};

/// Anything that carries a parameter map
pub trait ParamSource {
    /// The raw parameter overrides
    fn params(&self) -> &ParamMap;

    /// Raw value for a key, if present
    fn get_param(&self, key: ParamKey) -> Option<&ParamValue> {
        self.params().get(&key)
    }

    /// Read a parameter as an integer
    ///
    /// # Example
    /// ```
    /// use tally_entitlements::{ParamKey, ParamSource, PaymentRecord, ServiceLevel};
    /// use chrono::Utc;
    ///
    /// let now = Utc::now();
    /// let payment = PaymentRecord::new("p-1", now, now, ServiceLevel::Basic)
    ///     .with_param(ParamKey::AuditDays, 45);
    /// assert_eq!(payment.get_param_int(ParamKey::AuditDays, 14).unwrap(), 45);
    /// assert_eq!(payment.get_param_int(ParamKey::MaxUsers, 3).unwrap(), 3);
    /// ```
    fn get_param_int(&self, key: ParamKey, default: i64) -> Result<i64> {
        self.get_param(key)
            .map_or(Ok(default), |value| coerce_int(key, value))
    }

    /// Read a parameter as a boolean
    fn get_param_bool(&self, key: ParamKey, default: bool) -> Result<bool> {
        self.get_param(key)
            .map_or(Ok(default), |value| coerce_bool(key, value))
    }

    /// Read a parameter as text. Every stored value has a text form.
    fn get_param_string(&self, key: ParamKey, default: &str) -> String {
        self.get_param(key)
            .map_or_else(|| default.to_string(), coerce_string)
    }
}

impl ParamSource for PaymentRecord {
    fn params(&self) -> &ParamMap {
        &self.params
    }
}

impl ParamSource for ParamMap {
    fn params(&self) -> &ParamMap {
        self
    }
}

/// Interpret a stored value as an integer
pub fn coerce_int(key: ParamKey, value: &ParamValue) -> Result<i64> {
    match value {
        ParamValue::Int(number) => Ok(*number),
        ParamValue::Text(text) => text
            .trim()
            .parse::<i64>()
            .map_err(|_| coercion_error(key, "integer", value)),
        ParamValue::Bool(_) => Err(coercion_error(key, "integer", value)),
    }
}

/// Interpret a stored value as a boolean
pub fn coerce_bool(key: ParamKey, value: &ParamValue) -> Result<bool> {
    match value {
        ParamValue::Bool(flag) => Ok(*flag),
        ParamValue::Text(text) => {
            let text = text.trim();
            if text.eq_ignore_ascii_case("true") {
                Ok(true)
            } else if text.eq_ignore_ascii_case("false") {
                Ok(false)
            } else {
                Err(coercion_error(key, "boolean", value))
            }
        }
        ParamValue::Int(_) => Err(coercion_error(key, "boolean", value)),
    }
}

/// Text form of a stored value
#[must_use]
pub fn coerce_string(value: &ParamValue) -> String {
    match value {
        ParamValue::Int(number) => number.to_string(),
        ParamValue::Bool(flag) => flag.to_string(),
        ParamValue::Text(text) => text.clone(),
    }
}

fn coercion_error(key: ParamKey, expected: &'static str, value: &ParamValue) -> EntitlementError {
    EntitlementError::ParamCoercion {
        key,
        expected,
        found: value.describe(),
    }
}
