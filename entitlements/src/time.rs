//! Instant parsing, formatting and the engine's millisecond timeline
//!
//! Payment windows arrive with arbitrary UTC offsets. Everything is normalized
//! to `DateTime<Utc>` at the edge, and all entitlement comparisons happen on
//! integral milliseconds since the Unix epoch. One millisecond is the smallest
//! step between two windows that are considered back-to-back.

use crate::error::{EntitlementError, Result};
use chrono::{DateTime, FixedOffset, SecondsFormat, Utc};

/// Compact offset layout used by the platform's payment exports
/// (`2011-04-01T00:00:00.000+0100`).
const COMPACT_OFFSET_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f%z";

/// Smallest representable step on the entitlement timeline, in milliseconds
pub const TIME_UNIT_MILLIS: i64 = 1;

/// Parse an instant written with any UTC offset and normalize it to UTC
///
/// Accepts RFC 3339 (`2011-04-01T00:00:00.000+01:00`, `...Z`) and the compact
/// offset form without a colon (`2011-04-01T00:00:00.000+0100`).
///
/// # Example
/// ```
/// use tally_entitlements::time::parse_instant;
///
/// let a = parse_instant("2008-04-01T00:00:00.000-0500").unwrap();
/// let b = parse_instant("2008-04-01T06:00:00.000+01:00").unwrap();
/// assert_eq!(a, b);
/// ```
pub fn parse_instant(text: &str) -> Result<DateTime<Utc>> {
    let trimmed = text.trim();
    DateTime::parse_from_rfc3339(trimmed)
        .or_else(|_| DateTime::parse_from_str(trimmed, COMPACT_OFFSET_FORMAT))
        .map(|instant| instant.with_timezone(&Utc))
        .map_err(|e| EntitlementError::InvalidInstant(format!("'{trimmed}': {e}")))
}

/// Format an instant as RFC 3339 UTC with millisecond precision
#[must_use]
pub fn format_instant(instant: &DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Format an instant shifted to a fixed display offset
///
/// Offsets outside of +/- 24 hours fall back to UTC.
#[must_use]
pub fn format_instant_at_offset(instant: &DateTime<Utc>, offset_minutes: i32) -> String {
    offset_minutes
        .checked_mul(60)
        .and_then(FixedOffset::east_opt)
        .map_or_else(
            || format_instant(instant),
            |offset| {
                instant
                    .with_timezone(&offset)
                    .to_rfc3339_opts(SecondsFormat::Millis, true)
            },
        )
}

/// Position of an instant on the entitlement timeline
#[must_use]
pub fn to_millis(instant: &DateTime<Utc>) -> i64 {
    instant.timestamp_millis()
}

/// Instant for a position on the entitlement timeline
#[must_use]
pub fn from_millis(millis: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp_millis(millis)
}

/// Serde adapter for `DateTime<Utc>` fields that accepts any offset on input
pub mod instant {
    use super::{format_instant, parse_instant};
    use chrono::{DateTime, Utc};
    use serde::{de::Error as _, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        value: &DateTime<Utc>,
        serializer: S,
    ) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&format_instant(value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> std::result::Result<DateTime<Utc>, D::Error> {
        let text = String::deserialize(deserializer)?;
        parse_instant(&text).map_err(D::Error::custom)
    }

    /// Same as the parent adapter for `Option<DateTime<Utc>>` fields
    pub mod option {
        use super::super::{format_instant, parse_instant};
        use chrono::{DateTime, Utc};
        use serde::{de::Error as _, Deserialize, Deserializer, Serializer};

        #[allow(clippy::ref_option)] // serde passes the field by reference
        pub fn serialize<S: Serializer>(
            value: &Option<DateTime<Utc>>,
            serializer: S,
        ) -> std::result::Result<S::Ok, S::Error> {
            match value {
                Some(instant) => serializer.serialize_some(&format_instant(instant)),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> std::result::Result<Option<DateTime<Utc>>, D::Error> {
            Option::<String>::deserialize(deserializer)?
                .map(|text| parse_instant(&text).map_err(D::Error::custom))
                .transpose()
        }
    }
}
