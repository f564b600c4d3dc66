//! Property tests for service limit computation

use chrono::{DateTime, FixedOffset, Utc};
use proptest::prelude::*;
use tally_entitlements::{
    compute_service_limits_at, time, ParamKey, PaymentRecord, PaymentState, ServiceLevel, ServiceLimits,
};

/// 2000-01-01T00:00:00Z
const EPOCH_2000: i64 = 946_684_800_000;
const DAY_MILLIS: i64 = 86_400_000;

fn instant(millis: i64) -> DateTime<Utc> {
    time::from_millis(millis).unwrap()
}

fn state_strategy() -> impl Strategy<Value = PaymentState> {
    prop_oneof![
        3 => Just(PaymentState::Paid),
        1 => Just(PaymentState::Created),
        1 => Just(PaymentState::Canceled),
        1 => Just(PaymentState::Refunded),
    ]
}

fn record_strategy() -> impl Strategy<Value = (i64, i64, PaymentState, bool)> {
    (0..365 * DAY_MILLIS, 0..60 * DAY_MILLIS, state_strategy(), any::<bool>())
}

fn records_strategy() -> impl Strategy<Value = Vec<PaymentRecord>> {
    prop::collection::vec(record_strategy(), 0..12).prop_map(|specs| {
        specs
            .into_iter()
            .enumerate()
            .map(|(index, (start, length, state, basic))| {
                let from = EPOCH_2000 + start;
                let level = if basic { ServiceLevel::Basic } else { ServiceLevel::Free };
                PaymentRecord::new(
                    format!("p-{index:02}"),
                    instant(from),
                    instant(from + length),
                    level,
                )
                .with_state(state)
                .with_param(ParamKey::MaxUsers, i64::try_from(index).unwrap())
            })
            .collect()
    })
}

proptest! {
    #[test]
    fn test_deterministic(records in records_strategy(), offset in 0..400 * DAY_MILLIS) {
        let at = instant(EPOCH_2000 + offset);
        prop_assert_eq!(
            compute_service_limits_at(&records, &at),
            compute_service_limits_at(&records, &at)
        );
    }

    #[test]
    fn test_input_order_does_not_matter(records in records_strategy(), offset in 0..400 * DAY_MILLIS) {
        let at = instant(EPOCH_2000 + offset);
        let mut reversed = records.clone();
        reversed.reverse();
        prop_assert_eq!(
            compute_service_limits_at(&records, &at),
            compute_service_limits_at(&reversed, &at)
        );
    }

    #[test]
    fn test_unpaid_records_never_grant(records in records_strategy(), offset in 0..400 * DAY_MILLIS) {
        let at = instant(EPOCH_2000 + offset);
        let unpaid: Vec<PaymentRecord> = records
            .into_iter()
            .filter(|record| record.state != PaymentState::Paid)
            .collect();
        prop_assert_eq!(compute_service_limits_at(&unpaid, &at), ServiceLimits::FREE);
    }

    #[test]
    fn test_paid_result_covers_query(records in records_strategy(), offset in 0..400 * DAY_MILLIS) {
        let at = instant(EPOCH_2000 + offset);
        let limits = compute_service_limits_at(&records, &at);
        match limits.valid_until {
            None => prop_assert!(records.iter().all(|record| !record.is_paid() || !record.covers(&at))),
            Some(until) => {
                prop_assert!(until >= at);
                prop_assert!(records.iter().any(|record| record.is_paid() && record.covers(&at)));
            }
        }
    }

    #[test]
    fn test_offset_of_query_does_not_matter(
        records in records_strategy(),
        offset in 0..400 * DAY_MILLIS,
        zone_minutes in -720i32..=840,
    ) {
        let at = instant(EPOCH_2000 + offset);
        let zone = FixedOffset::east_opt(zone_minutes * 60).unwrap();
        let written = at.with_timezone(&zone).format("%Y-%m-%dT%H:%M:%S%.3f%z").to_string();
        let parsed = time::parse_instant(&written).unwrap();
        prop_assert_eq!(
            compute_service_limits_at(&records, &at),
            compute_service_limits_at(&records, &parsed)
        );
    }
}
