//! Interval chain resolution
//!
//! Given a snapshot of an organization's payments and a query instant, find the
//! paid record covering the instant and follow back-to-back renewals to the
//! end of the uninterrupted entitlement.
//!
//! Rules:
//! 1. Only [`PaymentState::Paid`](crate::PaymentState::Paid) records count;
//!    records with an inverted window are skipped with a warning.
//! 2. A record covers `at` when `valid_from <= at <= valid_until`.
//! 3. Among several covering records the latest `valid_from` wins, then the
//!    highest service level, then the greatest id.
//! 4. A paid record starting exactly one millisecond after the current end
//!    extends the entitlement. All such renewals are followed and the furthest
//!    reachable end is reported. The first gap stops the chain.

use crate::{
    payment::PaymentRecord,
    time::{to_millis, TIME_UNIT_MILLIS},
    validation::validate_payment_record,
};
use chrono::{DateTime, Utc};
use std::cmp::Ordering;
use std::collections::{btree_map::Entry, BTreeMap, BTreeSet};
use tracing::{debug, warn};

/// Paid coverage of a query instant
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Coverage<'a> {
    /// Record that covers the instant. Tier and parameters come from it.
    pub record: &'a PaymentRecord,
    /// End of the uninterrupted chain starting at `record`
    pub valid_until: DateTime<Utc>,
    /// Renewals that extended the chain, in order
    pub chained: Vec<&'a PaymentRecord>,
}

/// Find the paid record covering `at` and extend it through contiguous renewals
///
/// Returns `None` when no paid record covers the instant.
#[must_use]
pub fn resolve_coverage<'a>(records: &'a [PaymentRecord], at: &DateTime<Utc>) -> Option<Coverage<'a>> {
    let paid = paid_records(records);

    let Some(covering) = paid
        .iter()
        .copied()
        .filter(|record| record.covers(at))
        .max_by(|a, b| precedence(a, b))
    else {
        debug!(
            records = records.len(),
            paid = paid.len(),
            "No paid coverage at {at}"
        );
        return None;
    };

    let chained = follow_chain(&paid, covering);
    let valid_until = chained
        .last()
        .map_or(covering.valid_until, |last| last.valid_until);

    debug!(
        payment_id = %covering.id,
        service_level = %covering.service_level,
        chained = chained.len(),
        "Resolved coverage at {at} valid until {valid_until}"
    );

    Some(Coverage {
        record: covering,
        valid_until,
        chained,
    })
}

/// Paid records with a well-formed window
fn paid_records(records: &[PaymentRecord]) -> Vec<&PaymentRecord> {
    records
        .iter()
        .filter(|record| record.is_paid())
        .filter(|record| match validate_payment_record(record) {
            Ok(()) => true,
            Err(error) => {
                warn!(payment_id = %record.id, %error, "Ignoring malformed payment record");
                false
            }
        })
        .collect()
}

/// Ordering among records covering the same instant; the greatest wins
fn precedence(a: &PaymentRecord, b: &PaymentRecord) -> Ordering {
    to_millis(&a.valid_from)
        .cmp(&to_millis(&b.valid_from))
        .then(a.service_level.cmp(&b.service_level))
        .then_with(|| a.id.cmp(&b.id))
}

/// Renewals extending `covering` to the furthest reachable end
///
/// Every paid record starting one millisecond after a reached end is
/// followed, so a shorter renewal with its own continuation is not lost to a
/// longer one starting at the same instant. Ends are expanded once each, in
/// ascending order, which keeps the walk finite and independent of input order.
fn follow_chain<'a>(paid: &[&'a PaymentRecord], covering: &'a PaymentRecord) -> Vec<&'a PaymentRecord> {
    let mut successors: BTreeMap<i64, Vec<&'a PaymentRecord>> = BTreeMap::new();
    for &record in paid {
        successors
            .entry(to_millis(&record.valid_from))
            .or_default()
            .push(record);
    }
    for records in successors.values_mut() {
        records.sort_by(|a, b| {
            to_millis(&a.valid_until)
                .cmp(&to_millis(&b.valid_until))
                .then_with(|| a.id.cmp(&b.id))
        });
    }

    // Each reached end with the renewal that first reached it
    let first_end = to_millis(&covering.valid_until);
    let mut reached: BTreeMap<i64, Option<&'a PaymentRecord>> = BTreeMap::from([(first_end, None)]);
    let mut pending = BTreeSet::from([first_end]);

    while let Some(end) = pending.pop_first() {
        let Some(next_start) = end.checked_add(TIME_UNIT_MILLIS) else {
            continue;
        };
        for &next in successors.get(&next_start).into_iter().flatten() {
            let next_end = to_millis(&next.valid_until);
            if next_end <= end {
                continue;
            }
            if let Entry::Vacant(slot) = reached.entry(next_end) {
                slot.insert(Some(next));
                pending.insert(next_end);
            }
        }
    }

    // Walk back from the furthest end to the covering record
    let mut chained = Vec::new();
    let mut cursor = reached.last_key_value().and_then(|(_, record)| *record);
    while let Some(record) = cursor {
        chained.push(record);
        let previous_end = to_millis(&record.valid_from).saturating_sub(TIME_UNIT_MILLIS);
        cursor = reached.get(&previous_end).copied().flatten();
    }
    chained.reverse();

    chained
}
