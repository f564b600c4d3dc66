//! Validation utilities for payment records

use crate::{
    error::{EntitlementError, Result},
    payment::{PaymentRecord, PaymentState, ServiceLevel},
    time::format_instant,
};

/// Check the window invariant `valid_from <= valid_until`
///
/// Records failing this check are ignored by the coverage resolver.
///
/// # Errors
/// Returns [`EntitlementError::InvalidRecord`] when the window is inverted
pub fn validate_payment_record(record: &PaymentRecord) -> Result<()> {
    if !record.has_valid_window() {
        return Err(EntitlementError::InvalidRecord {
            id: record.id.clone(),
            reason: format!(
                "valid from {} is after valid until {}",
                format_instant(&record.valid_from),
                format_instant(&record.valid_until)
            ),
        });
    }
    Ok(())
}

/// Validate a payment before it is handed to the payment gateway
///
/// On top of the window invariant a new payment must be priced, name its
/// currency, purchase at least one user seat, buy a paid tier and still be in
/// the [`PaymentState::Created`] state.
///
/// # Errors
/// Returns [`EntitlementError::InvalidRecord`] describing the first violation
pub fn validate_new_payment(record: &PaymentRecord) -> Result<()> {
    validate_payment_record(record)?;

    let invalid = |reason: String| EntitlementError::InvalidRecord {
        id: record.id.clone(),
        reason,
    };

    if record.amount <= 0 {
        return Err(invalid(format!(
            "amount must be greater than 0, got: {}",
            record.amount
        )));
    }

    if record.currency.trim().is_empty() {
        return Err(invalid("currency must not be empty".to_string()));
    }

    if record.users == 0 {
        return Err(invalid("at least one user seat must be purchased".to_string()));
    }

    if record.service_level == ServiceLevel::Free {
        return Err(invalid(format!(
            "service level {} cannot be purchased",
            record.service_level
        )));
    }

    if record.state != PaymentState::Created {
        return Err(invalid(format!(
            "new payments must be {}, got: {}",
            PaymentState::Created,
            record.state
        )));
    }

    Ok(())
}

/// Every record violating the window invariant, in input order
#[must_use]
pub fn find_malformed(records: &[PaymentRecord]) -> Vec<&PaymentRecord> {
    records
        .iter()
        .filter(|record| validate_payment_record(record).is_err())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::parse_instant;

    fn new_payment() -> PaymentRecord {
        PaymentRecord::new(
            "p-1",
            parse_instant("2011-04-01T00:00:00.000+0100").unwrap(),
            parse_instant("2011-04-30T23:59:59.999+0100").unwrap(),
            ServiceLevel::Basic,
        )
        .with_price(1770, "CZK")
        .with_users(10)
    }

    fn inverted(id: &str) -> PaymentRecord {
        let mut record = new_payment();
        record.id = id.to_string();
        std::mem::swap(&mut record.valid_from, &mut record.valid_until);
        record
    }

    #[test]
    fn test_validate_payment_record() {
        assert!(validate_payment_record(&new_payment()).is_ok());

        let error = validate_payment_record(&inverted("bad")).unwrap_err();
        assert_eq!(
            error.to_string(),
            "Invalid payment record bad: valid from 2011-04-30T22:59:59.999Z is after valid until 2011-03-31T23:00:00.000Z"
        );
    }

    #[test]
    fn test_single_instant_window_is_valid() {
        let mut record = new_payment();
        record.valid_until = record.valid_from;
        assert!(validate_payment_record(&record).is_ok());
    }

    #[test]
    fn test_validate_new_payment() {
        // Valid payment
        assert!(validate_new_payment(&new_payment()).is_ok());

        // Zero amount
        assert!(validate_new_payment(&new_payment().with_price(0, "CZK")).is_err());

        // Missing currency
        assert!(validate_new_payment(&new_payment().with_price(1770, " ")).is_err());

        // No users
        assert!(validate_new_payment(&new_payment().with_users(0)).is_err());

        // Free tier cannot be bought
        let mut free = new_payment();
        free.service_level = ServiceLevel::Free;
        assert!(validate_new_payment(&free).is_err());

        // Already paid
        assert!(validate_new_payment(&new_payment().with_state(PaymentState::Paid)).is_err());

        // Inverted window
        assert!(validate_new_payment(&inverted("bad")).is_err());
    }

    #[test]
    fn test_find_malformed() {
        let records = vec![new_payment(), inverted("bad-1"), new_payment(), inverted("bad-2")];
        let malformed: Vec<&str> = find_malformed(&records)
            .into_iter()
            .map(|record| record.id.as_str())
            .collect();
        assert_eq!(malformed, vec!["bad-1", "bad-2"]);
    }
}
