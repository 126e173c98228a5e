//! Expiration tracking tests
//!
//! Tests for expiration bucketing:
//! - days < 0 is expired
//! - 0 <= days <= 30 is near expiry
//! - days > 30 is ok
//! - no date is indeterminate

use chrono::{Duration, NaiveDate};
use proptest::prelude::*;
use shared::{
    classify_days, days_remaining, expiration_label, expiration_status, ExpirationStatus,
    NEAR_EXPIRY_DAYS,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn test_bucket_boundaries() {
        let today = date(2024, 6, 15);
        assert_eq!(expiration_status(Some(date(2024, 6, 14)), today), ExpirationStatus::Expired);
        assert_eq!(expiration_status(Some(today), today), ExpirationStatus::Near);
        assert_eq!(expiration_status(Some(date(2024, 7, 15)), today), ExpirationStatus::Near);
        assert_eq!(expiration_status(Some(date(2024, 7, 16)), today), ExpirationStatus::Ok);
        assert_eq!(expiration_status(None, today), ExpirationStatus::Indeterminate);
    }

    #[test]
    fn test_days_across_year_end() {
        assert_eq!(days_remaining(Some(date(2025, 1, 2)), date(2024, 12, 30)), Some(3));
        assert_eq!(days_remaining(Some(date(2024, 2, 28)), date(2024, 3, 1)), Some(-2));
    }

    #[test]
    fn test_labels() {
        assert_eq!(expiration_label(None), "N/A");
        assert_eq!(expiration_label(Some(-1)), "Vencido");
        assert_eq!(expiration_label(Some(0)), "Vence em 0 dias");
        assert_eq!(expiration_label(Some(12)), "Vence em 12 dias");
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        /// Bucketing depends only on the day count
        #[test]
        fn prop_bucket_by_days(days in -3650i64..3650) {
            let expected = if days < 0 {
                ExpirationStatus::Expired
            } else if days <= NEAR_EXPIRY_DAYS {
                ExpirationStatus::Near
            } else {
                ExpirationStatus::Ok
            };
            prop_assert_eq!(classify_days(Some(days)), expected);
        }

        /// Days remaining is the plain calendar difference
        #[test]
        fn prop_days_remaining_matches_offset(
            offset in -3650i64..3650,
            base in 0i64..20_000
        ) {
            let today = date(1990, 1, 1) + Duration::days(base);
            let expires = today + Duration::days(offset);
            prop_assert_eq!(days_remaining(Some(expires), today), Some(offset));
            prop_assert_eq!(
                expiration_status(Some(expires), today),
                classify_days(Some(offset))
            );
        }

        /// Only expired products are labelled "Vencido"
        #[test]
        fn prop_label_consistent_with_bucket(days in -400i64..400) {
            let label = expiration_label(Some(days));
            prop_assert_eq!(label == "Vencido", classify_days(Some(days)) == ExpirationStatus::Expired);
        }
    }
}
