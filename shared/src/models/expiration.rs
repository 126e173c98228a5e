//! Expiration tracking for perishable stock

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Products expiring within this many days are flagged as near expiry
pub const NEAR_EXPIRY_DAYS: i64 = 30;

/// Expiration bucket of a product
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ExpirationStatus {
    /// Already past its expiration date
    Expired,
    /// Expires within the near-expiry window (inclusive)
    Near,
    Ok,
    /// No expiration date recorded
    Indeterminate,
}

impl ExpirationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExpirationStatus::Expired => "expired",
            ExpirationStatus::Near => "near",
            ExpirationStatus::Ok => "ok",
            ExpirationStatus::Indeterminate => "indeterminate",
        }
    }
}

impl std::fmt::Display for ExpirationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whole days from `today` until `expiration_date`; negative once expired
pub fn days_remaining(expiration_date: Option<NaiveDate>, today: NaiveDate) -> Option<i64> {
    expiration_date.map(|date| (date - today).num_days())
}

/// Bucket a days-remaining value
pub fn classify_days(days: Option<i64>) -> ExpirationStatus {
    match days {
        None => ExpirationStatus::Indeterminate,
        Some(d) if d < 0 => ExpirationStatus::Expired,
        Some(d) if d <= NEAR_EXPIRY_DAYS => ExpirationStatus::Near,
        Some(_) => ExpirationStatus::Ok,
    }
}

/// Bucket an expiration date relative to `today`
pub fn expiration_status(expiration_date: Option<NaiveDate>, today: NaiveDate) -> ExpirationStatus {
    classify_days(days_remaining(expiration_date, today))
}

/// Report label shown next to a product ("Vencido", "Vence em N dias", "N/A")
pub fn expiration_label(days: Option<i64>) -> String {
    match days {
        None => "N/A".to_string(),
        Some(d) if d < 0 => "Vencido".to_string(),
        Some(d) => format!("Vence em {} dias", d),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_bucket_boundaries() {
        let today = date(2024, 3, 1);
        assert_eq!(expiration_status(Some(date(2024, 2, 29)), today), ExpirationStatus::Expired);
        assert_eq!(expiration_status(Some(today), today), ExpirationStatus::Near);
        assert_eq!(expiration_status(Some(date(2024, 3, 31)), today), ExpirationStatus::Near);
        assert_eq!(expiration_status(Some(date(2024, 4, 1)), today), ExpirationStatus::Ok);
        assert_eq!(expiration_status(None, today), ExpirationStatus::Indeterminate);
    }

    #[test]
    fn test_days_remaining_across_year() {
        let today = date(2023, 12, 30);
        assert_eq!(days_remaining(Some(date(2024, 1, 2)), today), Some(3));
        assert_eq!(days_remaining(Some(date(2023, 12, 1)), today), Some(-29));
        assert_eq!(days_remaining(None, today), None);
    }

    #[test]
    fn test_labels() {
        assert_eq!(expiration_label(None), "N/A");
        assert_eq!(expiration_label(Some(-1)), "Vencido");
        assert_eq!(expiration_label(Some(0)), "Vence em 0 dias");
        assert_eq!(expiration_label(Some(45)), "Vence em 45 dias");
    }
}
