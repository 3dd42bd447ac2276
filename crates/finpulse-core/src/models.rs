//! Domain models for finpulse

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An outflow transaction, already scoped to a single user
///
/// Direction and ownership are the caller's responsibility; the detector
/// treats every record it receives as money leaving the account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutflowTransaction {
    pub date: DateTime<Utc>,
    /// Raw display name as reported by the bank
    pub name: String,
    /// Amount in minor currency units (cents)
    pub amount_cents: u64,
}

impl OutflowTransaction {
    pub fn new(date: DateTime<Utc>, name: impl Into<String>, amount_cents: u64) -> Self {
        Self {
            date,
            name: name.into(),
            amount_cents,
        }
    }
}

/// Inferred billing interval of a recurring charge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Cadence {
    Weekly,
    Monthly,
}

impl Cadence {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
        }
    }
}

impl std::str::FromStr for Cadence {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "weekly" => Ok(Self::Weekly),
            "monthly" => Ok(Self::Monthly),
            _ => Err(format!("Unknown cadence: {}", s)),
        }
    }
}

impl std::fmt::Display for Cadence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A detected recurring-charge hypothesis
///
/// Computed fresh on every detection run; nothing here is persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecurringCandidate {
    /// Normalized merchant key the group was built from
    pub merchant: String,
    pub cadence: Cadence,
    /// Mean amount of the group, rounded to the nearest cent
    pub avg_amount_cents: u64,
    /// Total transactions in the group (not only the similar-amount ones)
    pub count: usize,
    pub last_date: DateTime<Utc>,
    /// Most recent dates in ascending order, at most four
    pub sample_dates: Vec<DateTime<Utc>>,
}

impl RecurringCandidate {
    /// Ranking metric: estimated total spend across the group
    pub fn estimated_spend_cents(&self) -> u128 {
        u128::from(self.avg_amount_cents) * self.count as u128
    }

    /// Average amount formatted as dollars, e.g. `15.49`
    pub fn avg_amount_display(&self) -> String {
        format_cents(self.avg_amount_cents)
    }
}

/// Format minor units as a two-decimal major-unit string
pub fn format_cents(cents: u64) -> String {
    format!("{}.{:02}", cents / 100, cents % 100)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_cadence_round_trips_through_str() {
        assert_eq!("weekly".parse::<Cadence>().unwrap(), Cadence::Weekly);
        assert_eq!("MONTHLY".parse::<Cadence>().unwrap(), Cadence::Monthly);
        assert!("yearly".parse::<Cadence>().is_err());
        assert_eq!(Cadence::Monthly.to_string(), "monthly");
    }

    #[test]
    fn test_candidate_serializes_camel_case() {
        let date = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        let candidate = RecurringCandidate {
            merchant: "netflix com".to_string(),
            cadence: Cadence::Monthly,
            avg_amount_cents: 1549,
            count: 4,
            last_date: date,
            sample_dates: vec![date],
        };

        let json = serde_json::to_value(&candidate).unwrap();
        assert_eq!(json["avgAmountCents"], 1549);
        assert_eq!(json["cadence"], "monthly");
        assert_eq!(json["sampleDates"].as_array().unwrap().len(), 1);
        assert!(json.get("lastDate").is_some());
    }

    #[test]
    fn test_format_cents() {
        assert_eq!(format_cents(1549), "15.49");
        assert_eq!(format_cents(5), "0.05");
        assert_eq!(format_cents(500000), "5000.00");
    }

    #[test]
    fn test_estimated_spend() {
        let date = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        let candidate = RecurringCandidate {
            merchant: "gym".to_string(),
            cadence: Cadence::Weekly,
            avg_amount_cents: 1500,
            count: 4,
            last_date: date,
            sample_dates: vec![],
        };
        assert_eq!(candidate.estimated_spend_cents(), 6000);
    }
}
