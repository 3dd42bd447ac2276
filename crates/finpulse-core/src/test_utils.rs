//! Test utilities for finpulse-core
//!
//! Builders for outflow transactions so tests can describe charge histories
//! in a line or two.

use chrono::{DateTime, Duration, TimeZone, Utc};

use crate::models::OutflowTransaction;

/// Midnight UTC on the given calendar day
pub fn at(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 0, 0, 0)
        .single()
        .expect("valid test date")
}

pub fn days_after(start: DateTime<Utc>, days: i64) -> DateTime<Utc> {
    start + Duration::days(days)
}

pub fn outflow(name: &str, date: DateTime<Utc>, amount_cents: u64) -> OutflowTransaction {
    OutflowTransaction::new(date, name, amount_cents)
}

/// One charge per amount, `step_days` apart, starting at `start`
pub fn series(
    name: &str,
    start: DateTime<Utc>,
    step_days: i64,
    amounts: &[u64],
) -> Vec<OutflowTransaction> {
    amounts
        .iter()
        .enumerate()
        .map(|(i, &amount)| outflow(name, days_after(start, step_days * i as i64), amount))
        .collect()
}
