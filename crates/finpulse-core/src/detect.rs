//! Recurring charge detection
//!
//! Finds merchants that bill on a weekly or monthly rhythm at a stable price:
//! 1. Group outflows by normalized merchant name
//! 2. Infer a cadence from the gaps between consecutive charges
//! 3. Confirm that enough amounts sit close to the group average
//! 4. Rank by estimated total spend and keep the top few
//!
//! Everything here is a pure function of its input; the detector never
//! mutates what it is given and holds no shared state.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::config::RecurringConfig;
use crate::models::{Cadence, OutflowTransaction, RecurringCandidate};
use crate::normalize::normalize_merchant;

/// Maximum candidates returned by one detection run
pub const MAX_CANDIDATES: usize = 10;

/// Dates kept on each candidate as a sample
pub const SAMPLE_DATES: usize = 4;

/// Two gaps are the least that can show a rhythm
const MIN_CADENCE_DATES: usize = 3;

const MILLIS_PER_DAY: f64 = 24.0 * 60.0 * 60.0 * 1000.0;

/// Detector bound to a set of thresholds
#[derive(Debug, Clone, Default)]
pub struct RecurringDetector {
    config: RecurringConfig,
}

impl RecurringDetector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: RecurringConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RecurringConfig {
        &self.config
    }

    /// Run detection over one user's outflow snapshot
    pub fn detect(&self, transactions: &[OutflowTransaction]) -> Vec<RecurringCandidate> {
        let candidates = find_recurring_charges(transactions, &self.config);
        info!(
            "Recurring detection: {} transactions scanned, {} candidates",
            transactions.len(),
            candidates.len()
        );
        candidates
    }
}

/// Detect recurring charges with the default thresholds
pub fn detect_recurring_charges(transactions: &[OutflowTransaction]) -> Vec<RecurringCandidate> {
    find_recurring_charges(transactions, &RecurringConfig::default())
}

/// Detect recurring charges, returning at most [`MAX_CANDIDATES`] ranked by
/// `avg_amount_cents * count` (highest first)
pub fn find_recurring_charges(
    transactions: &[OutflowTransaction],
    config: &RecurringConfig,
) -> Vec<RecurringCandidate> {
    let groups = group_by_merchant(transactions);

    let mut candidates: Vec<RecurringCandidate> = groups
        .into_iter()
        .filter_map(|(merchant, txs)| evaluate_group(merchant, txs, config))
        .collect();

    // Stable sort: equal spend keeps merchant-key order from the BTreeMap
    candidates.sort_by(|a, b| b.estimated_spend_cents().cmp(&a.estimated_spend_cents()));
    candidates.truncate(MAX_CANDIDATES);
    candidates
}

/// Partition transactions by normalized merchant key
///
/// Names that normalize to an empty key are dropped. Keys are kept in sorted
/// order so results never depend on input order.
pub fn group_by_merchant(
    transactions: &[OutflowTransaction],
) -> BTreeMap<String, Vec<&OutflowTransaction>> {
    let mut groups: BTreeMap<String, Vec<&OutflowTransaction>> = BTreeMap::new();
    for tx in transactions {
        let merchant = normalize_merchant(&tx.name);
        if merchant.is_empty() {
            debug!("Skipping transaction with no merchant text: {:?}", tx.name);
            continue;
        }
        groups.entry(merchant).or_default().push(tx);
    }
    groups
}

fn evaluate_group(
    merchant: String,
    mut txs: Vec<&OutflowTransaction>,
    config: &RecurringConfig,
) -> Option<RecurringCandidate> {
    if txs.len() < config.min_occurrences {
        return None;
    }

    txs.sort_by_key(|t| t.date);
    let dates: Vec<DateTime<Utc>> = txs.iter().map(|t| t.date).collect();

    let Some(cadence) = detect_cadence(&dates, config) else {
        debug!("{}: no weekly or monthly rhythm in {} charges", merchant, txs.len());
        return None;
    };

    let amounts: Vec<u64> = txs.iter().map(|t| t.amount_cents).collect();
    let avg = average_cents(&amounts);
    let similar = amounts
        .iter()
        .filter(|&&a| within_pct(a, avg, config.amount_tolerance))
        .count();
    if similar < config.min_similar_amounts {
        debug!(
            "{}: only {} of {} amounts near average {}",
            merchant,
            similar,
            amounts.len(),
            avg
        );
        return None;
    }

    let last_date = *dates.last()?;
    let sample_dates = dates[dates.len().saturating_sub(SAMPLE_DATES)..].to_vec();

    debug!(
        "{}: {} charge of {} cents x{}",
        merchant,
        cadence,
        avg,
        txs.len()
    );

    Some(RecurringCandidate {
        merchant,
        cadence,
        avg_amount_cents: avg,
        count: txs.len(),
        last_date,
        sample_dates,
    })
}

/// Infer a cadence from dates sorted ascending
///
/// Weekly wins when both rhythms reach the hit threshold.
pub fn detect_cadence(sorted_dates: &[DateTime<Utc>], config: &RecurringConfig) -> Option<Cadence> {
    if sorted_dates.len() < MIN_CADENCE_DATES {
        return None;
    }

    let gaps: Vec<f64> = sorted_dates
        .windows(2)
        .map(|w| diff_days(w[1], w[0]))
        .collect();

    let weekly_hits = gaps.iter().filter(|&&d| config.is_weekly_gap(d)).count();
    let monthly_hits = gaps.iter().filter(|&&d| config.is_monthly_gap(d)).count();

    if weekly_hits >= config.min_cadence_hits {
        Some(Cadence::Weekly)
    } else if monthly_hits >= config.min_cadence_hits {
        Some(Cadence::Monthly)
    } else {
        None
    }
}

/// Absolute distance between two instants in fractional days
pub fn diff_days(a: DateTime<Utc>, b: DateTime<Utc>) -> f64 {
    (a - b).num_milliseconds().unsigned_abs() as f64 / MILLIS_PER_DAY
}

/// Mean of `amounts`, rounded half-up to a whole cent (0 when empty)
pub fn average_cents(amounts: &[u64]) -> u64 {
    if amounts.is_empty() {
        return 0;
    }
    let n = amounts.len() as u128;
    let sum: u128 = amounts.iter().map(|&a| u128::from(a)).sum();
    // Quotient of a sum of u64 values by their count always fits in u64
    ((sum + n / 2) / n) as u64
}

/// Whether `a` and `b` differ by at most `pct` of the larger value
///
/// Zero on either side is never similar.
pub fn within_pct(a: u64, b: u64, pct: f64) -> bool {
    if a == 0 || b == 0 {
        return false;
    }
    let diff = a.abs_diff(b) as f64;
    diff / a.max(b) as f64 <= pct
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{at, days_after, outflow, series};

    #[test]
    fn test_diff_days_fractional_and_symmetric() {
        let a = at(2024, 1, 1);
        let b = a + chrono::Duration::hours(36);
        assert_eq!(diff_days(b, a), 1.5);
        assert_eq!(diff_days(a, b), 1.5);
    }

    #[test]
    fn test_average_cents_rounds_half_up() {
        assert_eq!(average_cents(&[]), 0);
        assert_eq!(average_cents(&[1549, 1540, 1558, 1549]), 1549);
        assert_eq!(average_cents(&[1, 2]), 2);
        assert_eq!(average_cents(&[1000, 1079, 1150]), 1076);
        assert_eq!(average_cents(&[u64::MAX, u64::MAX]), u64::MAX);
    }

    #[test]
    fn test_within_pct_boundaries() {
        assert!(within_pct(1079, 1000, 0.08));
        assert!(!within_pct(1150, 1000, 0.08));
        assert!(within_pct(920, 1000, 0.08));
        assert!(!within_pct(919, 1000, 0.08));
        assert!(within_pct(1000, 1000, 0.0));
    }

    #[test]
    fn test_within_pct_zero_never_similar() {
        assert!(!within_pct(0, 0, 0.08));
        assert!(!within_pct(0, 100, 0.08));
        assert!(!within_pct(100, 0, 1.0));
    }

    #[test]
    fn test_cadence_weekly() {
        let start = at(2024, 1, 1);
        let dates = vec![start, days_after(start, 7), days_after(start, 14)];
        assert_eq!(
            detect_cadence(&dates, &RecurringConfig::default()),
            Some(Cadence::Weekly)
        );
    }

    #[test]
    fn test_cadence_monthly() {
        let start = at(2024, 1, 15);
        let dates = vec![start, days_after(start, 31), days_after(start, 60)];
        assert_eq!(
            detect_cadence(&dates, &RecurringConfig::default()),
            Some(Cadence::Monthly)
        );
    }

    #[test]
    fn test_cadence_irregular_gaps() {
        let start = at(2024, 1, 1);
        let dates = vec![start, days_after(start, 9), days_after(start, 49)];
        assert_eq!(detect_cadence(&dates, &RecurringConfig::default()), None);
    }

    #[test]
    fn test_cadence_single_hit_is_not_enough() {
        let start = at(2024, 1, 1);
        let dates = vec![start, days_after(start, 7), days_after(start, 20)];
        assert_eq!(detect_cadence(&dates, &RecurringConfig::default()), None);
    }

    #[test]
    fn test_cadence_weekly_takes_priority() {
        let start = at(2024, 1, 1);
        let dates = vec![
            start,
            days_after(start, 7),
            days_after(start, 14),
            days_after(start, 44),
            days_after(start, 74),
        ];
        assert_eq!(
            detect_cadence(&dates, &RecurringConfig::default()),
            Some(Cadence::Weekly)
        );
    }

    #[test]
    fn test_cadence_window_edges_inclusive() {
        let start = at(2024, 1, 1);
        let weekly = vec![start, days_after(start, 6), days_after(start, 14)];
        assert_eq!(
            detect_cadence(&weekly, &RecurringConfig::default()),
            Some(Cadence::Weekly)
        );

        let monthly = vec![start, days_after(start, 25), days_after(start, 60)];
        assert_eq!(
            detect_cadence(&monthly, &RecurringConfig::default()),
            Some(Cadence::Monthly)
        );
    }

    #[test]
    fn test_cadence_fractional_gap_outside_window() {
        let start = at(2024, 1, 1);
        let late = chrono::Duration::days(8) + chrono::Duration::hours(1);
        let dates = vec![start, start + late, start + late + late];
        assert_eq!(detect_cadence(&dates, &RecurringConfig::default()), None);
    }

    #[test]
    fn test_cadence_needs_three_dates_even_with_relaxed_hits() {
        let config = RecurringConfig {
            min_cadence_hits: 1,
            ..RecurringConfig::default()
        };
        let start = at(2024, 1, 1);
        assert_eq!(detect_cadence(&[start, days_after(start, 7)], &config), None);
        assert_eq!(detect_cadence(&[], &config), None);
    }

    #[test]
    fn test_weekly_group_detected() {
        let txs = series("Corner Gym", at(2024, 2, 5), 7, &[1200, 1200, 1200]);
        let found = detect_recurring_charges(&txs);

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].merchant, "corner gym");
        assert_eq!(found[0].cadence, Cadence::Weekly);
        assert_eq!(found[0].avg_amount_cents, 1200);
        assert_eq!(found[0].count, 3);
    }

    #[test]
    fn test_irregular_group_discarded() {
        let start = at(2024, 1, 1);
        let txs = vec![
            outflow("Bakery", start, 900),
            outflow("Bakery", days_after(start, 9), 900),
            outflow("Bakery", days_after(start, 49), 900),
        ];
        assert!(detect_recurring_charges(&txs).is_empty());
    }

    #[test]
    fn test_two_transactions_never_qualify() {
        let txs = series("Streamflix", at(2024, 1, 1), 30, &[999, 999]);
        assert!(detect_recurring_charges(&txs).is_empty());
    }

    #[test]
    fn test_only_two_similar_amounts_discarded() {
        // avg 1000: 700 and 1300 are 30% off
        let txs = series("Utility", at(2024, 1, 1), 30, &[1000, 700, 1000, 1300]);
        assert!(detect_recurring_charges(&txs).is_empty());
    }

    #[test]
    fn test_outlier_allowed_when_three_similar() {
        // avg 1057: the 1400 charge is ~24% off, the rest ~5%
        let amounts = [1000, 1000, 1000, 1000, 1000, 1000, 1400];
        let txs = series("Utility", at(2024, 1, 1), 30, &amounts);
        let found = detect_recurring_charges(&txs);

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].avg_amount_cents, 1057);
        assert_eq!(found[0].count, 7);
    }

    #[test]
    fn test_zero_amount_group_discarded() {
        let txs = series("Free Trial", at(2024, 1, 1), 30, &[0, 0, 0, 0]);
        assert!(detect_recurring_charges(&txs).is_empty());
    }

    #[test]
    fn test_empty_merchant_excluded() {
        let txs = series("#4411 *", at(2024, 1, 1), 30, &[500, 500, 500]);
        assert!(detect_recurring_charges(&txs).is_empty());
        assert!(group_by_merchant(&txs).is_empty());
    }

    #[test]
    fn test_sample_dates_keep_latest_four() {
        let start = at(2024, 1, 1);
        let txs = series("Meal Kit", start, 7, &[6000; 6]);
        let found = detect_recurring_charges(&txs);

        let c = &found[0];
        assert_eq!(c.count, 6);
        assert_eq!(c.last_date, days_after(start, 35));
        assert_eq!(
            c.sample_dates,
            vec![
                days_after(start, 14),
                days_after(start, 21),
                days_after(start, 28),
                days_after(start, 35),
            ]
        );
    }

    #[test]
    fn test_sample_dates_shorter_group() {
        let start = at(2024, 1, 1);
        let txs = series("Meal Kit", start, 7, &[6000; 3]);
        let found = detect_recurring_charges(&txs);
        assert_eq!(found[0].sample_dates.len(), 3);
        assert_eq!(found[0].sample_dates[0], start);
    }

    #[test]
    fn test_ranking_by_estimated_spend() {
        let start = at(2024, 1, 1);
        let mut txs = series("Gym", start, 7, &[1500; 4]);
        txs.extend(series("Parking", start, 30, &[1900; 3]));

        let found = detect_recurring_charges(&txs);
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].merchant, "gym");
        assert_eq!(found[1].merchant, "parking");
    }

    #[test]
    fn test_ties_ordered_by_merchant() {
        let start = at(2024, 1, 1);
        let mut txs = series("Zeta Cloud", start, 30, &[1000; 3]);
        txs.extend(series("Alpha Cloud", start, 30, &[1000; 3]));

        let found = detect_recurring_charges(&txs);
        assert_eq!(found[0].merchant, "alpha cloud");
        assert_eq!(found[1].merchant, "zeta cloud");
    }

    #[test]
    fn test_capped_at_ten() {
        let start = at(2024, 1, 1);
        let names = [
            "Merchant A",
            "Merchant B",
            "Merchant C",
            "Merchant D",
            "Merchant E",
            "Merchant F",
            "Merchant G",
            "Merchant H",
            "Merchant I",
            "Merchant J",
            "Merchant K",
            "Merchant L",
            "Merchant M",
            "Merchant N",
            "Merchant O",
        ];
        let mut txs = Vec::new();
        for (i, name) in names.iter().enumerate() {
            let amount = 1000 + i as u64 * 100;
            txs.extend(series(name, start, 30, &[amount; 3]));
        }

        let found = detect_recurring_charges(&txs);
        assert_eq!(found.len(), MAX_CANDIDATES);
        assert_eq!(found[0].merchant, "merchant o");
        assert_eq!(found[9].merchant, "merchant f");
        let spends: Vec<u128> = found.iter().map(|c| c.estimated_spend_cents()).collect();
        assert!(spends.windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn test_entity_suffix_variants_grouped() {
        let start = at(2024, 1, 1);
        let txs = vec![
            outflow("Spotify Inc", start, 1099),
            outflow("SPOTIFY LLC", days_after(start, 30), 1099),
            outflow("spotify", days_after(start, 60), 1099),
        ];

        let found = detect_recurring_charges(&txs);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].merchant, "spotify");
        assert_eq!(found[0].count, 3);
    }

    #[test]
    fn test_input_not_mutated_and_repeatable() {
        let start = at(2024, 1, 1);
        let mut txs = series("Gym", start, 7, &[1500; 4]);
        txs.reverse();
        let snapshot = txs.clone();

        let first = detect_recurring_charges(&txs);
        let second = detect_recurring_charges(&txs);
        assert_eq!(first, second);
        assert_eq!(txs, snapshot);
    }

    #[test]
    fn test_detector_uses_its_config() {
        let start = at(2024, 1, 1);
        let txs = series("Gym", start, 7, &[1500; 3]);

        let strict = RecurringDetector::with_config(RecurringConfig {
            min_occurrences: 4,
            ..RecurringConfig::default()
        });
        assert!(strict.detect(&txs).is_empty());
        assert_eq!(RecurringDetector::new().detect(&txs).len(), 1);
    }
}
