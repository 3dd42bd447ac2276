//! Recurring charge insights
//!
//! Turns detector candidates into the insight and alert records shown to the
//! user. Persistence is the caller's job; these are plain values.

use serde_json::json;
use sha2::{Digest, Sha256};

use super::types::{AlertDraft, AlertSeverity, DetectionReport, InsightDraft};
use crate::config::AlertConfig;
use crate::models::{Cadence, RecurringCandidate};

/// Headline shared by the insight and the alert
pub fn title(candidate: &RecurringCandidate) -> String {
    format!("Recurring charge detected: {}", candidate.merchant)
}

/// Body text shared by the insight and the alert
pub fn content(candidate: &RecurringCandidate) -> String {
    format!(
        "We detected a likely {} recurring charge of about ${} ({} occurrences). Review and cancel if unused.",
        candidate.cadence,
        candidate.avg_amount_display(),
        candidate.count
    )
}

/// Monthly bills are the more likely forgotten subscription
pub fn score(cadence: Cadence) -> f64 {
    match cadence {
        Cadence::Monthly => 0.7,
        Cadence::Weekly => 0.6,
    }
}

pub fn severity(candidate: &RecurringCandidate, config: &AlertConfig) -> AlertSeverity {
    if candidate.avg_amount_cents >= config.medium_severity_min_cents {
        AlertSeverity::Medium
    } else {
        AlertSeverity::Low
    }
}

/// SHA-256 of `merchant|cadence`, hex encoded
pub fn dedupe_key(candidate: &RecurringCandidate) -> String {
    let mut hasher = Sha256::new();
    hasher.update(candidate.merchant.as_bytes());
    hasher.update(b"|");
    hasher.update(candidate.cadence.as_str().as_bytes());
    hex::encode(hasher.finalize())
}

pub fn draft_insight(candidate: &RecurringCandidate) -> InsightDraft {
    InsightDraft {
        dedupe_key: dedupe_key(candidate),
        title: title(candidate),
        content: content(candidate),
        score: score(candidate.cadence),
        meta: json!({
            "recurring": true,
            "merchant": candidate.merchant,
            "cadence": candidate.cadence,
            "avgAmountCents": candidate.avg_amount_cents,
            "count": candidate.count,
            "lastDate": candidate.last_date.to_rfc3339(),
        }),
    }
}

pub fn draft_alert(candidate: &RecurringCandidate, config: &AlertConfig) -> AlertDraft {
    AlertDraft {
        dedupe_key: dedupe_key(candidate),
        severity: severity(candidate, config),
        title: title(candidate),
        content: content(candidate),
        meta: json!({
            "recurring": true,
            "merchant": candidate.merchant,
            "cadence": candidate.cadence,
            "avgAmountCents": candidate.avg_amount_cents,
            "count": candidate.count,
        }),
    }
}

/// One insight and one alert per candidate, in ranking order
pub fn draft_report(candidates: &[RecurringCandidate], config: &AlertConfig) -> DetectionReport {
    let insights: Vec<InsightDraft> = candidates.iter().map(draft_insight).collect();
    let alerts: Vec<AlertDraft> = candidates
        .iter()
        .map(|c| draft_alert(c, config))
        .collect();

    DetectionReport {
        detected: candidates.to_vec(),
        insights_created: insights.len(),
        alerts_created: alerts.len(),
        insights,
        alerts,
    }
}
