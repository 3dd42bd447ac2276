//! Core types for insight and alert drafts

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use crate::models::RecurringCandidate;

/// Severity of a drafted alert
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertSeverity {
    Low,
    Medium,
}

impl AlertSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertSeverity::Low => "low",
            AlertSeverity::Medium => "medium",
        }
    }
}

impl fmt::Display for AlertSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for AlertSeverity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "low" => Ok(AlertSeverity::Low),
            "medium" => Ok(AlertSeverity::Medium),
            _ => Err(format!("Unknown severity: {}", s)),
        }
    }
}

/// An insight ready to be persisted by the caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightDraft {
    /// Stable across runs for the same merchant and cadence
    pub dedupe_key: String,
    pub title: String,
    pub content: String,
    /// Confidence-style ranking score in [0, 1]
    pub score: f64,
    pub meta: Value,
}

/// An alert ready to be persisted by the caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertDraft {
    pub dedupe_key: String,
    pub severity: AlertSeverity,
    pub title: String,
    pub content: String,
    pub meta: Value,
}

/// Everything one detection run produced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectionReport {
    pub detected: Vec<RecurringCandidate>,
    pub insights: Vec<InsightDraft>,
    pub alerts: Vec<AlertDraft>,
    pub insights_created: usize,
    pub alerts_created: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_parse_and_display() {
        assert_eq!("LOW".parse::<AlertSeverity>().unwrap(), AlertSeverity::Low);
        assert_eq!(
            "medium".parse::<AlertSeverity>().unwrap(),
            AlertSeverity::Medium
        );
        assert!("high".parse::<AlertSeverity>().is_err());
        assert_eq!(AlertSeverity::Medium.to_string(), "medium");
        assert!(AlertSeverity::Medium > AlertSeverity::Low);
    }
}
