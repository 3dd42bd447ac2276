//! Detection configuration
//!
//! Thresholds are plain data passed into the detector; nothing here is global.
//!
//! ## Configuration Resolution
//!
//! Config is loaded with a three-layer resolution:
//! 1. An explicit path (e.g. `--config`), which must exist
//! 2. The override in the data dir (~/.local/share/finpulse/config/finpulse.toml)
//! 3. Embedded defaults (compiled into binary)
//!
//! Keys missing from a file keep their default values.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};

/// Embedded default config (compiled into binary)
const DEFAULT_CONFIG: &str = include_str!("../../../config/finpulse.toml");

/// Thresholds for recurring charge detection
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecurringConfig {
    /// Shortest gap (days, inclusive) counted as a weekly hit
    pub weekly_min_days: f64,
    /// Longest gap (days, inclusive) counted as a weekly hit
    pub weekly_max_days: f64,
    /// Shortest gap (days, inclusive) counted as a monthly hit
    pub monthly_min_days: f64,
    /// Longest gap (days, inclusive) counted as a monthly hit
    pub monthly_max_days: f64,
    /// Matching gaps required before a cadence is accepted
    pub min_cadence_hits: usize,
    /// Allowed relative difference between an amount and the group average
    pub amount_tolerance: f64,
    /// Transactions a merchant group needs to be considered
    pub min_occurrences: usize,
    /// Amounts that must be similar to the average
    pub min_similar_amounts: usize,
}

impl Default for RecurringConfig {
    fn default() -> Self {
        Self {
            weekly_min_days: 6.0,
            weekly_max_days: 8.0,
            monthly_min_days: 25.0,
            monthly_max_days: 35.0,
            min_cadence_hits: 2,
            amount_tolerance: 0.08,
            min_occurrences: 3,
            min_similar_amounts: 3,
        }
    }
}

impl RecurringConfig {
    pub fn is_weekly_gap(&self, days: f64) -> bool {
        days >= self.weekly_min_days && days <= self.weekly_max_days
    }

    pub fn is_monthly_gap(&self, days: f64) -> bool {
        days >= self.monthly_min_days && days <= self.monthly_max_days
    }

    /// Reject threshold combinations the detector cannot work with
    pub fn validate(&self) -> Result<()> {
        check_window("weekly", self.weekly_min_days, self.weekly_max_days)?;
        check_window("monthly", self.monthly_min_days, self.monthly_max_days)?;

        if !(0.0..1.0).contains(&self.amount_tolerance) {
            return Err(Error::Config(format!(
                "amount_tolerance must be in [0, 1), got {}",
                self.amount_tolerance
            )));
        }
        if self.min_cadence_hits == 0 {
            return Err(Error::Config("min_cadence_hits must be at least 1".into()));
        }
        if self.min_occurrences == 0 {
            return Err(Error::Config("min_occurrences must be at least 1".into()));
        }
        if self.min_similar_amounts == 0 {
            return Err(Error::Config(
                "min_similar_amounts must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

fn check_window(name: &str, min: f64, max: f64) -> Result<()> {
    if !min.is_finite() || !max.is_finite() || min < 0.0 {
        return Err(Error::Config(format!(
            "{} window must be finite and non-negative ({}..={})",
            name, min, max
        )));
    }
    if min > max {
        return Err(Error::Config(format!(
            "{}_min_days ({}) is greater than {}_max_days ({})",
            name, min, name, max
        )));
    }
    Ok(())
}

/// How detected charges are turned into alerts
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AlertConfig {
    /// Average amount (cents) at which an alert is raised as medium severity
    pub medium_severity_min_cents: u64,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            medium_severity_min_cents: 5000,
        }
    }
}

/// Transaction loading limits
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportConfig {
    /// Newest outflows scanned per detection run
    pub max_transactions: usize,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            max_transactions: 800,
        }
    }
}

/// Full application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AppConfig {
    pub recurring: RecurringConfig,
    pub alerts: AlertConfig,
    pub import: ImportConfig,
}

impl AppConfig {
    /// Load configuration, preferring `explicit` over the data-dir override
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let content = match explicit {
            Some(path) => read_config(path)?,
            None => match default_config_path() {
                Some(path) if path.exists() => read_config(&path)?,
                _ => {
                    debug!("Using embedded default config");
                    DEFAULT_CONFIG.to_string()
                }
            },
        };

        parse_config(&content)
    }

    /// Render the effective configuration as TOML
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to render config: {}", e)))
    }
}

/// Default config override path
pub fn default_config_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("finpulse").join("config").join("finpulse.toml"))
}

fn read_config(path: &Path) -> Result<String> {
    debug!("Loading config from {}", path.display());
    fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Failed to read {}: {}", path.display(), e)))
}

/// Raw config structure for TOML parsing
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    recurring: Option<RawRecurring>,
    alerts: Option<RawAlerts>,
    import: Option<RawImport>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawRecurring {
    weekly_min_days: Option<f64>,
    weekly_max_days: Option<f64>,
    monthly_min_days: Option<f64>,
    monthly_max_days: Option<f64>,
    min_cadence_hits: Option<usize>,
    amount_tolerance: Option<f64>,
    min_occurrences: Option<usize>,
    min_similar_amounts: Option<usize>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawAlerts {
    medium_severity_min_cents: Option<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawImport {
    max_transactions: Option<usize>,
}

/// Parse config from TOML content, layering it over the defaults
pub fn parse_config(content: &str) -> Result<AppConfig> {
    let raw: RawConfig = toml::from_str(content)
        .map_err(|e| Error::Config(format!("Invalid config TOML: {}", e)))?;

    let mut config = AppConfig::default();

    if let Some(r) = raw.recurring {
        let rc = &mut config.recurring;
        if let Some(v) = r.weekly_min_days {
            rc.weekly_min_days = v;
        }
        if let Some(v) = r.weekly_max_days {
            rc.weekly_max_days = v;
        }
        if let Some(v) = r.monthly_min_days {
            rc.monthly_min_days = v;
        }
        if let Some(v) = r.monthly_max_days {
            rc.monthly_max_days = v;
        }
        if let Some(v) = r.min_cadence_hits {
            rc.min_cadence_hits = v;
        }
        if let Some(v) = r.amount_tolerance {
            rc.amount_tolerance = v;
        }
        if let Some(v) = r.min_occurrences {
            rc.min_occurrences = v;
        }
        if let Some(v) = r.min_similar_amounts {
            rc.min_similar_amounts = v;
        }
    }

    if let Some(alerts) = raw.alerts {
        if let Some(v) = alerts.medium_severity_min_cents {
            config.alerts.medium_severity_min_cents = v;
        }
    }

    if let Some(import) = raw.import {
        if let Some(v) = import.max_transactions {
            if v == 0 {
                return Err(Error::Config("max_transactions must be at least 1".into()));
            }
            config.import.max_transactions = v;
        }
    }

    config.recurring.validate()?;
    Ok(config)
}
