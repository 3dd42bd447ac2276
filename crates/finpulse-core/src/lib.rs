//! finpulse Core Library
//!
//! Shared functionality for the finpulse recurring charge detector:
//! - Merchant name normalization
//! - Recurring charge detection (grouping, cadence, amount stability, ranking)
//! - CSV loading of outflow transactions
//! - Insight and alert drafting from detected charges
//! - Threshold configuration with file overrides

pub mod config;
pub mod detect;
pub mod error;
pub mod import;
pub mod insights;
pub mod models;
pub mod normalize;

/// Test utilities including transaction builders
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use config::{AlertConfig, AppConfig, ImportConfig, RecurringConfig};
pub use detect::{
    detect_recurring_charges, find_recurring_charges, RecurringDetector, MAX_CANDIDATES,
};
pub use error::{Error, Result};
pub use insights::{AlertDraft, AlertSeverity, DetectionReport, InsightDraft};
pub use models::{Cadence, OutflowTransaction, RecurringCandidate};
pub use normalize::normalize_merchant;
