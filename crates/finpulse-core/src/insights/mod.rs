//! Insight and alert drafting
//!
//! Each recurring charge candidate becomes one insight (for the feed) and one
//! alert (for the notification list). Severity and score come from the
//! candidate's amount and cadence.
//!
//! ## Usage
//!
//! ```rust
//! use finpulse_core::config::AlertConfig;
//! use finpulse_core::insights::draft_report;
//!
//! let report = draft_report(&[], &AlertConfig::default());
//! assert_eq!(report.alerts_created, 0);
//! ```

pub mod recurring_charge;
pub mod types;

pub use recurring_charge::{dedupe_key, draft_alert, draft_insight, draft_report};
pub use types::{AlertDraft, AlertSeverity, DetectionReport, InsightDraft};
