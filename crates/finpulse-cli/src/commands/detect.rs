//! Detection command implementation and shared config loading

use std::fmt::Write as _;
use std::path::Path;

use anyhow::{bail, Context, Result};
use finpulse_core::config::AppConfig;
use finpulse_core::detect::RecurringDetector;
use finpulse_core::import::{load_transactions_file, most_recent};
use finpulse_core::insights::{draft_report, DetectionReport};
use tracing::info;

use super::truncate;
use crate::cli::OutputFormat;

/// Load configuration from `--config`, the data-dir override, or defaults
pub fn load_config(config_path: Option<&Path>) -> Result<AppConfig> {
    AppConfig::load(config_path).context("Failed to load configuration")
}

/// Load, window and scan a transaction file, drafting insights and alerts
pub fn run_detection(
    config: &AppConfig,
    file: &Path,
    limit: Option<usize>,
) -> Result<DetectionReport> {
    let limit = limit.unwrap_or(config.import.max_transactions);
    if limit == 0 {
        bail!("--limit must be at least 1");
    }

    let transactions = load_transactions_file(file)
        .with_context(|| format!("Failed to load transactions from {}", file.display()))?;
    let loaded = transactions.len();
    let transactions = most_recent(transactions, limit);
    info!(
        "Loaded {} outflows from {} (scanning {})",
        loaded,
        file.display(),
        transactions.len()
    );

    let detector = RecurringDetector::with_config(config.recurring.clone());
    let candidates = detector.detect(&transactions);
    Ok(draft_report(&candidates, &config.alerts))
}

pub fn cmd_detect(
    config_path: Option<&Path>,
    file: &Path,
    format: OutputFormat,
    limit: Option<usize>,
) -> Result<()> {
    let config = load_config(config_path)?;
    let report = run_detection(&config, file, limit)?;

    match format {
        OutputFormat::Table => print!("{}", render_table(&report)),
        OutputFormat::Json => println!(
            "{}",
            serde_json::to_string_pretty(&report).context("Failed to serialize report")?
        ),
    }

    Ok(())
}

/// Human-readable summary of a detection report
pub fn render_table(report: &DetectionReport) -> String {
    let mut out = String::new();

    if report.detected.is_empty() {
        let _ = writeln!(out, "No recurring charges detected.");
        return out;
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "🔁 Recurring Charges");
    let _ = writeln!(
        out,
        "   ─────────────────────────────────────────────────────────────"
    );

    for (candidate, alert) in report.detected.iter().zip(&report.alerts) {
        let _ = writeln!(
            out,
            "   {:24} │ {:>9}/{:<7} │ x{:<3} │ last {} │ {}",
            truncate(&candidate.merchant, 24),
            format!("${}", candidate.avg_amount_display()),
            candidate.cadence.as_str(),
            candidate.count,
            candidate.last_date.format("%Y-%m-%d"),
            alert.severity
        );
    }

    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "   {} insights, {} alerts drafted",
        report.insights_created, report.alerts_created
    );
    out
}
