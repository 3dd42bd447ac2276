//! CSV loading of outflow transactions
//!
//! Expected header (case-insensitive, any column order):
//! `date,name,amount[,direction]`
//!
//! - `name` may also be called `description` or `merchant`
//! - `amount` is in major units (`15.49`, `$1,015.49`, `-15.49`); a column
//!   named `amount_cents` holds integer minor units instead
//! - rows whose `direction` is `inflow`, `income` or `credit` are skipped

use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use csv::{ReaderBuilder, StringRecord};
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::OutflowTransaction;

/// Column positions resolved from the header row
#[derive(Debug)]
struct Columns {
    date: usize,
    name: usize,
    amount: usize,
    amount_in_cents: bool,
    direction: Option<usize>,
}

impl Columns {
    fn from_headers(headers: &StringRecord) -> Result<Self> {
        let date = find_column(headers, &["date", "transaction date"])
            .ok_or_else(|| Error::Import("Missing 'date' column".into()))?;
        let name = find_column(headers, &["name", "description", "merchant"])
            .ok_or_else(|| Error::Import("Missing 'name' column".into()))?;
        let (amount, amount_in_cents) = match find_column(headers, &["amount"]) {
            Some(i) => (i, false),
            None => (
                find_column(headers, &["amount_cents", "amountcents"])
                    .ok_or_else(|| Error::Import("Missing 'amount' column".into()))?,
                true,
            ),
        };
        let direction = find_column(headers, &["direction"]);

        Ok(Self {
            date,
            name,
            amount,
            amount_in_cents,
            direction,
        })
    }
}

fn find_column(headers: &StringRecord, names: &[&str]) -> Option<usize> {
    headers
        .iter()
        .position(|h| names.iter().any(|n| h.trim().eq_ignore_ascii_case(n)))
}

/// Load outflow transactions from a CSV file on disk
pub fn load_transactions_file(path: &Path) -> Result<Vec<OutflowTransaction>> {
    let file = File::open(path)?;
    parse_transactions_csv(file)
}

/// Parse outflow transactions from CSV data
///
/// Any malformed row fails the whole import.
pub fn parse_transactions_csv<R: Read>(reader: R) -> Result<Vec<OutflowTransaction>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let columns = Columns::from_headers(rdr.headers()?)?;
    let mut transactions = Vec::new();
    let mut skipped_inflows = 0;

    for result in rdr.records() {
        let record = result?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);

        if let Some(idx) = columns.direction {
            if is_inflow(record.get(idx).unwrap_or("")) {
                skipped_inflows += 1;
                continue;
            }
        }

        let field = |idx: usize, what: &str| {
            record
                .get(idx)
                .ok_or_else(|| Error::Import(format!("line {}: missing {}", line, what)))
        };

        let date = parse_date(field(columns.date, "date")?)
            .map_err(|e| Error::Import(format!("line {}: {}", line, e)))?;
        let name = field(columns.name, "name")?.to_string();
        let amount_str = field(columns.amount, "amount")?;
        let amount_cents = if columns.amount_in_cents {
            parse_cents(amount_str)
        } else {
            parse_amount_cents(amount_str)
        }
        .map_err(|e| Error::Import(format!("line {}: {}", line, e)))?;

        transactions.push(OutflowTransaction {
            date,
            name,
            amount_cents,
        });
    }

    debug!(
        "Parsed {} outflow transactions ({} inflows skipped)",
        transactions.len(),
        skipped_inflows
    );
    Ok(transactions)
}

/// Keep the newest `limit` transactions, newest first
pub fn most_recent(
    mut transactions: Vec<OutflowTransaction>,
    limit: usize,
) -> Vec<OutflowTransaction> {
    transactions.sort_by(|a, b| b.date.cmp(&a.date));
    if transactions.len() > limit {
        debug!(
            "Keeping newest {} of {} transactions",
            limit,
            transactions.len()
        );
        transactions.truncate(limit);
    }
    transactions
}

fn is_inflow(direction: &str) -> bool {
    matches!(
        direction.trim().to_lowercase().as_str(),
        "inflow" | "income" | "credit"
    )
}

/// Parse a date in RFC 3339, `YYYY-MM-DD`, `YYYY-MM-DD HH:MM:SS` or
/// `MM/DD/YYYY` form; dates without a zone are taken as UTC
pub fn parse_date(s: &str) -> Result<DateTime<Utc>> {
    let s = s.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Ok(dt.and_utc());
    }
    for fmt in ["%Y-%m-%d", "%m/%d/%Y"] {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            if let Some(dt) = d.and_hms_opt(0, 0, 0) {
                return Ok(dt.and_utc());
            }
        }
    }

    Err(Error::InvalidData(format!("Invalid date: {:?}", s)))
}

/// Parse a major-unit amount into absolute cents without float rounding
///
/// Accepts currency symbols, thousands separators, a leading sign and
/// accounting-style parentheses. At most two decimal places.
pub fn parse_amount_cents(s: &str) -> Result<u64> {
    let invalid = || Error::InvalidData(format!("Invalid amount: {:?}", s));

    let mut cleaned: String = s
        .trim()
        .chars()
        .filter(|c| !matches!(c, '$' | ',' | ' '))
        .collect();
    if cleaned.starts_with('(') && cleaned.ends_with(')') {
        cleaned = cleaned[1..cleaned.len() - 1].to_string();
    }
    let unsigned = cleaned
        .strip_prefix('-')
        .or_else(|| cleaned.strip_prefix('+'))
        .unwrap_or(cleaned.as_str());

    let (whole, frac) = match unsigned.split_once('.') {
        Some((w, f)) => (w, f),
        None => (unsigned, ""),
    };
    if whole.is_empty() && frac.is_empty() {
        return Err(invalid());
    }
    if !whole.chars().all(|c| c.is_ascii_digit())
        || !frac.chars().all(|c| c.is_ascii_digit())
        || frac.len() > 2
    {
        return Err(invalid());
    }

    let whole: u64 = if whole.is_empty() {
        0
    } else {
        whole.parse().map_err(|_| invalid())?
    };
    let frac: u64 = match frac.len() {
        0 => 0,
        1 => frac.parse::<u64>().map_err(|_| invalid())? * 10,
        _ => frac.parse().map_err(|_| invalid())?,
    };

    whole
        .checked_mul(100)
        .and_then(|c| c.checked_add(frac))
        .ok_or_else(invalid)
}

/// Parse an integer minor-unit amount, taking its absolute value
fn parse_cents(s: &str) -> Result<u64> {
    let value: i64 = s
        .trim()
        .parse()
        .map_err(|_| Error::InvalidData(format!("Invalid amount_cents: {:?}", s)))?;
    Ok(value.unsigned_abs())
}
