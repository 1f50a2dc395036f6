//! Field validation for usage records and query arguments.
//!
//! Record fields go through one policy regardless of whether a record is
//! built from discrete values, parsed from a delimited line, or rebuilt from
//! a shard element:
//!
//! - text fields (stb, title, provider): 1-64 characters
//! - date: `YYYY-MM-DD`, ASCII digits, a real calendar date
//! - view time: `H:MM` or `HH:MM`, hour 0-23, minute 00-59
//! - revenue: finite, non-negative decimal
//!
//! Query field names resolve through exact match, then synonym lookup, then
//! an error carrying the closest suggestion.

use std::collections::HashMap;
use std::sync::LazyLock;

use chrono::{NaiveDate, NaiveTime};
use thiserror::Error;

/// Maximum length (in characters) of the stb, title and provider fields.
pub const MAX_FIELD_LEN: usize = 64;

/// Number of `|`-separated fields in an input line.
pub const LINE_FIELD_COUNT: usize = 6;

/// A malformed record line or shard element.
///
/// Recoverable: bulk imports log the offending unit and move on.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FormatError {
    #[error("expected {expected} fields, found {found}")]
    FieldCount { expected: usize, found: usize },

    #[error("{field} must not be empty")]
    EmptyField { field: &'static str },

    #[error("{field} is {len} characters long (max {max})")]
    FieldTooLong {
        field: &'static str,
        len: usize,
        max: usize,
    },

    #[error("'{0}' is not a valid YYYY-MM-DD date")]
    InvalidDate(String),

    #[error("'{0}' is not a valid H:MM view time")]
    InvalidViewTime(String),

    #[error("'{0}' is not a valid revenue amount")]
    InvalidRevenue(String),

    #[error("invalid shard element: {0}")]
    InvalidElement(String),
}

// ── Record fields ────────────────────────────────────────────

/// Check a text field against the 1-64 character policy.
pub fn validate_text(field: &'static str, value: &str) -> Result<(), FormatError> {
    let len = value.chars().count();
    if len == 0 {
        return Err(FormatError::EmptyField { field });
    }
    if len > MAX_FIELD_LEN {
        return Err(FormatError::FieldTooLong {
            field,
            len,
            max: MAX_FIELD_LEN,
        });
    }
    Ok(())
}

/// Parse a strict `YYYY-MM-DD` calendar date.
///
/// chrono alone accepts short years (`224-04-01`), so the shape is checked
/// before handing the text over.
pub fn parse_date(input: &str) -> Result<NaiveDate, FormatError> {
    let bytes = input.as_bytes();
    let shaped = bytes.len() == 10
        && bytes[4] == b'-'
        && bytes[7] == b'-'
        && bytes
            .iter()
            .enumerate()
            .all(|(i, b)| i == 4 || i == 7 || b.is_ascii_digit());

    if !shaped {
        return Err(FormatError::InvalidDate(input.to_string()));
    }

    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .map_err(|_| FormatError::InvalidDate(input.to_string()))
}

/// Parse an `H:MM` view time. Hours above 23 are rejected.
pub fn parse_view_time(input: &str) -> Result<NaiveTime, FormatError> {
    let invalid = || FormatError::InvalidViewTime(input.to_string());

    let (hour, minute) = input.split_once(':').ok_or_else(invalid)?;
    let hour_ok = (1..=2).contains(&hour.len()) && hour.bytes().all(|b| b.is_ascii_digit());
    let minute_ok = minute.len() == 2 && minute.bytes().all(|b| b.is_ascii_digit());
    if !hour_ok || !minute_ok {
        return Err(invalid());
    }

    let hour: u32 = hour.parse().map_err(|_| invalid())?;
    let minute: u32 = minute.parse().map_err(|_| invalid())?;
    NaiveTime::from_hms_opt(hour, minute, 0).ok_or_else(invalid)
}

/// Parse a revenue amount from text.
pub fn parse_revenue(input: &str) -> Result<f64, FormatError> {
    let value: f64 = input
        .trim()
        .parse()
        .map_err(|_| FormatError::InvalidRevenue(input.to_string()))?;
    validate_revenue(value).map_err(|_| FormatError::InvalidRevenue(input.to_string()))
}

/// Check a numeric revenue amount.
pub fn validate_revenue(value: f64) -> Result<f64, FormatError> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(FormatError::InvalidRevenue(value.to_string()))
    }
}

// ── Query fields ─────────────────────────────────────────────

/// Shard element keys, in serialized order.
pub const FIELD_NAMES: [&str; 7] = ["KEY", "STB", "TITLE", "PROVIDER", "DATE", "REV", "VIEW_TIME"];

pub static FIELD_SYNONYMS: LazyLock<HashMap<&str, &str>> = LazyLock::new(|| {
    [
        ("BOX", "STB"),
        ("SETTOPBOX", "STB"),
        ("ASSET", "TITLE"),
        ("DISTRIBUTOR", "PROVIDER"),
        ("REVENUE", "REV"),
        ("PRICE", "REV"),
        ("VIEWTIME", "VIEW_TIME"),
        ("TIME", "VIEW_TIME"),
        ("DAY", "DATE"),
    ]
    .into_iter()
    .collect()
});

/// Normalize a query field name via exact match or synonym lookup.
///
/// Returns the canonical key, or an error with the original input and an
/// optional suggestion.
pub fn normalize_field(input: &str) -> Result<&'static str, (String, Option<String>)> {
    let upper = input.trim().to_uppercase();

    if let Some(&name) = FIELD_NAMES.iter().find(|&&n| n == upper) {
        return Ok(name);
    }

    if let Some(&canonical) = FIELD_SYNONYMS.get(upper.as_str()) {
        return Ok(canonical);
    }

    let suggestion = find_closest_match(&upper);
    Err((input.to_string(), suggestion))
}

/// Find the closest matching field across valid names and synonyms.
fn find_closest_match(input: &str) -> Option<String> {
    let mut best: Option<(&str, usize)> = None;

    for &name in FIELD_NAMES.iter().chain(FIELD_SYNONYMS.keys()) {
        let dist = levenshtein_distance(input, name);
        if dist <= 3 && best.is_none_or(|(_, d)| dist < d) {
            let canonical = FIELD_SYNONYMS.get(name).copied().unwrap_or(name);
            best = Some((canonical, dist));
        }
    }

    best.map(|(v, _)| v.to_string())
}

/// Compute the Levenshtein edit distance between two strings.
pub fn levenshtein_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    // Single-row optimization
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for i in 1..=a.len() {
        curr[0] = i;
        for j in 1..=b.len() {
            let cost = usize::from(a[i - 1] != b[j - 1]);
            curr[j] = (prev[j] + 1) // deletion
                .min(curr[j - 1] + 1) // insertion
                .min(prev[j - 1] + cost); // substitution
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}
