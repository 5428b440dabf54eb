//! Shared helpers for normalizing upstream weather values.
//!
//! - `percent_or_zero`: daily precipitation probabilities, absent → 0, clamped to 0–100
//! - `clamped_percent`: the same without rounding, for classifier input
//! - `calendar_date`: timestamp strings truncated to their calendar date
//! - `date_label`: the chart label for a calendar date

use chrono::{DateTime, NaiveDate};

/// Clamp an optional upstream percentage into 0–100 without rounding.
///
/// Absent and NaN values become 0. The fractional part is kept so that a
/// threshold comparison sees the provider's value.
pub(crate) fn clamped_percent(v: Option<f64>) -> f64 {
    match v {
        Some(p) if p.is_nan() => {
            tracing::warn!("clamped_percent received NaN, defaulting to 0");
            0.0
        }
        Some(p) => p.clamp(0.0, 100.0),
        None => 0.0,
    }
}

/// Convert an optional upstream percentage into an integer percent.
///
/// Absent and non-finite values become 0; anything outside 0–100 is clamped.
pub(crate) fn percent_or_zero(v: Option<f64>) -> u8 {
    match v {
        Some(p) if p.is_finite() => p.round().clamp(0.0, 100.0) as u8,
        Some(p) => {
            tracing::warn!("percent_or_zero received non-finite value {}, defaulting to 0", p);
            0
        }
        None => 0,
    }
}

/// Truncate an upstream timestamp to its calendar date.
///
/// Accepts RFC 3339 timestamps (the local date of the timestamp is kept, no
/// timezone conversion) and bare `YYYY-MM-DD` dates.
pub(crate) fn calendar_date(raw: &str) -> Option<NaiveDate> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.date_naive())
        .ok()
        .or_else(|| NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok())
}

/// Render a calendar date as a chart label.
pub(crate) fn date_label(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}
