//! Custom Askama template filters.

#![allow(clippy::unnecessary_wraps)]

use std::fmt::Display;

use chrono::{DateTime, NaiveDate};
use pasarku_core::Rupiah;

/// Formats a whole-rupiah amount as `Rp65.000`.
///
/// Values that are not integers (e.g. an already formatted [`Rupiah`]) are
/// passed through unchanged.
///
/// Usage in templates: `{{ stats.total_products|rupiah }}`
#[askama::filter_fn]
pub fn rupiah(value: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    Ok(format_rupiah(&value.to_string()))
}

fn format_rupiah(raw: &str) -> String {
    raw.trim()
        .parse::<i64>()
        .map_or_else(|_| raw.to_string(), |amount| Rupiah::new(amount).to_string())
}

/// Returns the current year.
///
/// Usage in templates: `{{ ""|current_year }}`
#[askama::filter_fn]
pub fn current_year(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<i32> {
    use chrono::Datelike;
    Ok(chrono::Utc::now().year())
}

/// Formats a backend timestamp as `dd/mm/yyyy`.
///
/// Accepts RFC 3339 timestamps and plain `yyyy-mm-dd` dates; anything else is
/// shown as received.
///
/// Usage in templates: `{{ order.created_at|date_id }}`
#[askama::filter_fn]
pub fn date_id(value: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    Ok(format_date_id(&value.to_string()))
}

fn format_date_id(raw: &str) -> String {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return ts.format("%d/%m/%Y").to_string();
    }
    raw.get(..10)
        .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
        .map_or_else(|| raw.to_string(), |d| d.format("%d/%m/%Y").to_string())
}

/// Returns the content hash for main.css, computed at build time.
///
/// Usage in templates: `{{ ""|css_hash }}`
#[askama::filter_fn]
pub fn css_hash(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<&'static str> {
    Ok(env!("CSS_HASH"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rupiah_grouping() {
        assert_eq!(format_rupiah("65000"), "Rp65.000");
        assert_eq!(format_rupiah("1250000"), "Rp1.250.000");
        assert_eq!(format_rupiah("0"), "Rp0");
        assert_eq!(format_rupiah("Rp5.000"), "Rp5.000");
    }

    #[test]
    fn test_date_formats() {
        assert_eq!(format_date_id("2025-06-11T08:30:00Z"), "11/06/2025");
        assert_eq!(format_date_id("2025-06-11T08:30:00.123+07:00"), "11/06/2025");
        assert_eq!(format_date_id("2025-01-02"), "02/01/2025");
        assert_eq!(format_date_id("kemarin"), "kemarin");
        assert_eq!(format_date_id(""), "");
    }
}
