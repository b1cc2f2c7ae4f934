//! Custom Askama template filters.

#![allow(clippy::unnecessary_wraps)]

use std::fmt::Display;

use chrono::{DateTime, NaiveDate};

/// Returns the current year.
///
/// Usage in templates: `{{ ""|current_year }}`
#[askama::filter_fn]
pub fn current_year(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<i32> {
    use chrono::Datelike;
    Ok(chrono::Utc::now().year())
}

/// First letter of a name, uppercased, for avatar badges.
///
/// Usage in templates: `{{ helper.name|initial }}`
#[askama::filter_fn]
pub fn initial(value: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    Ok(initial_of(&value.to_string()))
}

/// Render a backend date (`YYYY-MM-DD` or RFC 3339) as `02 Nov 2026`.
///
/// Unrecognized input is shown as given.
///
/// Usage in templates: `{{ booking.date|date_label }}`
#[askama::filter_fn]
pub fn date_label(value: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    Ok(format_date(&value.to_string()))
}

/// Percent-encode a value for use as one URL path segment.
///
/// Usage in templates: `{{ token|path_segment }}`
#[askama::filter_fn]
pub fn path_segment(value: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    Ok(urlencoding::encode(&value.to_string()).into_owned())
}

fn initial_of(name: &str) -> String {
    name.trim()
        .chars()
        .next()
        .map_or_else(|| "?".to_string(), |c| c.to_uppercase().collect())
}

fn format_date(raw: &str) -> String {
    let raw = raw.trim();
    if let Ok(at) = DateTime::parse_from_rfc3339(raw) {
        return at.format("%d %b %Y").to_string();
    }
    if let Ok(day) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return day.format("%d %b %Y").to_string();
    }
    raw.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_of() {
        assert_eq!(initial_of("  ravi kumar"), "R");
        assert_eq!(initial_of(""), "?");
    }

    #[test]
    fn test_format_date() {
        assert_eq!(format_date("2026-11-02"), "02 Nov 2026");
        assert_eq!(format_date("2026-11-02T09:30:00.000Z"), "02 Nov 2026");
        assert_eq!(format_date("next tuesday"), "next tuesday");
    }
}
