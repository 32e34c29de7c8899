//! Display formatting for currency, free text and dates.

use crate::error::FormatError;
use chrono::{DateTime, NaiveDate, NaiveDateTime};

const NOT_AVAILABLE: &str = "N/A";

/// Format an amount with a B/M/K suffix, or with thousands separators
/// and cents below 1,000. Zero renders as `$0`.
pub fn format_currency(amount: f64) -> String {
    if amount == 0.0 || !amount.is_finite() {
        return "$0".to_string();
    }

    if amount >= 1_000_000_000.0 {
        format!("${:.1}B", amount / 1_000_000_000.0)
    } else if amount >= 1_000_000.0 {
        format!("${:.1}M", amount / 1_000_000.0)
    } else if amount >= 1_000.0 {
        format!("${:.1}K", amount / 1_000.0)
    } else {
        format!("${}", format_with_separators(amount))
    }
}

/// Two decimals with `,` thousands separators, e.g. `1,234,567.89`.
pub fn format_with_separators(value: f64) -> String {
    let fixed = format!("{:.2}", value.abs());
    let (whole, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if value < 0.0 { "-" } else { "" };
    format!("{}{}.{}", sign, grouped, cents)
}

/// Shorten `text` to `max_len` characters followed by `...`.
///
/// Empty text and the `N/A` placeholder both render as `N/A`.
pub fn truncate(text: &str, max_len: usize) -> String {
    if text.is_empty() || text == NOT_AVAILABLE {
        return NOT_AVAILABLE.to_string();
    }

    if text.chars().count() <= max_len {
        text.to_string()
    } else {
        let head: String = text.chars().take(max_len).collect();
        format!("{}...", head)
    }
}

/// Render an ISO `YYYY-MM-DD` date as `MM/DD/YYYY`; absent renders as `N/A`.
///
/// A trailing `HH:MM:SS` or RFC 3339 time is accepted. Anything else is an error.
pub fn format_date(value: Option<&str>) -> Result<String, FormatError> {
    let Some(raw) = value else {
        return Ok(NOT_AVAILABLE.to_string());
    };

    parse_award_date(raw)
        .map(|date| date.format("%m/%d/%Y").to_string())
        .ok_or_else(|| FormatError::InvalidDate {
            value: raw.to_string(),
        })
}

fn parse_award_date(raw: &str) -> Option<NaiveDate> {
    // chrono accepts single-digit months and days, so pin the shape first.
    let well_shaped = raw.len() >= 10
        && raw.bytes().take(10).enumerate().all(|(i, b)| match i {
            4 | 7 => b == b'-',
            _ => b.is_ascii_digit(),
        });
    if !well_shaped {
        return None;
    }

    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(datetime) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Some(datetime.date());
    }
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|datetime| datetime.date_naive())
}

/// Percentage with one decimal, e.g. `0.4567` -> `45.7%`.
pub fn format_percentage(share: f64) -> String {
    format!("{:.1}%", share * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_currency_boundaries() {
        assert_eq!(format_currency(0.0), "$0");
        assert_eq!(format_currency(999.99), "$999.99");
        assert_eq!(format_currency(1000.0), "$1.0K");
        assert_eq!(format_currency(1_000_000.0), "$1.0M");
        assert_eq!(format_currency(1_000_000_000.0), "$1.0B");
    }

    #[test]
    fn test_currency_suffix_rounding() {
        assert_eq!(format_currency(1_240.0), "$1.2K");
        assert_eq!(format_currency(2_760_000.0), "$2.8M");
        assert_eq!(format_currency(12_345_678_901.0), "$12.3B");
        assert_eq!(format_currency(5.5), "$5.50");
    }

    #[test]
    fn test_thousands_separators() {
        assert_eq!(format_with_separators(0.0), "0.00");
        assert_eq!(format_with_separators(999.999), "1,000.00");
        assert_eq!(format_with_separators(1234567.891), "1,234,567.89");
        assert_eq!(format_with_separators(-4500.0), "-4,500.00");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("abcdefghij", 5), "abcde...");
        assert_eq!(truncate("abc", 5), "abc");
        assert_eq!(truncate("abcde", 5), "abcde");
        assert_eq!(truncate("", 5), "N/A");
        assert_eq!(truncate("N/A", 1), "N/A");
    }

    #[test]
    fn test_truncate_counts_characters() {
        assert_eq!(truncate("société générale", 7), "société...");
    }

    #[test]
    fn test_format_date() {
        assert_eq!(format_date(Some("2023-10-01")).unwrap(), "10/01/2023");
        assert_eq!(
            format_date(Some("2021-03-15 00:00:00")).unwrap(),
            "03/15/2021"
        );
        assert_eq!(
            format_date(Some("2021-03-15T08:30:00Z")).unwrap(),
            "03/15/2021"
        );
        assert_eq!(format_date(None).unwrap(), "N/A");
    }

    #[test]
    fn test_format_date_rejects_malformed_input() {
        let err = format_date(Some("15/03/2021")).unwrap_err();
        assert_eq!(
            err,
            FormatError::InvalidDate {
                value: "15/03/2021".to_string()
            }
        );
        assert!(format_date(Some("2021-02-30")).is_err());
        assert!(format_date(Some("2021-03-15garbage")).is_err());
        assert!(format_date(Some("2021-03-1")).is_err());
        assert!(format_date(Some("2021-3-15")).is_err());
        assert!(format_date(Some("2021-03-15 25:00:00")).is_err());
    }

    #[test]
    fn test_format_percentage() {
        assert_eq!(format_percentage(0.4567), "45.7%");
        assert_eq!(format_percentage(1.0), "100.0%");
    }
}
