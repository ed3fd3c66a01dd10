//! Date expressions found in search-result descriptions.
//!
//! The site prints either a relative age (`"45 minutes ago"`, `"2 days ago"`)
//! or an absolute date (`"Mar 5, 2024"`). Both are resolved to a calendar date;
//! anything that cannot be resolved yields `None` rather than an error.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;

/// Relative age grammar shared with the description splitter.
pub(crate) const RELATIVE_DATE_PATTERN: &str = r"[0-9]+\s+(?:minutes?|hours?|days?)\s+ago";

static RELATIVE_PREFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([0-9]+)\s+(minutes?|hours?|days?)\s+ago").expect("relative date regex")
});

static MONTH_FIRST: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([a-z]{3,9})\.?\s+([0-9]{1,2})(?:st|nd|rd|th)?,?\s+([0-9]{4})$")
        .expect("month-first date regex")
});

static DAY_FIRST: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([0-9]{1,2})(?:st|nd|rd|th)?\s+([a-z]{3,9})\.?,?\s+([0-9]{4})$")
        .expect("day-first date regex")
});

const MONTH_NAMES: [&str; 12] = [
    "january",
    "february",
    "march",
    "april",
    "may",
    "june",
    "july",
    "august",
    "september",
    "october",
    "november",
    "december",
];

const NUMERIC_FORMATS: [&str; 5] = ["%Y-%m-%d", "%d-%m-%Y", "%m/%d/%Y", "%Y/%m/%d", "%d.%m.%Y"];

/// Granularity of a relative date expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeUnit {
    Minute,
    Hour,
    Day,
}

impl TimeUnit {
    fn from_word(word: &str) -> Option<Self> {
        match word {
            "minute" | "minutes" => Some(Self::Minute),
            "hour" | "hours" => Some(Self::Hour),
            "day" | "days" => Some(Self::Day),
            _ => None,
        }
    }

    /// `amount` units as a signed duration, or `None` on overflow.
    fn span(self, amount: u64) -> Option<Duration> {
        let amount = i64::try_from(amount).ok()?;
        match self {
            Self::Minute => Duration::try_minutes(amount),
            Self::Hour => Duration::try_hours(amount),
            Self::Day => Duration::try_days(amount),
        }
    }
}

/// A date fragment after classification, before it is resolved against "now".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateToken {
    Relative { amount: u64, unit: TimeUnit },
    Absolute { text: String },
}

impl DateToken {
    /// Classify a raw token. Relative expressions must start the token.
    ///
    /// Returns `None` when the token is relative but its amount does not fit
    /// in 64 bits.
    pub fn parse(raw: &str) -> Option<Self> {
        let lowered = raw.trim().to_lowercase();
        match RELATIVE_PREFIX.captures(&lowered) {
            Some(caps) => {
                let amount = caps[1].parse::<u64>().ok()?;
                let unit = TimeUnit::from_word(&caps[2])?;
                Some(Self::Relative { amount, unit })
            }
            None => Some(Self::Absolute { text: lowered }),
        }
    }

    /// Resolve the token to a calendar date relative to `now`.
    pub fn resolve(&self, now: NaiveDateTime) -> Option<NaiveDate> {
        match self {
            Self::Relative { amount, unit } => {
                let span = unit.span(*amount)?;
                now.checked_sub_signed(span).map(|at| at.date())
            }
            Self::Absolute { text } => parse_absolute(text),
        }
    }
}

/// Parse a raw date expression into a calendar date.
///
/// `None` covers every failure: unknown format, impossible calendar date, or a
/// relative offset that overflows.
pub fn parse_date_expression(raw: &str, now: NaiveDateTime) -> Option<NaiveDate> {
    DateToken::parse(raw)?.resolve(now)
}

/// Render a date the way the export sheet expects it (`DD-MM-YYYY`).
pub fn format_export_date(date: NaiveDate) -> String {
    date.format("%d-%m-%Y").to_string()
}

fn month_from_name(word: &str) -> Option<u32> {
    if word == "sept" {
        return Some(9);
    }
    if word.len() < 3 {
        return None;
    }
    MONTH_NAMES
        .iter()
        .position(|name| name.starts_with(word))
        .map(|idx| idx as u32 + 1)
}

fn parse_absolute(text: &str) -> Option<NaiveDate> {
    let text = text.trim().trim_end_matches('.');
    if text.is_empty() {
        return None;
    }

    if let Some(caps) = MONTH_FIRST.captures(text) {
        let month = month_from_name(&caps[1])?;
        let day = caps[2].parse().ok()?;
        let year = caps[3].parse().ok()?;
        return NaiveDate::from_ymd_opt(year, month, day);
    }

    if let Some(caps) = DAY_FIRST.captures(text) {
        let day = caps[1].parse().ok()?;
        let month = month_from_name(&caps[2])?;
        let year = caps[3].parse().ok()?;
        return NaiveDate::from_ymd_opt(year, month, day);
    }

    NUMERIC_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 10)
            .unwrap()
            .and_hms_opt(14, 30, 0)
            .unwrap()
    }

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_relative_hours_same_day() {
        assert_eq!(parse_date_expression("3 hours ago", now()), Some(ymd(2024, 3, 10)));
    }

    #[test]
    fn test_relative_crosses_midnight() {
        assert_eq!(parse_date_expression("15 hours ago", now()), Some(ymd(2024, 3, 9)));
        assert_eq!(parse_date_expression("2 days ago", now()), Some(ymd(2024, 3, 8)));
        assert_eq!(parse_date_expression("1 day ago", now()), Some(ymd(2024, 3, 9)));
    }

    #[test]
    fn test_relative_is_case_insensitive() {
        assert_eq!(parse_date_expression("45 MINUTES Ago", now()), Some(ymd(2024, 3, 10)));
    }

    #[test]
    fn test_zero_amount_is_now() {
        assert_eq!(parse_date_expression("0 minutes ago", now()), Some(now().date()));
    }

    #[test]
    fn test_relative_overflow_fails() {
        assert_eq!(parse_date_expression("99999999999999999999999 days ago", now()), None);
        assert_eq!(parse_date_expression("9223372036854775807 days ago", now()), None);
    }

    #[test]
    fn test_absolute_month_first() {
        assert_eq!(parse_date_expression("March 5, 2024", now()), Some(ymd(2024, 3, 5)));
        assert_eq!(parse_date_expression("Mar 5, 2024", now()), Some(ymd(2024, 3, 5)));
        assert_eq!(parse_date_expression("Sept 30, 2023", now()), Some(ymd(2023, 9, 30)));
        assert_eq!(parse_date_expression("december 1 2022", now()), Some(ymd(2022, 12, 1)));
    }

    #[test]
    fn test_absolute_other_layouts() {
        assert_eq!(parse_date_expression("5 March 2024", now()), Some(ymd(2024, 3, 5)));
        assert_eq!(parse_date_expression("2024-03-05", now()), Some(ymd(2024, 3, 5)));
        assert_eq!(parse_date_expression("05-03-2024", now()), Some(ymd(2024, 3, 5)));
        assert_eq!(parse_date_expression("03/05/2024", now()), Some(ymd(2024, 3, 5)));
    }

    #[test]
    fn test_malformed_absolute_fails_cleanly() {
        assert_eq!(parse_date_expression("February 30, 2024", now()), None);
        assert_eq!(parse_date_expression("Smarch 5, 2024", now()), None);
        assert_eq!(parse_date_expression("yesterday", now()), None);
        assert_eq!(parse_date_expression("", now()), None);
    }

    #[test]
    fn test_token_classification() {
        assert_eq!(
            DateToken::parse("12 Hours ago"),
            Some(DateToken::Relative { amount: 12, unit: TimeUnit::Hour })
        );
        assert_eq!(
            DateToken::parse("Mar 5, 2024"),
            Some(DateToken::Absolute { text: "mar 5, 2024".to_string() })
        );
    }

    #[test]
    fn test_only_ascii_digits_are_amounts() {
        assert_eq!(
            DateToken::parse("\u{663} hours ago"),
            Some(DateToken::Absolute { text: "\u{663} hours ago".to_string() })
        );
        assert_eq!(parse_date_expression("\u{663} hours ago", now()), None);
        assert_eq!(parse_date_expression("Mar \u{665}, 2024", now()), None);
    }

    #[test]
    fn test_format_export_date() {
        assert_eq!(format_export_date(ymd(2024, 3, 5)), "05-03-2024");
    }

    proptest! {
        #[test]
        fn relative_tokens_subtract_from_now(n in 0u64..5000, unit in 0usize..3) {
            let (word, span) = match unit {
                0 => ("minutes", Duration::minutes(n as i64)),
                1 => ("hours", Duration::hours(n as i64)),
                _ => ("days", Duration::days(n as i64)),
            };
            let token = format!("{n} {word} ago");
            prop_assert_eq!(parse_date_expression(&token, now()), Some((now() - span).date()));
        }
    }
}
