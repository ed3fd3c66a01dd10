//! Splitting the date fragment out of a search result's description.
//!
//! Result cards print the age of the article and the teaser in a single text
//! node, e.g. `"3 hours ago ... Prices surged amid ..."`. The splitter returns
//! the date fragment and the teaser with every date fragment removed.

use crate::extract::date::RELATIVE_DATE_PATTERN;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

const ABSOLUTE_DATE_PATTERN: &str = r"[A-Za-z]{3,9}\s+[0-9]{1,2},\s+[0-9]{4}";

/// Relative first, absolute second; the leftmost match in the text wins.
static DATE_FRAGMENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        "(?i:{RELATIVE_DATE_PATTERN})|(?:{ABSOLUTE_DATE_PATTERN})"
    ))
    .expect("date fragment regex")
});

static LEADING_NON_LETTERS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^a-zA-Z]+").expect("leading non-letter regex"));

/// Separate the date fragment from the descriptive text.
///
/// # Returns
///
/// `(Some(token), cleaned)` when a date fragment was found and some prose is
/// left over. Otherwise `(None, original)`, with the input returned untouched.
///
/// # Examples
///
/// ```ignore
/// let (token, text) = split_description("3 hours ago ... Oil rose.");
/// assert_eq!(token.as_deref(), Some("3 hours ago"));
/// assert_eq!(text, "Oil rose.");
/// ```
pub fn split_description(combined: &str) -> (Option<String>, String) {
    if combined.trim().is_empty() {
        debug!("Empty description; no date to extract");
        return (None, combined.to_string());
    }

    let Some(found) = DATE_FRAGMENT.find(combined) else {
        debug!("No date fragment found in description");
        return (None, combined.to_string());
    };

    let stripped = strip_date_fragments(combined);
    let cleaned = LEADING_NON_LETTERS.replace(stripped.trim(), "");
    if cleaned.is_empty() {
        debug!(token = %found.as_str(), "Description empty after removing the date");
        return (None, combined.to_string());
    }

    (Some(found.as_str().to_string()), cleaned.into_owned())
}

/// Remove date fragments until none is left. Cutting one out can join its
/// neighbours into a new one, e.g. `"3 Jan 5, 2024 hours ago"`.
fn strip_date_fragments(text: &str) -> String {
    let mut stripped = DATE_FRAGMENT.replace_all(text, "").into_owned();
    while DATE_FRAGMENT.is_match(&stripped) {
        stripped = DATE_FRAGMENT.replace_all(&stripped, "").into_owned();
    }
    stripped
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_relative_prefix() {
        let (token, text) =
            split_description("3 hours ago Oil prices rose due to investment surge.");
        assert_eq!(token.as_deref(), Some("3 hours ago"));
        assert_eq!(text, "Oil prices rose due to investment surge.");
    }

    #[test]
    fn test_ellipsis_is_stripped() {
        let (token, text) = split_description("45 minutes ago ... Prices surged amid talks");
        assert_eq!(token.as_deref(), Some("45 minutes ago"));
        assert_eq!(text, "Prices surged amid talks");
    }

    #[test]
    fn test_absolute_date() {
        let (token, text) = split_description("Mar 5, 2024 - Leaders met in Doha.");
        assert_eq!(token.as_deref(), Some("Mar 5, 2024"));
        assert_eq!(text, "Leaders met in Doha.");
    }

    #[test]
    fn test_relative_is_case_insensitive() {
        let (token, _) = split_description("2 Days Ago ... Markets fell");
        assert_eq!(token.as_deref(), Some("2 Days Ago"));
    }

    #[test]
    fn test_leftmost_match_wins_and_all_are_removed() {
        let (token, text) =
            split_description("Published Jan 2, 2024 and updated 5 hours ago today");
        assert_eq!(token.as_deref(), Some("Jan 2, 2024"));
        assert_eq!(text, "Published  and updated  today");
    }

    #[test]
    fn test_fragments_joined_by_removal_are_stripped() {
        let (token, text) = split_description("x 3 Jan 5, 2024 hours ago Oil rose");
        assert_eq!(token.as_deref(), Some("Jan 5, 2024"));
        assert_eq!(text, "x  Oil rose");
        assert_eq!(split_description(&text), (None, text.clone()));
    }

    #[test]
    fn test_non_ascii_digits_are_not_a_date() {
        let input = "\u{663} hours ago Oil rose";
        assert_eq!(split_description(input), (None, input.to_string()));
    }

    #[test]
    fn test_no_date_returns_original() {
        let input = "  No date in this teaser  ";
        assert_eq!(split_description(input), (None, input.to_string()));
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(split_description(""), (None, String::new()));
    }

    #[test]
    fn test_date_only_is_a_failure() {
        let input = "3 hours ago ...";
        assert_eq!(split_description(input), (None, input.to_string()));
    }

    fn date_fragment() -> impl Strategy<Value = String> {
        prop_oneof![
            (
                0u32..1000,
                prop::sample::select(vec!["minute", "minutes", "hour", "hours", "day", "days"]),
            )
                .prop_map(|(n, unit)| format!("{n} {unit} ago")),
            (
                prop::sample::select(vec!["Jan", "Mar", "Sept", "December"]),
                1u32..32,
                1990u32..2100,
            )
                .prop_map(|(month, day, year)| format!("{month} {day}, {year}")),
        ]
    }

    proptest! {
        #[test]
        fn splitting_is_idempotent(
            date in date_fragment(),
            head in "[A-Za-z0-9 ,.]{0,20}",
            tail in "[A-Za-z0-9 ,.]{0,40}",
            prose in "[A-Za-z][A-Za-z ,.]{0,40}",
        ) {
            let combined = format!("{head}{date}{tail} {prose}");
            let (token, cleaned) = split_description(&combined);
            if token.is_some() {
                prop_assert!(!DATE_FRAGMENT.is_match(&cleaned));
            }
            prop_assert_eq!(split_description(&cleaned), (None, cleaned.clone()));
        }
    }
}
