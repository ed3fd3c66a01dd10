//! Keyword and money signals computed over article text.

use once_cell::sync::Lazy;
use regex::Regex;

static MONEY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\$\d{1,3}(?:,\d{3})*(?:\.\d{2})?|\d+\s?(?:dollars|usd)").expect("money regex")
});

/// Case-insensitive count of non-overlapping occurrences of `phrase` in `text`.
///
/// An empty phrase never matches.
pub fn count_occurrences(text: &str, phrase: &str) -> usize {
    if phrase.is_empty() {
        return 0;
    }
    text.to_lowercase().matches(&phrase.to_lowercase()).count()
}

/// Whether `text` mentions a monetary amount such as `$1,200.50` or `50 usd`.
pub fn contains_money(text: &str) -> bool {
    MONEY.is_match(&text.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_is_case_insensitive() {
        assert_eq!(count_occurrences("Investment in INVESTMENT funds", "investment"), 2);
        assert_eq!(count_occurrences("nothing here", "investment"), 0);
    }

    #[test]
    fn test_count_does_not_overlap() {
        assert_eq!(count_occurrences("aaa", "aa"), 1);
        assert_eq!(count_occurrences("aaaa", "aa"), 2);
    }

    #[test]
    fn test_count_empty_inputs() {
        assert_eq!(count_occurrences("", "oil"), 0);
        assert_eq!(count_occurrences("oil", ""), 0);
    }

    #[test]
    fn test_money_dollar_sign() {
        assert!(contains_money("Price: $1,200.50"));
        assert!(contains_money("a $5 fee"));
        assert!(contains_money("costs $999.99 now"));
    }

    #[test]
    fn test_money_words() {
        assert!(contains_money("50 usd"));
        assert!(contains_money("paid 20 Dollars"));
        assert!(contains_money("a 300USD deal"));
    }

    #[test]
    fn test_no_money() {
        assert!(!contains_money("no amount here"));
        assert!(!contains_money("$ alone"));
        assert!(!contains_money("the dollar weakened"));
    }
}
