//! Run configuration: the input work item and its validation.
//!
//! Inputs are merged from the command line (which also covers environment
//! variables) and an optional work item file. `url` and `search_text` are
//! required; `category` and `number_of_months` fall back to defaults with a
//! warning.

use crate::cli::Cli;
use crate::error::ConfigError;
use serde::Deserialize;
use serde_yaml::Value;
use tokio::fs;
use tracing::{info, instrument, warn};
use url::Url;

pub const DEFAULT_CATEGORY: &str = "relevance";
pub const DEFAULT_NUMBER_OF_MONTHS: u32 = 0;

/// Key/value inputs of one run, as found in a work item file.
///
/// The file may be JSON or YAML. `number_of_months` is accepted as a number
/// or a numeric string.
#[derive(Debug, Default, Clone, Deserialize, PartialEq)]
pub struct WorkItem {
    pub url: Option<String>,
    pub search_text: Option<String>,
    pub category: Option<String>,
    pub number_of_months: Option<Value>,
}

impl WorkItem {
    /// Parse a work item from JSON or YAML text.
    pub fn parse(text: &str, origin: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(text).map_err(|e| ConfigError::WorkItem {
            path: origin.to_string(),
            reason: e.to_string(),
        })
    }

    /// Read and parse a work item file.
    #[instrument(level = "info")]
    pub async fn load(path: &str) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)
            .await
            .map_err(|e| ConfigError::WorkItem {
                path: path.to_string(),
                reason: e.to_string(),
            })?;
        let item = Self::parse(&text, path)?;
        info!(path, "Loaded input work item");
        Ok(item)
    }

    /// The values given on the command line.
    pub fn from_cli(cli: &Cli) -> Self {
        Self {
            url: cli.url.clone(),
            search_text: cli.search_text.clone(),
            category: cli.category.clone(),
            number_of_months: cli.number_of_months.clone().map(Value::String),
        }
    }

    /// Fill every field missing from `self` with the one from `fallback`.
    pub fn or(self, fallback: WorkItem) -> Self {
        Self {
            url: self.url.or(fallback.url),
            search_text: self.search_text.or(fallback.search_text),
            category: self.category.or(fallback.category),
            number_of_months: self.number_of_months.or(fallback.number_of_months),
        }
    }
}

/// Validated inputs of a run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    pub url: Url,
    pub search_text: String,
    /// Lower-cased sort option value.
    pub category: String,
    pub number_of_months: u32,
}

impl RunConfig {
    /// Validate a work item.
    ///
    /// # Errors
    ///
    /// A missing or blank `url` or `search_text`, or a `url` that does not
    /// parse, is fatal.
    pub fn from_work_item(item: WorkItem) -> Result<Self, ConfigError> {
        let url = required(item.url, "url")?;
        let url = Url::parse(&url).map_err(|e| ConfigError::InvalidUrl {
            url: url.clone(),
            reason: e.to_string(),
        })?;
        let search_text = required(item.search_text, "search_text")?;

        let category = match item.category.map(|c| c.trim().to_lowercase()) {
            Some(c) if !c.is_empty() => c,
            _ => {
                warn!(default = DEFAULT_CATEGORY, "No category given; using default");
                DEFAULT_CATEGORY.to_string()
            }
        };

        let number_of_months = match item.number_of_months.as_ref().map(parse_months) {
            Some(Some(months)) => months,
            Some(None) => {
                warn!(
                    value = ?item.number_of_months,
                    default = DEFAULT_NUMBER_OF_MONTHS,
                    "Invalid number_of_months; using default"
                );
                DEFAULT_NUMBER_OF_MONTHS
            }
            None => {
                warn!(
                    default = DEFAULT_NUMBER_OF_MONTHS,
                    "No number_of_months given; using default"
                );
                DEFAULT_NUMBER_OF_MONTHS
            }
        };

        Ok(Self {
            url,
            search_text,
            category,
            number_of_months,
        })
    }
}

fn required(value: Option<String>, name: &'static str) -> Result<String, ConfigError> {
    match value.map(|v| v.trim().to_string()) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(ConfigError::Missing(name)),
    }
}

fn parse_months(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(json: &str) -> WorkItem {
        WorkItem::parse(json, "test").unwrap()
    }

    #[test]
    fn test_full_work_item() {
        let config = RunConfig::from_work_item(item(
            r#"{"url": "https://www.aljazeera.com", "search_text": "oil",
                "category": "Date", "number_of_months": 3}"#,
        ))
        .unwrap();

        assert_eq!(config.url.as_str(), "https://www.aljazeera.com/");
        assert_eq!(config.search_text, "oil");
        assert_eq!(config.category, "date");
        assert_eq!(config.number_of_months, 3);
    }

    #[test]
    fn test_yaml_and_string_months() {
        let config = RunConfig::from_work_item(item(
            "url: https://example.com\nsearch_text: gaza\nnumber_of_months: \"2\"\n",
        ))
        .unwrap();
        assert_eq!(config.number_of_months, 2);
        assert_eq!(config.category, DEFAULT_CATEGORY);
    }

    #[test]
    fn test_invalid_months_defaults_to_zero() {
        for months in [r#""two""#, "-1", "1.5", "null"] {
            let json = format!(
                r#"{{"url": "https://example.com", "search_text": "x", "number_of_months": {months}}}"#
            );
            let config = RunConfig::from_work_item(item(&json)).unwrap();
            assert_eq!(config.number_of_months, 0, "months = {months}");
        }
    }

    #[test]
    fn test_missing_required_fields() {
        assert_eq!(
            RunConfig::from_work_item(item(r#"{"search_text": "x"}"#)),
            Err(ConfigError::Missing("url"))
        );
        assert_eq!(
            RunConfig::from_work_item(item(r#"{"url": "https://example.com", "search_text": "  "}"#)),
            Err(ConfigError::Missing("search_text"))
        );
    }

    #[test]
    fn test_invalid_url() {
        let err = RunConfig::from_work_item(item(r#"{"url": "not a url", "search_text": "x"}"#))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidUrl { .. }));
    }

    #[test]
    fn test_cli_values_take_precedence() {
        let cli = WorkItem {
            search_text: Some("from cli".to_string()),
            number_of_months: Some(Value::String("4".to_string())),
            ..Default::default()
        };
        let file = item(r#"{"url": "https://example.com", "search_text": "from file", "number_of_months": 1}"#);

        let config = RunConfig::from_work_item(cli.or(file)).unwrap();
        assert_eq!(config.url.as_str(), "https://example.com/");
        assert_eq!(config.search_text, "from cli");
        assert_eq!(config.number_of_months, 4);
    }

    #[test]
    fn test_unreadable_work_item() {
        let err = WorkItem::parse("[1, 2", "broken.json").unwrap_err();
        assert!(matches!(err, ConfigError::WorkItem { ref path, .. } if path == "broken.json"));
    }
}
