//! The output work item.
//!
//! A small JSON record written next to the spreadsheet so whatever scheduled
//! the run can pick up its result without opening the workbook.

use crate::config::RunConfig;
use crate::error::ExportError;
use crate::pipeline::RunStats;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{info, instrument};

/// Summary of a finished run.
#[derive(Debug, Serialize)]
pub struct OutputWorkItem<'a> {
    pub url: &'a str,
    pub search_text: &'a str,
    pub category: &'a str,
    pub number_of_months: u32,
    /// Path of the spreadsheet written by this run.
    pub export_file: String,
    pub articles: usize,
    pub stats: RunStats,
}

impl<'a> OutputWorkItem<'a> {
    pub fn new(config: &'a RunConfig, export_file: &Path, stats: RunStats) -> Self {
        Self {
            url: config.url.as_str(),
            search_text: &config.search_text,
            category: &config.category,
            number_of_months: config.number_of_months,
            export_file: export_file.display().to_string(),
            articles: stats.exported,
            stats,
        }
    }
}

/// Path of the output work item for a run started at `timestamp`.
pub fn output_path(output_dir: &str, timestamp: &str) -> PathBuf {
    Path::new(output_dir).join(format!("news_data_{timestamp}.json"))
}

/// Serialize `item` as pretty JSON to `path`.
#[instrument(level = "info", skip(item), fields(path = %path.display()))]
pub async fn write_output(item: &OutputWorkItem<'_>, path: &Path) -> Result<(), ExportError> {
    let json = serde_json::to_string_pretty(item)?;
    fs::write(path, json).await?;
    info!("Wrote output work item");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    fn config() -> RunConfig {
        RunConfig {
            url: Url::parse("https://www.aljazeera.com").unwrap(),
            search_text: "oil".to_string(),
            category: "date".to_string(),
            number_of_months: 2,
        }
    }

    #[test]
    fn test_output_work_item_serialization() {
        let config = config();
        let stats = RunStats {
            seen: 5,
            exported: 3,
            ..Default::default()
        };
        let item = OutputWorkItem::new(&config, Path::new("output/news_data_x.xlsx"), stats);

        let value: serde_json::Value = serde_json::to_value(&item).unwrap();
        assert_eq!(value["search_text"], "oil");
        assert_eq!(value["articles"], 3);
        assert_eq!(value["export_file"], "output/news_data_x.xlsx");
        assert_eq!(value["stats"]["seen"], 5);
    }

    #[tokio::test]
    async fn test_write_output() {
        let config = config();
        let path = std::env::temp_dir().join(format!("{}.json", uuid::Uuid::new_v4()));
        let item = OutputWorkItem::new(&config, Path::new("x.xlsx"), RunStats::default());

        write_output(&item, &path).await.unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("\"category\": \"date\""));
        let _ = std::fs::remove_file(&path);
    }
}
