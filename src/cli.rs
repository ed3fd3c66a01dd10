//! Command-line interface definitions.
//!
//! Every run input can come from a flag, an environment variable, or the
//! input work item file passed with `--work-item`. Flags and environment
//! variables take precedence over the work item.

use clap::Parser;

/// Command-line arguments for the news harvester.
///
/// # Examples
///
/// ```sh
/// # Everything on the command line
/// news_harvest --url https://www.aljazeera.com --search-text "oil prices" \
///     --category date --number-of-months 2
///
/// # Inputs from a work item file
/// news_harvest --work-item work-item.json
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Input work item (JSON or YAML) with url, search_text, category, number_of_months
    #[arg(short, long, env = "NEWS_WORK_ITEM")]
    pub work_item: Option<String>,

    /// News site to search
    #[arg(short, long, env = "NEWS_URL")]
    pub url: Option<String>,

    /// Phrase to search for
    #[arg(short, long, env = "NEWS_SEARCH_TEXT")]
    pub search_text: Option<String>,

    /// Sort option of the results page (e.g. "relevance", "date")
    #[arg(short, long, env = "NEWS_CATEGORY")]
    pub category: Option<String>,

    /// Recency window in 30-day months; 0 keeps only today's articles
    #[arg(short, long, env = "NEWS_NUMBER_OF_MONTHS")]
    pub number_of_months: Option<String>,

    /// Directory for the spreadsheet, images, and output work item
    #[arg(short, long, env = "NEWS_OUTPUT_DIR", default_value = "output")]
    pub output_dir: String,

    /// File that receives a copy of the log
    #[arg(long, env = "NEWS_LOG_FILE", default_value = "scraper.log")]
    pub log_file: String,

    /// Stop after exporting this many articles
    #[arg(long)]
    pub max_articles: Option<usize>,

    /// Show the browser window
    #[arg(long)]
    pub headful: bool,

    /// Path to a Chrome/Chromium executable
    #[arg(long, env = "CHROME_PATH")]
    pub chrome_path: Option<String>,
}
