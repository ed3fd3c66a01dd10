//! The extraction pipeline.
//!
//! Walks the search results in page order, one index at a time:
//!
//! 1. **Fetching(i)**: wait for the i-th title. If it never shows up, ask the
//!    page for more results and retry the same index, or finish when the page
//!    has nothing more to load.
//! 2. **Filtering**: build an [`Article`]; entries with an unknown date or a
//!    date outside the recency window are skipped.
//! 3. **Exporting**: download the image, compute the keyword and money
//!    signals, and append an [`ExportRow`].
//!
//! Failures inside a single entry are logged and the entry is skipped; they
//! never end the run.

use crate::error::Result;
use crate::extract::recency::is_within_window;
use crate::models::{Article, ExportRow, RawEntry};
use crate::utils::truncate_for_log;
use chrono::{Local, NaiveDateTime};
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, error, info, instrument, warn};

/// How long to wait for the i-th title before trying to load more results.
pub const TITLE_TIMEOUT: Duration = Duration::from_secs(5);
/// How long a "show more" click may take to produce new results.
pub const LOAD_MORE_TIMEOUT: Duration = Duration::from_secs(10);

/// The page of search results, addressed by 1-based entry index.
pub trait ArticleSource {
    /// Whether the `index`-th title appears within `timeout`.
    async fn wait_for_title(&mut self, index: usize, timeout: Duration) -> bool;

    async fn title(&mut self, index: usize) -> Result<String>;

    /// Date fragment and teaser of the `index`-th result.
    async fn description(&mut self, index: usize) -> Result<String>;

    async fn image_url(&mut self, index: usize) -> Result<Option<String>>;

    /// Ask the page for more results. `true` when new results were loaded.
    async fn try_load_more(&mut self, timeout: Duration) -> bool;
}

/// Persists article images.
pub trait ImageStore {
    /// Download `url` and return the stored filename, or `None` on any failure.
    async fn download(&self, url: &str) -> Option<String>;
}

/// Run-specific inputs of the pipeline.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Phrase whose occurrences are counted in each exported article.
    pub search_phrase: String,
    /// Size of the recency window, in 30-day months.
    pub number_of_months: u32,
    /// Stop once this many rows have been exported.
    pub max_articles: Option<usize>,
    pub title_timeout: Duration,
    pub load_more_timeout: Duration,
}

impl PipelineConfig {
    pub fn new(search_phrase: impl Into<String>, number_of_months: u32) -> Self {
        Self {
            search_phrase: search_phrase.into(),
            number_of_months,
            max_articles: None,
            title_timeout: TITLE_TIMEOUT,
            load_more_timeout: LOAD_MORE_TIMEOUT,
        }
    }
}

/// Counters for one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunStats {
    /// Entries read from the page.
    pub seen: usize,
    pub exported: usize,
    pub skipped_unknown_date: usize,
    pub skipped_out_of_window: usize,
    /// Entries dropped because of an error.
    pub failed: usize,
    /// Successful "show more" loads.
    pub pages_loaded: usize,
}

/// Rows accumulated over a finished run.
#[derive(Debug, Default)]
pub struct RunOutput {
    pub rows: Vec<ExportRow>,
    pub stats: RunStats,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Fetching(usize),
    Done,
}

enum EntryOutcome {
    Exported(ExportRow),
    UnknownDate,
    OutOfWindow,
}

/// Drives an [`ArticleSource`] to completion.
pub struct Pipeline<'a, S, I> {
    source: &'a mut S,
    images: &'a I,
    config: PipelineConfig,
    clock: fn() -> NaiveDateTime,
}

impl<'a, S: ArticleSource, I: ImageStore> Pipeline<'a, S, I> {
    pub fn new(source: &'a mut S, images: &'a I, config: PipelineConfig) -> Self {
        Self {
            source,
            images,
            config,
            clock: || Local::now().naive_local(),
        }
    }

    /// Replace the wall clock used to resolve relative dates.
    pub fn with_clock(mut self, clock: fn() -> NaiveDateTime) -> Self {
        self.clock = clock;
        self
    }

    /// Process entries until the page runs out of results.
    #[instrument(level = "info", skip_all, fields(phrase = %self.config.search_phrase, months = self.config.number_of_months))]
    pub async fn run(mut self) -> RunOutput {
        let mut output = RunOutput::default();
        let mut state = State::Fetching(1);

        while let State::Fetching(index) = state {
            if self
                .config
                .max_articles
                .is_some_and(|max| output.rows.len() >= max)
            {
                info!(limit = output.rows.len(), "Reached article limit");
                break;
            }

            if !self
                .source
                .wait_for_title(index, self.config.title_timeout)
                .await
            {
                debug!(index, "Title not present; trying to load more results");
                state = if self.source.try_load_more(self.config.load_more_timeout).await {
                    output.stats.pages_loaded += 1;
                    info!(index, "Loaded more results");
                    State::Fetching(index)
                } else {
                    info!(index, "No more articles to load");
                    State::Done
                };
                continue;
            }

            output.stats.seen += 1;
            match self.process_entry(index).await {
                Ok(EntryOutcome::Exported(row)) => {
                    info!(index, title = %row.title, date = %row.date, "Processed article");
                    output.stats.exported += 1;
                    output.rows.push(row);
                }
                Ok(EntryOutcome::UnknownDate) => {
                    debug!(index, "Skipping article without a usable date");
                    output.stats.skipped_unknown_date += 1;
                }
                Ok(EntryOutcome::OutOfWindow) => {
                    debug!(index, "Skipping article outside the recency window");
                    output.stats.skipped_out_of_window += 1;
                }
                Err(e) => {
                    error!(index, error = %e, "Error processing article");
                    output.stats.failed += 1;
                }
            }
            state = State::Fetching(index + 1);
        }

        info!(
            exported = output.stats.exported,
            seen = output.stats.seen,
            failed = output.stats.failed,
            "Pipeline finished"
        );
        output
    }

    async fn process_entry(&mut self, index: usize) -> Result<EntryOutcome> {
        let raw = RawEntry {
            title: self.source.title(index).await?,
            combined_description: self.source.description(index).await?,
            image_url: self.source.image_url(index).await?,
        };
        let now = (self.clock)();
        let article = Article::from_raw(raw, now)?;
        debug!(
            index,
            title = %article.title(),
            date = ?article.date(),
            description = %truncate_for_log(article.description(), 80),
            "Built article"
        );

        if article.date().is_none() {
            return Ok(EntryOutcome::UnknownDate);
        }
        if !is_within_window(article.date(), self.config.number_of_months, now) {
            return Ok(EntryOutcome::OutOfWindow);
        }

        if let Some(url) = article.image_url() {
            match self.images.download(url).await {
                Some(filename) => {
                    article.set_image_filename(filename);
                }
                None => warn!(index, %url, "Image download failed; exporting without image"),
            }
        }

        let keyword_count = article.keyword_count(&self.config.search_phrase);
        let has_money = article.has_money();
        Ok(article
            .to_export_row(keyword_count, has_money)
            .map_or(EntryOutcome::UnknownDate, EntryOutcome::Exported))
    }
}
