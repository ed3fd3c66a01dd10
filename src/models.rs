//! Data models for search results and their exported representation.
//!
//! - [`RawEntry`]: the text of one search result as read from the page
//! - [`Article`]: a validated result with its date resolved
//! - [`ExportRow`]: the spreadsheet projection of an accepted article

use crate::error::ArticleError;
use crate::extract::date::{format_export_date, parse_date_expression};
use crate::extract::description::split_description;
use crate::extract::signals::{contains_money, count_occurrences};
use chrono::{NaiveDate, NaiveDateTime};
use once_cell::sync::OnceCell;
use serde::Serialize;

/// Spreadsheet header, in column order.
pub const EXPORT_HEADERS: [&str; 6] = [
    "Title",
    "Date",
    "Description",
    "Image Filename",
    "Search Phrase Occurrences",
    "Contains Money",
];

/// One search result exactly as the browser returned it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawEntry {
    /// The result headline.
    pub title: String,
    /// Date fragment and teaser in a single string.
    pub combined_description: String,
    /// The `src` of the result's thumbnail, if it has one.
    pub image_url: Option<String>,
}

/// A search result after its description has been split and its date parsed.
///
/// Everything except the image filename is fixed at construction. The filename
/// is recorded at most once, after a successful download.
#[derive(Debug)]
pub struct Article {
    title: String,
    description: String,
    date: Option<NaiveDate>,
    image_url: Option<String>,
    image_filename: OnceCell<String>,
}

impl Article {
    /// Build an article from a raw entry, resolving relative dates against `now`.
    ///
    /// # Errors
    ///
    /// Returns [`ArticleError`] when the title is blank or no description text
    /// remains. An unparseable date is not an error: the article is built with
    /// an unknown date.
    pub fn from_raw(raw: RawEntry, now: NaiveDateTime) -> Result<Self, ArticleError> {
        if raw.title.trim().is_empty() {
            return Err(ArticleError::EmptyTitle);
        }

        let (token, description) = split_description(&raw.combined_description);
        if description.trim().is_empty() {
            return Err(ArticleError::EmptyDescription);
        }
        let date = token
            .as_deref()
            .and_then(|token| parse_date_expression(token, now));

        Ok(Self {
            title: raw.title,
            description,
            date,
            image_url: raw.image_url,
            image_filename: OnceCell::new(),
        })
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Publication date, `None` when it could not be determined.
    pub fn date(&self) -> Option<NaiveDate> {
        self.date
    }

    pub fn image_url(&self) -> Option<&str> {
        self.image_url.as_deref()
    }

    pub fn image_filename(&self) -> Option<&str> {
        self.image_filename.get().map(String::as_str)
    }

    /// Record the downloaded image's filename. Returns `false` if one was
    /// already recorded; the first filename is kept.
    pub fn set_image_filename(&self, filename: String) -> bool {
        self.image_filename.set(filename).is_ok()
    }

    /// Occurrences of `phrase` in the title plus those in the description.
    pub fn keyword_count(&self, phrase: &str) -> usize {
        count_occurrences(&self.title, phrase) + count_occurrences(&self.description, phrase)
    }

    /// Whether the title or the description mentions a monetary amount.
    pub fn has_money(&self) -> bool {
        contains_money(&self.title) || contains_money(&self.description)
    }

    /// Project into an export row. `None` when the date is unknown.
    pub fn to_export_row(&self, keyword_count: usize, has_money: bool) -> Option<ExportRow> {
        let date = self.date?;
        Some(ExportRow {
            title: self.title.clone(),
            date: format_export_date(date),
            description: self.description.clone(),
            image_filename: self.image_filename().map(str::to_string),
            keyword_count,
            has_money,
        })
    }
}

/// One data row of the export sheet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportRow {
    pub title: String,
    /// `DD-MM-YYYY`
    pub date: String,
    pub description: String,
    pub image_filename: Option<String>,
    pub keyword_count: usize,
    pub has_money: bool,
}
