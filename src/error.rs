//! Error types for the harvester.
//!
//! Only configuration problems are fatal. Everything raised while handling a
//! single search result is caught at the pipeline's per-entry boundary.

use thiserror::Error;

/// Top-level error for a harvesting run.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Article error: {0}")]
    Article(#[from] ArticleError),

    #[error("Browser error: {0}")]
    Browser(#[from] BrowserError),

    #[error("Export error: {0}")]
    Export(#[from] ExportError),
}

/// Fatal configuration problems, raised before the pipeline starts.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required input `{0}`")]
    Missing(&'static str),

    #[error("invalid url `{url}`: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("could not read work item {path}: {reason}")]
    WorkItem { path: String, reason: String },
}

/// Reasons a raw search result cannot become an [`crate::models::Article`].
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ArticleError {
    #[error("article title is empty")]
    EmptyTitle,

    #[error("article description is empty")]
    EmptyDescription,
}

/// Failures of the browser collaborator.
#[derive(Error, Debug)]
pub enum BrowserError {
    #[error("Failed to launch browser: {0}")]
    LaunchFailed(String),

    #[error("Navigation to {url} failed: {reason}")]
    Navigation { url: String, reason: String },

    #[error("Element not found: {0}")]
    ElementNotFound(String),

    #[error("CDP error: {0}")]
    Cdp(String),
}

impl BrowserError {
    pub fn cdp(e: impl std::fmt::Display) -> Self {
        Self::Cdp(e.to_string())
    }
}

/// Failures while writing the run's output files.
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("spreadsheet write failed: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[error("JSON write failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
