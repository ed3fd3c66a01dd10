//! Browser-driven access to the news site's search results.
//!
//! The site renders its search results with JavaScript and pages them with a
//! "Show more" button, so results are read from a live Chromium page rather
//! than fetched as static HTML.
//!
//! - [`aljazeera`]: search session for the Al Jazeera results page
//! - [`BrowserOptions`]: how Chromium is launched

pub mod aljazeera;

/// Chromium launch options.
#[derive(Debug, Clone)]
pub struct BrowserOptions {
    /// Run without a window (default: true)
    pub headless: bool,
    /// Path to Chrome/Chromium (None = auto-detect)
    pub chrome_path: Option<String>,
    pub width: u32,
    pub height: u32,
}

impl Default for BrowserOptions {
    fn default() -> Self {
        Self {
            headless: true,
            chrome_path: None,
            width: 1920,
            height: 1080,
        }
    }
}
