//! Al Jazeera search session.
//!
//! Opens the site in Chromium, submits the search, picks the sort option, and
//! then serves the result cards to the pipeline by index.
//!
//! # Page structure
//!
//! Result cards are `<article>` elements. The n-th card's headline is the n-th
//! `h3.gc__title > a`, its date-and-teaser text is the n-th `article p`, and
//! its thumbnail is the n-th `article img`. The cards are read from a
//! [`ResultsSnapshot`], parsed once each time the rendered DOM is re-read.

use crate::error::{BrowserError, Result};
use crate::pipeline::ArticleSource;
use crate::scrapers::BrowserOptions;
use crate::utils::truncate_for_log;
use chromiumoxide::Page;
use chromiumoxide::browser::{Browser, BrowserConfig};
use futures::StreamExt;
use scraper::{Html, Selector};
use serde::de::DeserializeOwned;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};
use url::Url;

const SEARCH_TOGGLE: &str = "button[type='button']";
const SEARCH_INPUT: &str = "input[placeholder='Search']";
const SORT_SELECT: &str = "#search-sort-option";
const SHOW_MORE_BUTTON: &str = "button[data-testid='show-more-button']";

const TITLE_SELECTOR: &str = "h3.gc__title > a";
const DESCRIPTION_SELECTOR: &str = "article p";
const IMAGE_SELECTOR: &str = "article img";

const POLL_INTERVAL: Duration = Duration::from_millis(250);
const CONTROL_TIMEOUT: Duration = Duration::from_secs(10);
const FALLBACK_CATEGORY: &str = "relevance";

/// A Chromium page showing the search results for one phrase.
pub struct SearchSession {
    browser: Browser,
    handler: JoinHandle<()>,
    page: Page,
    base_url: Url,
    snapshot: ResultsSnapshot,
}

impl SearchSession {
    /// Launch Chromium, open `url`, search for `search_text`, and sort the
    /// results by `category`.
    ///
    /// A missing sort option is not an error: the session falls back to
    /// relevance.
    #[instrument(level = "info", skip(options))]
    pub async fn start(
        options: &BrowserOptions,
        url: &Url,
        search_text: &str,
        category: &str,
    ) -> Result<Self> {
        let mut session = Self::launch(options, url).await?;
        session.open().await?;
        session.search(search_text).await?;
        session.select_category(category).await;
        Ok(session)
    }

    async fn launch(options: &BrowserOptions, url: &Url) -> Result<Self> {
        info!(headless = options.headless, "Launching browser");

        let mut builder = BrowserConfig::builder().window_size(options.width, options.height);
        if !options.headless {
            builder = builder.with_head();
        }
        if let Some(ref path) = options.chrome_path {
            builder = builder.chrome_executable(path);
        }
        let config = builder.build().map_err(BrowserError::LaunchFailed)?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| BrowserError::LaunchFailed(e.to_string()))?;

        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    warn!("Browser handler event error");
                    break;
                }
            }
            debug!("Browser handler finished");
        });

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(BrowserError::cdp)?;

        Ok(Self {
            browser,
            handler,
            page,
            base_url: url.clone(),
            snapshot: ResultsSnapshot::default(),
        })
    }

    #[instrument(level = "info", skip(self), fields(url = %self.base_url))]
    async fn open(&mut self) -> Result<()> {
        self.page
            .goto(self.base_url.as_str())
            .await
            .map_err(|e| BrowserError::Navigation {
                url: self.base_url.to_string(),
                reason: e.to_string(),
            })?;
        info!("Opened news site");
        Ok(())
    }

    #[instrument(level = "info", skip(self))]
    async fn search(&mut self, search_text: &str) -> Result<()> {
        self.page
            .find_element(SEARCH_TOGGLE)
            .await
            .map_err(|_| BrowserError::ElementNotFound(SEARCH_TOGGLE.to_string()))?
            .click()
            .await
            .map_err(BrowserError::cdp)?;

        let input = self
            .page
            .find_element(SEARCH_INPUT)
            .await
            .map_err(|_| BrowserError::ElementNotFound(SEARCH_INPUT.to_string()))?;
        input.click().await.map_err(BrowserError::cdp)?;
        input.type_str(search_text).await.map_err(BrowserError::cdp)?;
        input.press_key("Enter").await.map_err(BrowserError::cdp)?;

        if let Err(e) = self.page.wait_for_navigation().await {
            debug!(error = %e, "No navigation after submitting the search");
        }
        info!("Submitted search");
        Ok(())
    }

    /// Choose the sort option, falling back to relevance when `category` is
    /// not offered.
    #[instrument(level = "info", skip(self))]
    async fn select_category(&mut self, category: &str) {
        if !self.wait_for_selector(SORT_SELECT, CONTROL_TIMEOUT).await {
            warn!("Sort control not found; keeping the page's default order");
            return;
        }

        match self.choose_sort_option(category).await {
            Ok(true) => {
                info!("Sorted results");
                return;
            }
            Ok(false) => warn!(
                fallback = FALLBACK_CATEGORY,
                "Could not find category; defaulting to relevance"
            ),
            Err(e) => warn!(
                error = %e,
                fallback = FALLBACK_CATEGORY,
                "Could not select category; defaulting to relevance"
            ),
        }

        if category != FALLBACK_CATEGORY {
            match self.choose_sort_option(FALLBACK_CATEGORY).await {
                Ok(true) => info!("Sorted results by relevance"),
                Ok(false) => warn!("Relevance sort option missing; keeping the page's default order"),
                Err(e) => warn!(error = %e, "Could not select relevance sort option"),
            }
        }
    }

    async fn choose_sort_option(&self, value: &str) -> Result<bool> {
        let script = format!(
            r#"(() => {{
                const select = document.querySelector({select});
                if (!select) return false;
                const wanted = {value};
                const option = Array.from(select.options).find(o => o.value === wanted);
                if (!option) return false;
                select.value = wanted;
                select.dispatchEvent(new Event('change', {{ bubbles: true }}));
                return true;
            }})()"#,
            select = js_string(SORT_SELECT),
            value = js_string(value),
        );
        self.evaluate(&script).await
    }

    async fn wait_for_selector(&self, selector: &str, timeout: Duration) -> bool {
        let script = format!("document.querySelector({}) !== null", js_string(selector));
        let started = Instant::now();
        loop {
            if let Ok(true) = self.evaluate::<bool>(&script).await {
                return true;
            }
            if started.elapsed() >= timeout {
                return false;
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    async fn evaluate<T: DeserializeOwned>(&self, script: &str) -> Result<T> {
        let value = self
            .page
            .evaluate(script)
            .await
            .map_err(BrowserError::cdp)?
            .into_value::<T>()
            .map_err(BrowserError::cdp)?;
        Ok(value)
    }

    /// Re-read the rendered DOM.
    async fn refresh(&mut self) -> Result<()> {
        let html = self.page.content().await.map_err(BrowserError::cdp)?;
        self.snapshot = ResultsSnapshot::parse(&html, &self.base_url);
        Ok(())
    }

    async fn show_more_visible(&self) -> bool {
        let script = format!(
            "(() => {{ const b = document.querySelector({}); return !!b && b.offsetParent !== null; }})()",
            js_string(SHOW_MORE_BUTTON)
        );
        self.evaluate::<bool>(&script).await.unwrap_or(false)
    }

    /// Shut the browser down.
    #[instrument(level = "info", skip_all)]
    pub async fn close(mut self) -> Result<()> {
        info!("Closing browser");
        self.browser.close().await.map_err(BrowserError::cdp)?;
        let _ = tokio::time::timeout(Duration::from_secs(5), self.handler).await;
        Ok(())
    }
}

impl ArticleSource for SearchSession {
    async fn wait_for_title(&mut self, index: usize, timeout: Duration) -> bool {
        let started = Instant::now();
        loop {
            match self.refresh().await {
                Ok(()) if self.snapshot.title_count() >= index => return true,
                Ok(()) => {}
                Err(e) => debug!(error = %e, "Page snapshot failed"),
            }
            if started.elapsed() >= timeout {
                debug!(index, "Title element not found");
                return false;
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    async fn title(&mut self, index: usize) -> Result<String> {
        let title = self
            .snapshot
            .title(index)
            .ok_or_else(|| BrowserError::ElementNotFound(format!("{TITLE_SELECTOR} #{index}")))?;
        Ok(title)
    }

    async fn description(&mut self, index: usize) -> Result<String> {
        let text = self.snapshot.description(index).ok_or_else(|| {
            BrowserError::ElementNotFound(format!("{DESCRIPTION_SELECTOR} #{index}"))
        })?;
        debug!(index, text = %truncate_for_log(&text, 120), "Read description");
        Ok(text)
    }

    async fn image_url(&mut self, index: usize) -> Result<Option<String>> {
        Ok(self.snapshot.image_url(index))
    }

    #[instrument(level = "info", skip(self))]
    async fn try_load_more(&mut self, timeout: Duration) -> bool {
        if let Err(e) = self.refresh().await {
            warn!(error = %e, "Could not read the page before loading more");
            return false;
        }
        let before = self.snapshot.title_count();

        if let Err(e) = self
            .evaluate::<bool>("(() => { window.scrollTo(0, document.body.scrollHeight); return true; })()")
            .await
        {
            debug!(error = %e, "Scroll failed");
        }

        if !self.show_more_visible().await {
            debug!("Show more button not visible");
            return false;
        }

        let clicked = match self.page.find_element(SHOW_MORE_BUTTON).await {
            Ok(button) => button.click().await.map(|_| ()),
            Err(e) => Err(e),
        };
        if let Err(e) = clicked {
            warn!(error = %e, "Error clicking 'Show more'");
            return false;
        }

        let started = Instant::now();
        while started.elapsed() < timeout {
            tokio::time::sleep(POLL_INTERVAL).await;
            if self.refresh().await.is_err() {
                continue;
            }
            let after = self.snapshot.title_count();
            let button_visible = after <= before && self.show_more_visible().await;
            if load_finished(before, after, button_visible) {
                info!(before, after, button_visible, "Clicked 'Show more' and loaded more results");
                return true;
            }
        }
        warn!(before, "'Show more' produced no new results");
        false
    }
}

/// Quote `s` as a JavaScript string literal.
fn js_string(s: &str) -> String {
    serde_json::Value::String(s.to_string()).to_string()
}

/// A click on "Show more" has finished loading once more titles are on the
/// page or the button has gone away.
fn load_finished(before: usize, after: usize, button_visible: bool) -> bool {
    after > before || !button_visible
}

fn selector(css: &'static str) -> Selector {
    Selector::parse(css).expect("static selector")
}

/// The result cards of one DOM read: titles, teasers and image URLs, in page
/// order.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
struct ResultsSnapshot {
    titles: Vec<String>,
    descriptions: Vec<String>,
    images: Vec<Option<String>>,
}

impl ResultsSnapshot {
    fn parse(html: &str, base: &Url) -> Self {
        let document = Html::parse_document(html);
        let texts = |css: &'static str| {
            document
                .select(&selector(css))
                .map(|element| {
                    let text = element.text().collect::<Vec<_>>().join(" ");
                    text.split_whitespace().collect::<Vec<_>>().join(" ")
                })
                .collect::<Vec<_>>()
        };
        let titles = texts(TITLE_SELECTOR);
        let descriptions = texts(DESCRIPTION_SELECTOR);
        let images = document
            .select(&selector(IMAGE_SELECTOR))
            .map(|element| {
                let src = element.value().attr("src")?.trim();
                if src.is_empty() {
                    return None;
                }
                base.join(src).ok().map(|u| u.to_string())
            })
            .collect();
        Self {
            titles,
            descriptions,
            images,
        }
    }

    fn title_count(&self) -> usize {
        self.titles.len()
    }

    /// Whitespace-normalised headline of the `index`-th (1-based) card.
    fn title(&self, index: usize) -> Option<String> {
        nth(&self.titles, index).cloned()
    }

    fn description(&self, index: usize) -> Option<String> {
        nth(&self.descriptions, index).cloned()
    }

    /// Absolute `src` of the `index`-th (1-based) result image.
    fn image_url(&self, index: usize) -> Option<String> {
        nth(&self.images, index).cloned().flatten()
    }
}

fn nth<T>(items: &[T], index: usize) -> Option<&T> {
    items.get(index.checked_sub(1)?)
}
