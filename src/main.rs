//! # News Harvest
//!
//! Searches a news site for a phrase, keeps the results published within a
//! recent window, downloads their images, and exports them to a spreadsheet.
//!
//! ## Usage
//!
//! ```sh
//! news_harvest --url https://www.aljazeera.com --search-text "oil prices" -n 1
//! news_harvest --work-item work-item.json
//! ```
//!
//! ## Architecture
//!
//! 1. **Configuration**: merge CLI/env values with the input work item
//! 2. **Search**: open the site in Chromium, search, and sort the results
//! 3. **Extraction**: walk the results one by one, parse dates, filter by
//!    recency, download images, compute keyword and money signals
//! 4. **Output**: write the spreadsheet and the output work item

use chrono::Local;
use clap::Parser;
use std::error::Error;
use std::fs::OpenOptions;
use std::sync::Mutex;
use tracing::{debug, error, info, warn};
use tracing_subscriber::fmt::time::UtcTime;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;
mod config;
mod error;
mod extract;
mod images;
mod models;
mod outputs;
mod pipeline;
mod scrapers;
mod utils;

use cli::Cli;
use config::{RunConfig, WorkItem};
use images::HttpImageStore;
use outputs::{json, xlsx};
use pipeline::{Pipeline, PipelineConfig};
use scrapers::BrowserOptions;
use scrapers::aljazeera::SearchSession;
use utils::{ensure_writable_dir, run_timestamp};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let args = Cli::parse();

    // --- Tracing init: console plus a plain-text copy in the log file ---
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&args.log_file)?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tfmt::layer()
                .with_target(true)
                .with_timer(UtcTime::rfc_3339()),
        )
        .with(
            tfmt::layer()
                .with_ansi(false)
                .with_timer(UtcTime::rfc_3339())
                .with_writer(Mutex::new(log_file)),
        )
        .init();

    let start_time = std::time::Instant::now();
    let started_at = Local::now();
    info!("news_harvest starting up");
    debug!(?args, "Parsed CLI arguments");

    // ---- Configuration ----
    let file_item = match args.work_item.as_deref() {
        Some(path) => WorkItem::load(path).await?,
        None => WorkItem::default(),
    };
    let config = match RunConfig::from_work_item(WorkItem::from_cli(&args).or(file_item)) {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Invalid run configuration");
            return Err(e.into());
        }
    };
    info!(
        url = %config.url,
        search_text = %config.search_text,
        category = %config.category,
        number_of_months = config.number_of_months,
        "Work item variables"
    );

    if let Err(e) = ensure_writable_dir(&args.output_dir).await {
        error!(
            path = %args.output_dir,
            error = %e,
            "Output directory is not writable (fix perms or choose a different path)"
        );
        return Err(e.into());
    }
    let images = HttpImageStore::new(&args.output_dir)?;

    // ---- Search ----
    let options = BrowserOptions {
        headless: !args.headful,
        chrome_path: args.chrome_path.clone(),
        ..Default::default()
    };
    let mut session =
        SearchSession::start(&options, &config.url, &config.search_text, &config.category).await?;

    // ---- Extraction ----
    let mut pipeline_config = PipelineConfig::new(config.search_text.clone(), config.number_of_months);
    pipeline_config.max_articles = args.max_articles;
    let output = Pipeline::new(&mut session, &images, pipeline_config)
        .run()
        .await;

    if let Err(e) = session.close().await {
        warn!(error = %e, "Failed to close browser cleanly");
    }

    // ---- Output ----
    let timestamp = run_timestamp(started_at);
    let export_file = xlsx::export_path(&args.output_dir, &timestamp);
    if output.rows.is_empty() {
        info!("No articles were saved");
    }
    xlsx::write_rows(&export_file, &output.rows)?;
    info!(path = %export_file.display(), rows = output.rows.len(), "Saved articles to Excel");

    let item = json::OutputWorkItem::new(&config, &export_file, output.stats);
    if let Err(e) = json::write_output(&item, &json::output_path(&args.output_dir, &timestamp)).await {
        error!(error = %e, "Failed to write output work item");
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        exported = output.stats.exported,
        seen = output.stats.seen,
        failed = output.stats.failed,
        "Execution complete"
    );

    Ok(())
}
