//! # Headline Scraper
//!
//! Fetches a single news page or feed and extracts a deduplicated, ordered
//! list of headlines.
//!
//! ## Features
//!
//! - Resilient fetching: bounded retries with exponential (or constant)
//!   backoff for transient failures, browser-like User-Agent, redirects
//! - Ordered CSS-selector extraction with whitespace normalization, a
//!   minimum-length floor, case-insensitive dedup, and link resolution
//! - RSS/Atom feeds: per-entry title/description/link/date records
//! - Plain-text and JSON reports, optionally opened in the system viewer
//!
//! ## Usage
//!
//! ```sh
//! headline_scraper https://www.bbc.com/news -s "a.gs-c-promo-heading" -n 25
//! ```
//!
//! ## Exit codes
//!
//! | outcome | code |
//! |---|---|
//! | extracted at least one headline | 0 |
//! | completed with zero headlines | 1 |
//! | invalid target or fetch failure | 2 |
//! | document could not be parsed | 3 |
//! | report could not be written | 4 |
//!
//! With `--format both`, an explicit `--output` path is treated as a base
//! name and `.txt`/`.json` are appended.

use clap::Parser;
use std::process::ExitCode;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;
mod config;
mod error;
mod extract;
mod feed;
mod fetch;
mod models;
mod outputs;
mod utils;

use cli::Cli;
use config::ScrapeConfig;
use error::ScrapeError;
use extract::ExtractOptions;
use utils::{open_in_viewer, truncate_for_log};

const EXIT_NO_RECORDS: u8 = 1;
const EXIT_FETCH_FAILURE: u8 = 2;
const EXIT_PARSE_FAILURE: u8 = 3;
const EXIT_PERSISTENCE_FAILURE: u8 = 4;

#[tokio::main]
async fn main() -> ExitCode {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("headline_scraper starting up");

    let args = Cli::parse();
    debug!(?args.url, ?args.config, "Parsed CLI arguments");
    let config = ScrapeConfig::resolve(&args);

    let code = match run(&config).await {
        Ok(outcome) => {
            if outcome.parse_failed {
                ExitCode::from(EXIT_PARSE_FAILURE)
            } else if outcome.record_count == 0 {
                ExitCode::from(EXIT_NO_RECORDS)
            } else {
                ExitCode::SUCCESS
            }
        }
        Err(e) => {
            error!(error = %e, "Run failed");
            eprintln!("error: {e}");
            match e {
                ScrapeError::InvalidTarget { .. } | ScrapeError::Fetch { .. } => {
                    ExitCode::from(EXIT_FETCH_FAILURE)
                }
                ScrapeError::Parse(_) => ExitCode::from(EXIT_PARSE_FAILURE),
                ScrapeError::Persistence { .. } => ExitCode::from(EXIT_PERSISTENCE_FAILURE),
            }
        }
    };

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "Execution complete"
    );
    code
}

/// What a completed (non-failed) run produced.
struct RunOutcome {
    record_count: usize,
    /// The document could not be parsed; the result degraded to empty.
    parse_failed: bool,
}

async fn run(config: &ScrapeConfig) -> Result<RunOutcome, ScrapeError> {
    let raw_url = config.url.as_deref().ok_or_else(|| {
        ScrapeError::invalid_target(
            "",
            "no target URL given (pass one as an argument or set `url` in the config file)",
        )
    })?;

    // ---- Fetch ----
    let fetched = fetch::fetch_content(raw_url, &config.fetch).await?;
    debug!(
        content_type = ?fetched.content_type,
        body_preview = %truncate_for_log(&fetched.body, 200),
        "Fetched document"
    );

    // ---- Extract ----
    let mut parse_failed = false;
    let records = if fetched.looks_like_feed() {
        match feed::extract_feed(&fetched.body, config.max_records) {
            Ok(records) => records,
            Err(e) => {
                // Availability over strictness: a malformed document yields an
                // empty result, reported via the exit code, not a crash.
                warn!(error = %e, "Failed to parse feed; continuing with empty result");
                parse_failed = true;
                Vec::new()
            }
        }
    } else {
        let options = ExtractOptions {
            selectors: config.selectors.clone(),
            min_title_len: config.min_title_len,
            max_records: config.max_records,
            require_links: config.require_links,
        };
        extract::extract_headlines(&fetched.body, &fetched.url, &options)
    };

    if records.is_empty() {
        warn!(url = %fetched.url, "No headlines extracted; the selectors may be outdated");
    } else {
        info!(count = records.len(), url = %fetched.url, "Extraction finished");
    }

    // ---- Persist ----
    let format = config.output_format;
    let mut txt_path = None;
    if format.wants_txt() {
        let path = match (&config.output, format.wants_json()) {
            (Some(base), true) => format!("{base}.txt"),
            (Some(path), false) => path.clone(),
            (None, _) => outputs::default_filename(&fetched.url, "txt"),
        };
        outputs::text::write_report(&records, &fetched.url, &path).await?;
        println!("Text report written to {path}");
        txt_path = Some(path);
    }
    if format.wants_json() {
        let path = match (&config.output, format.wants_txt()) {
            (Some(base), true) => format!("{base}.json"),
            (Some(path), false) => path.clone(),
            (None, _) => outputs::default_filename(&fetched.url, "json"),
        };
        outputs::json::write_report(&records, &fetched.url, &path).await?;
        println!("JSON report written to {path}");
    }

    println!(
        "Extracted {} unique headlines from {}",
        records.len(),
        fetched.url.host_str().unwrap_or("unknown host")
    );

    if config.open_report {
        if let Some(path) = &txt_path {
            open_in_viewer(path);
        }
    }

    Ok(RunOutcome {
        record_count: records.len(),
        parse_failed,
    })
}
