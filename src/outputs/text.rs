//! Plain-text report output.
//!
//! The layout is a header (source, extraction date, total count), a numbered
//! listing with one headline per entry, and a trailing end marker:
//!
//! ```text
//! News Headlines Extraction Report
//! Source: www.bbc.com (https://www.bbc.com/news)
//! Extraction Date: 2025-05-06 08:00:00
//! Total Headlines: 2
//! ============================================================
//!
//! 1. First headline
//!    Link: https://www.bbc.com/news/a
//!
//! 2. Second headline
//!
//! End of extraction
//! ```

use crate::error::ScrapeError;
use crate::models::HeadlineRecord;
use chrono::Local;
use std::fmt::Write as _;
use tokio::fs;
use tracing::{info, instrument};
use url::Url;

/// Render the text report into a string.
pub fn render(records: &[HeadlineRecord], source: &Url, generated_at: &str) -> String {
    let mut out = String::new();
    let host = source.host_str().unwrap_or("unknown");

    let _ = writeln!(out, "News Headlines Extraction Report");
    let _ = writeln!(out, "Source: {host} ({source})");
    let _ = writeln!(out, "Extraction Date: {generated_at}");
    let _ = writeln!(out, "Total Headlines: {}", records.len());
    let _ = writeln!(out, "{}", "=".repeat(60));
    let _ = writeln!(out);

    for (i, record) in records.iter().enumerate() {
        let _ = writeln!(out, "{}. {}", i + 1, record.title);
        if let Some(link) = &record.link {
            let _ = writeln!(out, "   Link: {link}");
        }
        if let Some(description) = &record.description {
            let _ = writeln!(out, "   Desc: {description}");
        }
        if let Some(published) = &record.published {
            let _ = writeln!(out, "   Published: {published}");
        }
        let _ = writeln!(out);
    }

    let _ = writeln!(out, "End of extraction");
    out
}

/// Write the text report to `path`.
#[instrument(level = "info", skip_all, fields(path = %path))]
pub async fn write_report(
    records: &[HeadlineRecord],
    source: &Url,
    path: &str,
) -> Result<(), ScrapeError> {
    let generated_at = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
    let body = render(records, source, &generated_at);
    fs::write(path, body)
        .await
        .map_err(|e| ScrapeError::persistence(path, e))?;
    info!(count = records.len(), "Wrote text report");
    Ok(())
}
