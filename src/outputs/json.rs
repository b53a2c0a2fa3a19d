//! JSON report output.
//!
//! Serializes a [`HeadlineReport`] envelope: generation metadata plus the
//! ordered headline list. Intended for machine consumption, so the structure
//! is stable and fields absent from the source are omitted entirely.

use crate::error::ScrapeError;
use crate::models::{HeadlineRecord, HeadlineReport, ReportMetadata};
use chrono::Local;
use tokio::fs;
use tracing::{info, instrument};
use url::Url;

/// Build the report envelope for `records` extracted from `source`.
pub fn build_report(records: &[HeadlineRecord], source: &Url) -> HeadlineReport {
    HeadlineReport {
        metadata: ReportMetadata {
            generated_at: Local::now().to_rfc3339(),
            source: source.to_string(),
            total_headlines: records.len(),
        },
        headlines: records.to_vec(),
    }
}

/// Write the JSON report to `path`.
#[instrument(level = "info", skip_all, fields(path = %path))]
pub async fn write_report(
    records: &[HeadlineRecord],
    source: &Url,
    path: &str,
) -> Result<(), ScrapeError> {
    let report = build_report(records, source);
    let json = serde_json::to_string_pretty(&report)
        .map_err(|e| ScrapeError::persistence(path, std::io::Error::other(e)))?;
    fs::write(path, json)
        .await
        .map_err(|e| ScrapeError::persistence(path, e))?;
    info!(count = records.len(), "Wrote JSON report");
    Ok(())
}
