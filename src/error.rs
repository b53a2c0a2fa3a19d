//! Error taxonomy for the scraping pipeline.
//!
//! Each variant corresponds to one stage of the pipeline, so the CLI can map
//! failures to distinct exit codes:
//!
//! - [`ScrapeError::InvalidTarget`]: the URL was rejected before any network I/O
//! - [`ScrapeError::Fetch`]: the document could not be acquired (retries exhausted
//!   or a non-retryable HTTP status)
//! - [`ScrapeError::Parse`]: the document could not be turned into records
//! - [`ScrapeError::Persistence`]: the report could not be written
//!
//! Zero extracted records is *not* an error; it is reported as a normal outcome.

use std::fmt;
use thiserror::Error;

/// Errors produced by the fetch/extract/persist pipeline.
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// The target URL is malformed or lacks a scheme/host. Raised before any
    /// network call; never retried.
    #[error("invalid target URL `{url}`: {reason}")]
    InvalidTarget { url: String, reason: String },

    /// The fetch stage failed: retries exhausted, or a non-retryable HTTP
    /// status was returned.
    #[error("fetch failed for `{url}`: {cause}")]
    Fetch { url: String, cause: String },

    /// The fetched document could not be parsed into records.
    #[error("failed to parse document: {0}")]
    Parse(String),

    /// Writing the report failed.
    #[error("failed to persist report to `{path}`: {source}")]
    Persistence {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl ScrapeError {
    /// Creates an `InvalidTarget` error for `url` with a human-readable reason.
    pub fn invalid_target(url: impl Into<String>, reason: impl fmt::Display) -> Self {
        ScrapeError::InvalidTarget {
            url: url.into(),
            reason: reason.to_string(),
        }
    }

    /// Creates a `Fetch` error for `url` from an underlying cause.
    pub fn fetch(url: impl Into<String>, cause: impl fmt::Display) -> Self {
        ScrapeError::Fetch {
            url: url.into(),
            cause: cause.to_string(),
        }
    }

    /// Creates a `Parse` error from an underlying parser error.
    pub fn parse(err: impl fmt::Display) -> Self {
        ScrapeError::Parse(err.to_string())
    }

    /// Creates a `Persistence` error for the file at `path`.
    pub fn persistence(path: impl Into<String>, source: std::io::Error) -> Self {
        ScrapeError::Persistence {
            path: path.into(),
            source,
        }
    }
}
