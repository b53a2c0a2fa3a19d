//! Report writers for extracted headlines.
//!
//! Two formats are supported, selectable independently or together:
//!
//! - [`text`]: a numbered plain-text listing, one headline per entry, with
//!   indented link/description/date lines when the source carried them
//! - [`json`]: a machine-readable report with generation metadata
//!
//! Write failures are surfaced to the caller as
//! [`ScrapeError::Persistence`](crate::error::ScrapeError::Persistence),
//! never silently swallowed.

use chrono::Local;
use url::Url;

pub mod json;
pub mod text;

/// Default report filename: `news_headlines_{host}_{timestamp}.{ext}`.
pub fn default_filename(source: &Url, ext: &str) -> String {
    let host = source.host_str().unwrap_or("unknown");
    let timestamp = Local::now().format("%Y%m%d_%H%M%S");
    format!("news_headlines_{host}_{timestamp}.{ext}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filename_embeds_host_and_extension() {
        let url = Url::parse("https://www.bbc.com/news").unwrap();
        let name = default_filename(&url, "txt");
        assert!(name.starts_with("news_headlines_www.bbc.com_"));
        assert!(name.ends_with(".txt"));
    }
}
