//! Data models for fetched documents and extracted headlines.
//!
//! This module defines the core data structures passed between pipeline stages:
//! - [`FetchResult`]: raw document content returned by the fetch stage
//! - [`HeadlineRecord`]: one normalized headline, optionally with a resolved link
//! - [`HeadlineReport`]: the serializable envelope written by the JSON output
//!
//! The fetcher and extractor hold no state between invocations; every run
//! constructs fresh instances of these types and the caller owns them.

use serde::{Deserialize, Serialize};
use url::Url;

/// Raw document content as returned by the fetch stage.
///
/// The `content_type` is whatever the server declared in its `Content-Type`
/// header, if anything. A non-markup content type is a warning at fetch time,
/// not an error; extraction decides what to do with the body.
#[derive(Debug, Clone)]
pub struct FetchResult {
    /// The URL the content was fetched from.
    pub url: Url,
    /// The raw response body.
    pub body: String,
    /// The declared MIME type of the response, if present.
    pub content_type: Option<String>,
}

impl FetchResult {
    /// True when the declared content type, or failing that the URL path,
    /// indicates an RSS/Atom feed rather than an HTML page.
    pub fn looks_like_feed(&self) -> bool {
        if let Some(ct) = &self.content_type {
            let ct = ct.to_ascii_lowercase();
            if ct.contains("rss") || ct.contains("atom") || ct.contains("xml") {
                return true;
            }
            if ct.contains("html") {
                return false;
            }
        }
        let path = self.url.path().to_ascii_lowercase();
        path.ends_with(".rss")
            || path.ends_with(".xml")
            || path.contains("rss")
            || path.contains("feed")
    }
}

/// One extracted headline.
///
/// Records are unique within an [`ExtractionResult`] under case-insensitive,
/// whitespace-normalized comparison of `title`; the first-seen casing is the
/// one stored. `description` and `published` are only populated when the
/// source document is a feed that carries them per entry.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct HeadlineRecord {
    /// The normalized headline text.
    pub title: String,
    /// Absolute link to the story, when one resolved.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    /// Entry description, for feed sources.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Publication date string as the source declared it, for feed sources.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published: Option<String>,
}

impl HeadlineRecord {
    /// A plain text-only record with no link or feed metadata.
    pub fn text_only(title: impl Into<String>) -> Self {
        HeadlineRecord {
            title: title.into(),
            link: None,
            description: None,
            published: None,
        }
    }
}

/// Ordered, deduplicated sequence of extracted headlines.
pub type ExtractionResult = Vec<HeadlineRecord>;

/// Serializable envelope for the JSON report.
#[derive(Debug, Deserialize, Serialize)]
pub struct HeadlineReport {
    pub metadata: ReportMetadata,
    pub headlines: Vec<HeadlineRecord>,
}

/// Report provenance: where the headlines came from and when.
#[derive(Debug, Deserialize, Serialize)]
pub struct ReportMetadata {
    /// RFC-3339 local timestamp of report generation.
    pub generated_at: String,
    /// The URL the document was fetched from.
    pub source: String,
    /// Number of headlines in the report.
    pub total_headlines: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fetched(url: &str, content_type: Option<&str>) -> FetchResult {
        FetchResult {
            url: Url::parse(url).unwrap(),
            body: String::new(),
            content_type: content_type.map(|s| s.to_string()),
        }
    }

    #[test]
    fn test_feed_detection_by_content_type() {
        assert!(fetched("https://example.com/f", Some("application/rss+xml")).looks_like_feed());
        assert!(fetched("https://example.com/f", Some("text/xml; charset=utf-8")).looks_like_feed());
        assert!(!fetched("https://example.com/f", Some("text/html")).looks_like_feed());
    }

    #[test]
    fn test_feed_detection_by_url_when_no_content_type() {
        assert!(fetched("https://feeds.bbci.co.uk/news/rss.xml", None).looks_like_feed());
        assert!(fetched("https://example.com/feed", None).looks_like_feed());
        assert!(!fetched("https://example.com/news", None).looks_like_feed());
    }

    #[test]
    fn test_html_content_type_wins_over_url_hint() {
        // A page served as text/html is scraped as HTML even if the path says rss.
        assert!(!fetched("https://example.com/rss-guide", Some("text/html")).looks_like_feed());
    }

    #[test]
    fn test_record_serialization_skips_empty_fields() {
        let record = HeadlineRecord::text_only("Markets rally today");
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("Markets rally today"));
        assert!(!json.contains("link"));
        assert!(!json.contains("description"));
    }

    #[test]
    fn test_report_round_trip() {
        let report = HeadlineReport {
            metadata: ReportMetadata {
                generated_at: "2025-05-06T08:00:00Z".to_string(),
                source: "https://example.com/news".to_string(),
                total_headlines: 1,
            },
            headlines: vec![HeadlineRecord {
                title: "Breaking News".to_string(),
                link: Some("https://example.com/a/b".to_string()),
                description: None,
                published: None,
            }],
        };

        let json = serde_json::to_string(&report).unwrap();
        let back: HeadlineReport = serde_json::from_str(&json).unwrap();
        assert_eq!(back.metadata.total_headlines, 1);
        assert_eq!(back.headlines[0].title, "Breaking News");
        assert_eq!(
            back.headlines[0].link.as_deref(),
            Some("https://example.com/a/b")
        );
    }
}
