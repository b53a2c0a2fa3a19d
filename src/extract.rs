//! Selector-based headline extraction from HTML documents.
//!
//! Selectors are tried in list order, and within a selector matches are taken
//! in document order; that ordering, not any relevance ranking, determines the
//! output order. Matched text is whitespace-normalized, filtered by a minimum
//! length, and deduplicated case-insensitively (first-seen casing kept). When
//! a matched element carries or sits near an anchor, its `href` is resolved to
//! an absolute link against the document URL.
//!
//! If no selector matches any element at all, extraction degrades to a single
//! record taken from the document `<title>`. Matches that were filtered out
//! (by the length floor or dedup) still count as matches and suppress the
//! fallback.

use crate::models::{ExtractionResult, HeadlineRecord};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use tracing::{debug, info, instrument, warn};
use url::Url;

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Tuning knobs for one extraction pass.
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    /// CSS selectors, in priority order.
    pub selectors: Vec<String>,
    /// Records with fewer normalized characters than this are skipped.
    pub min_title_len: usize,
    /// Hard cap on accepted records; extraction stops once reached.
    pub max_records: Option<usize>,
    /// Drop records for which no valid absolute link resolves.
    pub require_links: bool,
}

/// Collapse internal whitespace runs to single spaces and trim the ends.
pub fn normalize_text(raw: &str) -> String {
    WHITESPACE.replace_all(raw.trim(), " ").into_owned()
}

/// Extract headlines from an HTML document fetched from `base`.
///
/// HTML parsing is lenient and never fails; a document with no usable
/// structure simply yields an empty result.
#[instrument(level = "info", skip_all, fields(base = %base))]
pub fn extract_headlines(body: &str, base: &Url, opts: &ExtractOptions) -> ExtractionResult {
    let document = Html::parse_document(body);
    let mut records: ExtractionResult = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();
    let mut matched_any = false;

    for raw_selector in &opts.selectors {
        let selector = match Selector::parse(raw_selector) {
            Ok(s) => s,
            Err(e) => {
                warn!(selector = %raw_selector, error = %e, "Skipping invalid selector");
                continue;
            }
        };

        for element in document.select(&selector) {
            matched_any = true;

            let text = element.text().collect::<Vec<_>>().join(" ");
            let title = normalize_text(&text);
            if title.is_empty() || title.chars().count() < opts.min_title_len {
                continue;
            }

            let key = title.to_lowercase();
            if seen.contains(&key) {
                continue;
            }

            let link = resolve_link(&element, base);
            if opts.require_links && link.is_none() {
                debug!(%title, "Dropping record with no resolvable link");
                continue;
            }

            seen.insert(key);
            records.push(HeadlineRecord {
                title,
                link,
                description: None,
                published: None,
            });

            if let Some(max) = opts.max_records {
                if records.len() >= max {
                    info!(count = records.len(), "Reached record cap; stopping extraction");
                    return records;
                }
            }
        }
    }

    // Degrade to the page title only when no selector matched anything.
    if !matched_any {
        if let Some(title) = page_title(&document) {
            debug!(%title, "No selector matched; falling back to document title");
            records.push(HeadlineRecord::text_only(title));
        }
    }

    info!(count = records.len(), "Extracted headlines");
    records
}

fn page_title(document: &Html) -> Option<String> {
    let selector = Selector::parse("title").unwrap();
    let element = document.select(&selector).next()?;
    let title = normalize_text(&element.text().collect::<Vec<_>>().join(" "));
    (!title.is_empty()).then_some(title)
}

/// Find the link for a matched element: the element itself if it is an anchor,
/// otherwise the nearest ancestor anchor, otherwise the first descendant
/// anchor. The href is resolved against `base`; only absolute `http`/`https`
/// results are kept.
fn resolve_link(element: &ElementRef, base: &Url) -> Option<String> {
    let anchor_selector = Selector::parse("a").unwrap();

    let href = if element.value().name() == "a" {
        element.value().attr("href")
    } else if let Some(ancestor) = nearest_ancestor_anchor(element) {
        ancestor.value().attr("href")
    } else {
        element
            .select(&anchor_selector)
            .next()
            .and_then(|a| a.value().attr("href"))
    }?;

    let resolved = base.join(href).ok()?;
    match resolved.scheme() {
        "http" | "https" => Some(resolved.to_string()),
        _ => None,
    }
}

fn nearest_ancestor_anchor<'a>(element: &ElementRef<'a>) -> Option<ElementRef<'a>> {
    let mut current = element.parent();
    while let Some(node) = current {
        if let Some(el) = ElementRef::wrap(node) {
            if el.value().name() == "a" {
                return Some(el);
            }
        }
        current = node.parent();
    }
    None
}
