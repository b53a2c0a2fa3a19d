//! RSS/Atom feed extraction.
//!
//! Feed documents carry one record per `<item>` (RSS) or `<entry>` (Atom)
//! with explicit title, description, link, and publication-date fields, so no
//! CSS selectors are involved. Titles are whitespace-normalized and
//! deduplicated case-insensitively the same way the HTML path does it; unlike
//! the HTML path there is no length floor, only a non-empty-title requirement.
//!
//! A document that is not recognizable as a feed (or is malformed XML) is a
//! [`ScrapeError::Parse`]; the orchestrator degrades that to an empty result.

use crate::error::ScrapeError;
use crate::extract::normalize_text;
use crate::models::{ExtractionResult, HeadlineRecord};
use quick_xml::Reader;
use quick_xml::events::Event;
use std::collections::HashSet;
use tracing::{info, instrument};

/// Which entry field text events currently belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Title,
    Description,
    Link,
    Published,
}

#[derive(Debug, Default)]
struct Entry {
    title: String,
    description: String,
    link: String,
    published: String,
}

impl Entry {
    fn into_record(self) -> Option<HeadlineRecord> {
        let title = normalize_text(&self.title);
        if title.is_empty() {
            return None;
        }
        let clean = |s: String| {
            let s = normalize_text(&s);
            (!s.is_empty()).then_some(s)
        };
        Some(HeadlineRecord {
            title,
            link: clean(self.link),
            description: clean(self.description),
            published: clean(self.published),
        })
    }
}

/// Extract per-entry records from an RSS or Atom document.
///
/// Entries appear in document order; duplicate titles (case-insensitive,
/// whitespace-normalized) keep only the first occurrence, and `max_records`
/// stops processing once reached.
#[instrument(level = "info", skip_all)]
pub fn extract_feed(body: &str, max_records: Option<usize>) -> Result<ExtractionResult, ScrapeError> {
    let mut reader = Reader::from_str(body);

    let mut records: ExtractionResult = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();
    let mut saw_feed_root = false;
    let mut entry: Option<Entry> = None;
    let mut field: Option<Field> = None;

    loop {
        match reader.read_event().map_err(ScrapeError::parse)? {
            Event::Start(e) => {
                let name = e.local_name();
                match name.as_ref() {
                    b"rss" | b"feed" | b"channel" | b"RDF" => saw_feed_root = true,
                    b"item" | b"entry" => entry = Some(Entry::default()),
                    _ if entry.is_some() => {
                        field = field_for(name.as_ref());
                        // Atom links carry the URL in an href attribute.
                        if field == Some(Field::Link) {
                            if let Some(href) = href_attr(&e) {
                                if let Some(en) = entry.as_mut() {
                                    en.link = href;
                                }
                            }
                        }
                    }
                    _ => {}
                }
            }
            Event::Empty(e) => {
                if entry.is_some() && e.local_name().as_ref() == b"link" {
                    if let Some(href) = href_attr(&e) {
                        if let Some(en) = entry.as_mut() {
                            en.link = href;
                        }
                    }
                }
            }
            Event::Text(t) => {
                if let (Some(en), Some(f)) = (entry.as_mut(), field) {
                    let text = t.unescape().map_err(ScrapeError::parse)?;
                    push_field(en, f, &text);
                }
            }
            Event::CData(t) => {
                if let (Some(en), Some(f)) = (entry.as_mut(), field) {
                    let raw = t.into_inner();
                    push_field(en, f, &String::from_utf8_lossy(&raw));
                }
            }
            Event::End(e) => {
                let name = e.local_name();
                match name.as_ref() {
                    b"item" | b"entry" => {
                        field = None;
                        if let Some(record) = entry.take().and_then(Entry::into_record) {
                            let key = record.title.to_lowercase();
                            if seen.insert(key) {
                                records.push(record);
                                if let Some(max) = max_records {
                                    if records.len() >= max {
                                        info!(count = records.len(), "Reached record cap in feed");
                                        return Ok(records);
                                    }
                                }
                            }
                        }
                    }
                    _ => {
                        if field_for(name.as_ref()) == field {
                            field = None;
                        }
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !saw_feed_root {
        return Err(ScrapeError::parse(
            "document has no RSS or Atom feed structure",
        ));
    }

    info!(count = records.len(), "Extracted feed entries");
    Ok(records)
}

fn field_for(name: &[u8]) -> Option<Field> {
    match name {
        b"title" => Some(Field::Title),
        b"description" | b"summary" => Some(Field::Description),
        b"link" => Some(Field::Link),
        b"pubDate" | b"published" | b"updated" | b"date" => Some(Field::Published),
        _ => None,
    }
}

fn push_field(entry: &mut Entry, field: Field, text: &str) {
    let target = match field {
        Field::Title => &mut entry.title,
        Field::Description => &mut entry.description,
        Field::Link => &mut entry.link,
        Field::Published => &mut entry.published,
    };
    if !target.is_empty() {
        target.push(' ');
    }
    target.push_str(text);
}

fn href_attr(e: &quick_xml::events::BytesStart) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.as_ref() == b"href")
        .and_then(|a| a.unescape_value().ok())
        .map(|v| v.into_owned())
}
