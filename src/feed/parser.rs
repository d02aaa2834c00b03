use chrono::{DateTime, Utc};
use feed_rs::parser;

/// One entry lifted out of a feed document, fields trimmed and defaulted but
/// not yet de-duplicated.
#[derive(Debug, Clone)]
pub struct RawEntry {
    pub title: String,
    pub link: String,
    pub published: Option<DateTime<Utc>>,
    pub summary: String,
}

/// Outcome of parsing one feed document.
pub struct ParsedPage {
    pub entries: Vec<RawEntry>,
    /// True when the document was not strictly well-formed. Parsing is
    /// best-effort: a malformed page yields whatever was recoverable (with
    /// feed-rs that is no entries) and this flag, never an error.
    pub malformed: bool,
}

/// Parses a feed document into raw entries.
///
/// Field extraction:
/// - title: trimmed, empty string if absent
/// - link: first link href, trimmed, empty string if absent
/// - summary: the summary field, falling back to the content body, trimmed
/// - published: the entry's publication date as parsed by feed-rs
///   (normalized to UTC; dates without an offset are treated as UTC)
pub fn parse_page(bytes: &[u8]) -> ParsedPage {
    let feed = match parser::parse(bytes) {
        Ok(feed) => feed,
        Err(e) => {
            tracing::debug!(error = %e, "Feed document rejected by parser");
            return ParsedPage {
                entries: Vec::new(),
                malformed: true,
            };
        }
    };

    let entries = feed
        .entries
        .into_iter()
        .map(|entry| {
            let link = entry
                .links
                .first()
                .map(|l| l.href.trim().to_string())
                .unwrap_or_default();
            let published = entry.published;
            let title = entry
                .title
                .map(|t| t.content.trim().to_string())
                .unwrap_or_default();
            let summary = entry
                .summary
                .map(|s| s.content)
                .or_else(|| entry.content.and_then(|c| c.body))
                .map(|s| s.trim().to_string())
                .unwrap_or_default();

            RawEntry {
                title,
                link,
                published,
                summary,
            }
        })
        .collect();

    ParsedPage {
        entries,
        malformed: false,
    }
}
