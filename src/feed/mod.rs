//! Feed ingestion: paginated fetching with de-duplication, best-effort
//! parsing, and date-windowed filtering.
//!
//! [`fetcher`] walks a feed page by page under the retry policy, [`parser`]
//! turns each document into normalized entries, and [`filter`] narrows the
//! collected items to one calendar date in a named timezone.

mod fetcher;
mod filter;
mod parser;

pub use fetcher::{fetch_feed, FetchError};
pub use filter::filter_items_for_date;

use chrono::{DateTime, Utc};

/// One normalized feed entry.
///
/// Immutable once constructed. `link` is the de-duplication key within a
/// fetch cycle; `published` is always stored in UTC.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedItem {
    pub title: String,
    pub link: String,
    pub published: DateTime<Utc>,
    pub summary: String,
}
