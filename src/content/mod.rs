//! Content generation: turning feed items into short social posts.
//!
//! The pipeline only depends on the narrow [`Summarize`] capability; the
//! Gemini-backed implementation lives in [`gemini`] and can be swapped for a
//! test double.

mod gemini;

pub use gemini::{ContentError, GeminiClient};

use crate::feed::FeedItem;
use crate::util::truncate_chars;

/// Source summaries longer than this are cut to 497 characters plus an
/// ellipsis before prompting.
pub const MAX_SUMMARY_CHARS: usize = 500;

/// Structured prompt for one article.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryRequest {
    pub title: String,
    pub summary: String,
    pub link: String,
}

impl SummaryRequest {
    /// Builds the prompt input for one item, capping oversized summaries.
    pub fn from_item(item: &FeedItem) -> Self {
        Self {
            title: item.title.trim().to_string(),
            summary: truncate_chars(item.summary.trim(), MAX_SUMMARY_CHARS).into_owned(),
            link: item.link.clone(),
        }
    }
}

/// Capability to generate a short post for one article.
///
/// The pipeline never constructs its implementation. It is injected, so
/// tests substitute a double.
///
/// Callers run on a current-thread runtime; futures need not be `Send`.
#[allow(async_fn_in_trait)]
pub trait Summarize {
    async fn summarize(&self, request: &SummaryRequest) -> Result<String, ContentError>;
}
