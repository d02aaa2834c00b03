//! Publishing: handing finished drafts to the scheduling API.
//!
//! The pipeline depends on the narrow [`Publish`] capability; the
//! Typefully-backed implementation lives in [`typefully`].

mod typefully;

pub use typefully::{PublishError, TypefullyClient};

use chrono::DateTime;
use chrono_tz::Tz;

/// A generated post paired with its target publish time, not yet confirmed
/// published.
#[derive(Debug, Clone, PartialEq)]
pub struct Draft {
    pub content: String,
    pub schedule_date: DateTime<Tz>,
}

/// Capability to schedule one draft, returning the service's identifier.
///
/// Callers run on a current-thread runtime; futures need not be `Send`.
#[allow(async_fn_in_trait)]
pub trait Publish {
    async fn publish(&self, draft: &Draft) -> Result<String, PublishError>;
}
