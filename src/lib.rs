//! dripfeed: a daily RSS-to-social pipeline.
//!
//! Fetches a news feed for yesterday (in a configured timezone), summarizes
//! each article into a short post via a generative-language API, spreads the
//! posts evenly across a daily publishing window, and hands them to a
//! scheduling API. Execution is strictly sequential; every network call runs
//! under one shared retry-with-backoff policy.

pub mod config;
pub mod content;
pub mod feed;
pub mod pipeline;
pub mod publish;
pub mod runlog;
pub mod schedule;
pub mod util;
