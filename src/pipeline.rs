//! The daily run: fetch → filter → sort → schedule → summarize → publish →
//! log, strictly in that order and strictly sequential.

use crate::config::Settings;
use crate::content::{Summarize, SummaryRequest};
use crate::feed::{fetch_feed, filter_items_for_date};
use crate::publish::{Draft, Publish};
use crate::runlog::write_daily_log;
use crate::schedule::build_schedule;
use anyhow::{Context, Result};
use chrono::{Duration, NaiveDate, NaiveTime, Utc};
use std::path::PathBuf;

/// Outcome of one pipeline run.
#[derive(Debug)]
pub struct RunReport {
    pub target_date: NaiveDate,
    pub drafts: Vec<Draft>,
    /// Identifiers returned by the publisher; empty on a dry run.
    pub draft_ids: Vec<String>,
    /// Absent when the run was a no-op (nothing to schedule).
    pub log_path: Option<PathBuf>,
}

/// Local window the day's posts are spread across.
fn schedule_window() -> (NaiveTime, NaiveTime) {
    // Literals are always valid.
    (
        NaiveTime::from_hms_opt(2, 0, 0).unwrap(),
        NaiveTime::from_hms_opt(23, 0, 0).unwrap(),
    )
}

/// Runs the pipeline for yesterday's articles.
///
/// The summarizer and publisher are injected so tests can substitute
/// doubles. Items are processed in published-time ascending order and
/// drafts pair with schedule slots strictly by position. Any summarization
/// or publishing failure aborts the run; a gap in the published schedule
/// is worse than a full stop.
pub async fn run<S, P>(
    client: &reqwest::Client,
    settings: &Settings,
    summarizer: &S,
    publisher: &P,
) -> Result<RunReport>
where
    S: Summarize,
    P: Publish,
{
    let tz = settings.timezone;
    let run_now = Utc::now().with_timezone(&tz);
    let target_date = (run_now - Duration::days(1)).date_naive();
    tracing::info!(date = %target_date, timezone = %tz, "Starting daily run");

    let items = fetch_feed(
        client,
        &settings.feed_url,
        settings.max_attempts,
        settings.max_feed_pages,
    )
    .await
    .context("Failed to fetch feed")?;

    let mut selected = filter_items_for_date(&items, target_date, tz);
    selected.sort_by_key(|item| item.published);

    if selected.is_empty() {
        tracing::info!(date = %target_date, "No items found for target date");
        return Ok(RunReport {
            target_date,
            drafts: Vec::new(),
            draft_ids: Vec::new(),
            log_path: None,
        });
    }

    let (window_start, window_end) = schedule_window();
    let slots = build_schedule(
        selected.len(),
        run_now.date_naive(),
        tz,
        window_start,
        Some(window_end),
    )
    .context("Failed to build schedule")?;

    if let (Some(first), Some(last)) = (slots.first(), slots.last()) {
        tracing::info!(
            count = slots.len(),
            first = %first.scheduled_at,
            last = %last.scheduled_at,
            "Built publishing schedule"
        );
    }

    let mut drafts = Vec::with_capacity(selected.len());
    for (item, slot) in selected.iter().zip(&slots) {
        let request = SummaryRequest::from_item(item);
        let content = summarizer
            .summarize(&request)
            .await
            .with_context(|| format!("Summarization failed for {}", item.link))?;
        drafts.push(Draft {
            content,
            schedule_date: slot.scheduled_at,
        });
    }

    let mut draft_ids = Vec::new();
    if settings.dry_run {
        tracing::info!("Dry run enabled, skipping publishing");
    } else {
        for draft in &drafts {
            let id = publisher.publish(draft).await.with_context(|| {
                format!("Publishing failed for draft at {}", draft.schedule_date)
            })?;
            draft_ids.push(id);
        }
        tracing::info!(count = draft_ids.len(), "Scheduled drafts");
    }

    let log_path =
        write_daily_log(&settings.logs_dir, run_now, &drafts).context("Failed to write run log")?;

    Ok(RunReport {
        target_date,
        drafts,
        draft_ids,
        log_path: Some(log_path),
    })
}
