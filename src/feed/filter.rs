use crate::feed::FeedItem;
use chrono::NaiveDate;
use chrono_tz::Tz;

/// Keeps the items whose publication instant falls on `target_date` when
/// viewed in `tz`. Input order is preserved; inputs are not mutated.
pub fn filter_items_for_date(items: &[FeedItem], target_date: NaiveDate, tz: Tz) -> Vec<FeedItem> {
    let filtered: Vec<FeedItem> = items
        .iter()
        .filter(|item| item.published.with_timezone(&tz).date_naive() == target_date)
        .cloned()
        .collect();

    tracing::debug!(
        kept = filtered.len(),
        total = items.len(),
        date = %target_date,
        "Filtered items for target date"
    );
    filtered
}
