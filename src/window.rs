//! Recency window over effective timestamps.

use chrono::{DateTime, Duration, NaiveDate, Utc};

use crate::error::TriageError;
use crate::model::OpinionItem;
use crate::normalize::platforms::source_offset;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    window: Duration,
}

impl TimeWindow {
    pub fn new(window: Duration) -> Self {
        Self { window }
    }

    /// Positive hour count that fits a `Duration`.
    pub fn hours(hours: i64) -> Result<Self, TriageError> {
        Duration::try_hours(hours)
            .filter(|d| *d > Duration::zero())
            .map(Self::new)
            .ok_or(TriageError::InvalidWindow { hours })
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Passes iff `now - effective <= window`. Future timestamps always pass.
    pub fn contains(&self, item: &OpinionItem, now: DateTime<Utc>) -> bool {
        now.signed_duration_since(item.effective_timestamp()) <= self.window
    }

    pub fn annotate(&self, item: &mut OpinionItem, now: DateTime<Utc>) {
        item.is_in_time_window = self.contains(item, now);
    }
}

/// Items whose effective timestamp falls on `date` in the source zone (UTC+08:00).
pub fn on_date(items: &[OpinionItem], date: NaiveDate) -> Vec<&OpinionItem> {
    let tz = source_offset();
    items
        .iter()
        .filter(|it| it.effective_timestamp().with_timezone(&tz).date_naive() == date)
        .collect()
}
