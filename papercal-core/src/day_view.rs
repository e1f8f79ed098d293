//! Day bucketing for the rolling agenda window.

use chrono::{Datelike, Days, NaiveDate, Weekday};

use crate::store::EventStore;

/// One day of the agenda window: the date plus indices into the current
/// store snapshot, in store (already time-sorted) order.
///
/// Rebuilt on every render pass and never kept across a store rebuild.
#[derive(Debug, Clone)]
pub struct DayView {
    pub date: NaiveDate,
    pub weekday: Weekday,
    pub indices: Vec<usize>,
}

impl DayView {
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

/// Bucket the store into `days` consecutive calendar days starting at
/// `start`.
///
/// An event lands only under its exact start date; multi-day events are
/// never split, and events outside the window appear in no bucket.
pub fn build_day_views(store: &EventStore, start: NaiveDate, days: usize) -> Vec<DayView> {
    (0..days as u64)
        .filter_map(|offset| start.checked_add_days(Days::new(offset)))
        .map(|date| DayView {
            date,
            weekday: date.weekday(),
            indices: store
                .events()
                .iter()
                .enumerate()
                .filter(|(_, event)| event.date == date)
                .map(|(index, _)| index)
                .collect(),
        })
        .collect()
}
