//! The calendar event model shared by the parser, store and renderer.

use std::cmp::Ordering;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

/// A single, non-recurring calendar event.
///
/// All-day events carry no clock times at all; timed events always have a
/// start and may have an end. Absent times are `None` rather than a
/// sentinel hour, and `Option`'s `None < Some` ordering keeps all-day
/// events first on their date when sorting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub title: String,
    pub location: String,
    pub date: NaiveDate,
    pub start: Option<NaiveTime>,
    pub end: Option<NaiveTime>,
    pub all_day: bool,
}

impl CalendarEvent {
    /// Sort key: date first, then start time.
    fn sort_key(&self) -> (NaiveDate, Option<NaiveTime>) {
        (self.date, self.start)
    }
}

impl Ord for CalendarEvent {
    fn cmp(&self, other: &Self) -> Ordering {
        self.sort_key().cmp(&other.sort_key())
    }
}

impl PartialOrd for CalendarEvent {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
