//! Bounded event store shared by all calendar sources.

use chrono_tz::Tz;

use crate::constants::DEFAULT_MAX_EVENTS;
use crate::event::CalendarEvent;
use crate::ics::parse_events;

/// Bounded, ordered collection of events, rebuilt on every ingestion cycle.
///
/// The capacity is shared across all sources: a first source that fills
/// the store starves later ones. Insertion past capacity is silently
/// refused; callers that care about truncation compare `len()` against
/// `capacity()`.
#[derive(Debug)]
pub struct EventStore {
    events: Vec<CalendarEvent>,
    capacity: usize,
}

impl Default for EventStore {
    fn default() -> Self {
        EventStore::new(DEFAULT_MAX_EVENTS)
    }
}

impl EventStore {
    pub fn new(capacity: usize) -> EventStore {
        EventStore {
            events: Vec::new(),
            capacity,
        }
    }

    /// Drop all events, starting a fresh ingestion cycle.
    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn events(&self) -> &[CalendarEvent] {
        &self.events
    }

    pub fn get(&self, index: usize) -> Option<&CalendarEvent> {
        self.events.get(index)
    }

    /// Parse one feed and append its events, up to the remaining shared
    /// capacity. Returns whether the feed yielded at least one event.
    pub fn ingest_feed(&mut self, data: &str, tz: Tz) -> bool {
        let remaining = self.capacity - self.events.len();
        let batch = parse_events(data, tz, remaining);
        let any_parsed = batch.any_parsed;
        self.events.extend(batch.events);
        any_parsed
    }

    /// Append an already-parsed batch, silently refusing past capacity.
    pub fn ingest(&mut self, batch: impl IntoIterator<Item = CalendarEvent>) {
        for event in batch {
            if self.events.len() >= self.capacity {
                break;
            }
            self.events.push(event);
        }
    }

    /// Sort the merged store by `(date, start)`, all-day first per date.
    ///
    /// Plain adjacent-swap (bubble) sort. The store tops out at a couple
    /// hundred entries and this runs once per refresh interval, and the
    /// adjacent-swap sort is stable: events with equal keys keep their
    /// ingestion order. Replacing it with a different algorithm changes
    /// that tie-breaking.
    pub fn sort(&mut self) {
        let n = self.events.len();
        if n < 2 {
            return;
        }
        for i in 0..n - 1 {
            for j in 0..n - 1 - i {
                if self.events[j] > self.events[j + 1] {
                    self.events.swap(j, j + 1);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};
    use chrono_tz::America::New_York;

    fn timed(title: &str, day: u32, hour: u32, minute: u32) -> CalendarEvent {
        CalendarEvent {
            title: title.to_string(),
            location: String::new(),
            date: NaiveDate::from_ymd_opt(2026, 8, day).unwrap(),
            start: NaiveTime::from_hms_opt(hour, minute, 0),
            end: None,
            all_day: false,
        }
    }

    fn all_day(title: &str, day: u32) -> CalendarEvent {
        CalendarEvent {
            title: title.to_string(),
            location: String::new(),
            date: NaiveDate::from_ymd_opt(2026, 8, day).unwrap(),
            start: None,
            end: None,
            all_day: true,
        }
    }

    #[test]
    fn test_merge_two_batches_and_sort() {
        let mut store = EventStore::new(10);
        store.ingest([timed("B", 11, 9, 0), timed("D", 12, 8, 0)]);
        store.ingest([all_day("A", 11), timed("C", 11, 14, 30)]);
        store.sort();

        let titles: Vec<&str> = store.events().iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, ["A", "B", "C", "D"]);

        let sorted = store
            .events()
            .windows(2)
            .all(|pair| pair[0] <= pair[1]);
        assert!(sorted, "Store must be non-decreasing after sort");
    }

    #[test]
    fn test_full_first_source_starves_the_second() {
        let mut store = EventStore::new(3);
        store.ingest([
            timed("1", 10, 9, 0),
            timed("2", 10, 10, 0),
            timed("3", 10, 11, 0),
        ]);
        store.ingest([timed("4", 10, 12, 0)]);

        assert_eq!(store.len(), 3);
        assert!(store.events().iter().all(|e| e.title != "4"));
    }

    #[test]
    fn test_ingest_feed_respects_remaining_capacity() {
        let ics = "BEGIN:VEVENT\nSUMMARY:One\nDTSTART:20260810T090000\nEND:VEVENT\n\
BEGIN:VEVENT\nSUMMARY:Two\nDTSTART:20260810T100000\nEND:VEVENT\n";

        let mut store = EventStore::new(3);
        store.ingest([timed("Seed", 9, 8, 0), timed("Seed2", 9, 9, 0)]);
        let any = store.ingest_feed(ics, New_York);

        assert!(any);
        assert_eq!(store.len(), 3, "Only one slot remained for the feed");
    }

    #[test]
    fn test_clear_starts_a_fresh_cycle_with_the_same_capacity() {
        let mut store = EventStore::new(2);
        store.ingest([timed("old", 10, 9, 0), timed("stale", 10, 10, 0)]);
        store.clear();

        assert!(store.is_empty());
        store.ingest([timed("new", 11, 9, 0)]);
        assert_eq!(store.len(), 1);
        assert_eq!(store.capacity(), 2);
    }

    #[test]
    fn test_sort_is_stable_for_equal_keys() {
        let mut store = EventStore::new(10);
        store.ingest([timed("first", 10, 9, 0), timed("second", 10, 9, 0)]);
        store.sort();

        assert_eq!(store.events()[0].title, "first");
        assert_eq!(store.events()[1].title, "second");
    }
}
