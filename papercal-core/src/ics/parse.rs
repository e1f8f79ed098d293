//! Lenient VEVENT block scanner for calendar feeds.
//!
//! This is deliberately not a full iCalendar parser. Feeds are scanned for
//! `BEGIN:VEVENT`/`END:VEVENT` pairs and only the SUMMARY, LOCATION,
//! DTSTART and DTEND properties are read out of each block. A missing or
//! malformed property leaves its field at the default instead of failing
//! the feed; an unterminated block ends the scan.

use chrono::{Datelike, NaiveDate, NaiveTime};
use chrono_tz::Tz;

use crate::event::CalendarEvent;
use crate::timezone::utc_to_local;

const BEGIN_MARKER: &str = "BEGIN:VEVENT";
const END_MARKER: &str = "END:VEVENT";

/// Result of scanning one feed: the events it yielded, and whether at
/// least one block produced an event (distinguishing an empty or
/// unusable feed from a productive one).
#[derive(Debug, Default)]
pub struct FeedBatch {
    pub events: Vec<CalendarEvent>,
    pub any_parsed: bool,
}

/// Scan `data` for event blocks, yielding at most `capacity` events.
///
/// Each block between the begin marker and the nearest end marker is
/// parsed independently. Scanning stops at the first unterminated block
/// and when `capacity` is reached, even if more blocks remain.
pub fn parse_events(data: &str, tz: Tz, capacity: usize) -> FeedBatch {
    let mut batch = FeedBatch::default();
    let mut pos = 0;

    while pos < data.len() && batch.events.len() < capacity {
        let Some(begin) = data[pos..].find(BEGIN_MARKER).map(|i| pos + i) else {
            break;
        };
        let Some(end) = data[begin..].find(END_MARKER).map(|i| begin + i) else {
            break;
        };

        if let Some(event) = parse_block(&data[begin..end], tz) {
            batch.events.push(event);
            batch.any_parsed = true;
        }
        pos = end + END_MARKER.len();
    }

    batch
}

/// Working state for one block's date/time fields.
#[derive(Default)]
struct EventDraft {
    date: Option<NaiveDate>,
    start: Option<NaiveTime>,
    end: Option<NaiveTime>,
    all_day: bool,
}

fn parse_block(body: &str, tz: Tz) -> Option<CalendarEvent> {
    let title = property_value(body, "SUMMARY:").unwrap_or_default();
    let location = property_value(body, "LOCATION:").unwrap_or_default();

    let mut draft = EventDraft::default();
    if let Some(line) = property_line(body, "DTSTART") {
        apply_date_time(&mut draft, line, false, tz);
    }
    if let Some(line) = property_line(body, "DTEND") {
        apply_date_time(&mut draft, line, true, tz);
    }

    // All-day events never carry clock times, even if the feed supplied a
    // timed DTEND alongside a date-only DTSTART.
    if draft.all_day {
        draft.start = None;
        draft.end = None;
    }

    // A block that yields no usable start date is dropped; every emitted
    // event is either all-day or has a start time.
    let date = draft.date?;
    Some(CalendarEvent {
        title,
        location,
        date,
        start: draft.start,
        end: draft.end,
        all_day: draft.all_day,
    })
}

/// Extract the value of a `NAME:` property: everything after the marker up
/// to the first line break, trimmed, with carriage returns stripped.
fn property_value(body: &str, marker: &str) -> Option<String> {
    let p = body.find(marker)?;
    let rest = &body[p + marker.len()..];
    let line = match rest.find('\n') {
        Some(q) => &rest[..q],
        None => rest,
    };
    Some(line.trim().replace('\r', ""))
}

/// Extract a whole property line (name, parameters and value) starting at
/// the first occurrence of `name`.
fn property_line<'a>(body: &'a str, name: &str) -> Option<&'a str> {
    let p = body.find(name)?;
    let rest = &body[p..];
    match rest.find('\n') {
        Some(q) => Some(&rest[..q]),
        None => Some(rest),
    }
}

/// What one DTSTART/DTEND property resolved to.
enum Resolved {
    /// Bare date (`VALUE=DATE` qualifier).
    DateOnly(NaiveDate),
    /// Naive local midnight, which some feeds use to encode all-day events.
    ImplicitAllDay(NaiveDate),
    /// Wall-clock date and time, already expressed in the target timezone.
    WallClock(NaiveDate, NaiveTime),
}

/// Resolve one property line and fold it into the draft.
///
/// The start side owns the event's date and all-day flag; the end side
/// only contributes a clock time. Date-only and implicit-all-day end
/// properties are ignored entirely (all-day events have no distinct end).
fn apply_date_time(draft: &mut EventDraft, line: &str, is_end: bool, tz: Tz) {
    let Some(resolved) = resolve_stamp(line, tz) else {
        return;
    };

    match resolved {
        Resolved::DateOnly(date) | Resolved::ImplicitAllDay(date) => {
            if !is_end {
                draft.date = Some(date);
                draft.all_day = true;
                draft.start = None;
                draft.end = None;
            }
        }
        Resolved::WallClock(date, time) => {
            if is_end {
                draft.end = Some(time);
            } else {
                draft.date = Some(date);
                draft.start = Some(time);
            }
        }
    }
}

/// Parse one DTSTART/DTEND line into a resolved stamp.
///
/// Three value shapes are recognised, selected by the `VALUE=DATE`
/// qualifier and the trailing `Z` marker:
/// - `;VALUE=DATE:YYYYMMDD` — a bare date;
/// - `:YYYYMMDDTHHMMSS` — naive wall-clock, taken literally as already
///   being in the target timezone (a TZID parameter is not interpreted);
/// - `:YYYYMMDDTHHMMSSZ` — UTC, converted into the target timezone.
///
/// Values too short to hold a full date or time resolve to `None`.
fn resolve_stamp(line: &str, tz: Tz) -> Option<Resolved> {
    let colon = line.find(':')?;
    let head = &line[..colon];
    let value = line[colon + 1..].trim().replace('\r', "");

    if head.contains("VALUE=DATE") {
        return parse_ymd(&value).map(Resolved::DateOnly);
    }

    let t_pos = value.find('T')?;
    if value.len() < 15 {
        return None;
    }
    let has_utc_marker = value.ends_with('Z');

    let date = parse_ymd(&value)?;
    let time_part = &value[t_pos + 1..];
    let time_part = time_part.strip_suffix('Z').unwrap_or(time_part).trim();
    let (hour, minute) = parse_hm(time_part)?;

    if !has_utc_marker && hour == 0 && minute == 0 {
        return Some(Resolved::ImplicitAllDay(date));
    }

    if !has_utc_marker {
        let time = NaiveTime::from_hms_opt(hour, minute, 0)?;
        return Some(Resolved::WallClock(date, time));
    }

    utc_to_local(date.year(), date.month(), date.day(), hour, minute, tz)
        .map(|(local_date, local_time)| Resolved::WallClock(local_date, local_time))
}

/// Parse the leading `YYYYMMDD` of a value.
fn parse_ymd(value: &str) -> Option<NaiveDate> {
    let bytes = value.as_bytes();
    if bytes.len() < 8 || !bytes[..8].iter().all(u8::is_ascii_digit) {
        return None;
    }
    let year = value[..4].parse().ok()?;
    let month = value[4..6].parse().ok()?;
    let day = value[6..8].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Parse the leading `HHMM` of a time part.
fn parse_hm(value: &str) -> Option<(u32, u32)> {
    let bytes = value.as_bytes();
    if bytes.len() < 4 || !bytes[..4].iter().all(u8::is_ascii_digit) {
        return None;
    }
    let hour = value[..2].parse().ok()?;
    let minute = value[2..4].parse().ok()?;
    Some((hour, minute))
}
