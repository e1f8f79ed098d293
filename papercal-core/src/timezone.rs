//! Pure UTC-to-local conversion for feed timestamps.

use chrono::{NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

/// Convert literal UTC date/time fields into wall-clock fields in `tz`.
///
/// Returns `None` when the fields do not name a real UTC instant. DST is
/// resolved by chrono-tz for the target date; no process-wide timezone
/// state is read or written.
pub fn utc_to_local(
    year: i32,
    month: u32,
    day: u32,
    hour: u32,
    minute: u32,
    tz: Tz,
) -> Option<(NaiveDate, NaiveTime)> {
    let utc = Utc
        .with_ymd_and_hms(year, month, day, hour, minute, 0)
        .single()?;
    let local = utc.with_timezone(&tz);
    Some((local.date_naive(), local.time()))
}
