//! Recurrence policies — pure functions from "previous due time" to
//! "next due time". Only recurring event kinds use them.
//!
//! Two rules exist and both must cope with the process having been
//! down across occurrences:
//! - Yearly (birthdays): +1 calendar year, with a 24-hour grace
//!   window so a birthday that started earlier today is not skipped
//!   to next year on restart.
//! - Weekly (boss parties): +7 days, catching up over missed weeks so
//!   a long outage schedules exactly one upcoming occurrence instead
//!   of a burst of stale reminders.

use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Utc};
use guildclaw_core::types::{BirthdayRecord, Record, Recurrence};

/// Hours a just-passed yearly instant stays "current" before rolling
/// to next year. Keeps "birthday is today" discoverable on restart.
pub const YEARLY_GRACE_HOURS: i64 = 24;

/// Next due time for a recurring kind that just fired at `previous`.
///
/// Yearly kinds re-anchor on the record's stored month/day every
/// cycle, so a Feb 29 birthday clamped to Feb 28 in a common year
/// returns to Feb 29 in the next leap year instead of drifting.
pub fn next_occurrence(
    rule: Recurrence,
    previous: DateTime<Utc>,
    record: &Record,
    now: DateTime<Utc>,
) -> DateTime<Utc> {
    match rule {
        Recurrence::Weekly => roll_forward_weekly(previous + Duration::days(7), now),
        Recurrence::Yearly => match record {
            Record::Birthday(r) => next_yearly_from_record(r, previous, now)
                .unwrap_or_else(|| roll_forward_yearly(add_year(previous), now)),
            _ => roll_forward_yearly(add_year(previous), now),
        },
    }
}

/// Next yearly occurrence re-derived from the record. Finds the cycle
/// year `previous` belongs to (the anchor nearest it, since the reset
/// offset can push an instant across a year boundary), keeps the
/// event's offset from that anchor, and advances year by year.
fn next_yearly_from_record(
    record: &BirthdayRecord,
    previous: DateTime<Utc>,
    now: DateTime<Utc>,
) -> Option<DateTime<Utc>> {
    let base_year = previous.year();
    let (anchor_year, anchor) = (base_year - 1..=base_year + 1)
        .filter_map(|y| {
            birthday_nominal_clamped(y, record.month, record.day, record.reset_offset_hours)
                .map(|n| (y, n))
        })
        .min_by_key(|(_, n)| (previous - *n).abs())?;
    // 0 for a start edge, +24h for an end edge.
    let delta = previous - anchor;

    let mut year = anchor_year;
    loop {
        year += 1;
        if let Some(next_anchor) =
            birthday_nominal_clamped(year, record.month, record.day, record.reset_offset_hours)
        {
            let due = next_anchor + delta;
            if now - due <= Duration::hours(YEARLY_GRACE_HOURS) {
                return Some(due);
            }
        }
    }
}

/// Same instant one calendar year later, preserving month, day, and
/// time of day. Feb 29 clamps to Feb 28 on non-leap years.
pub fn add_year(ts: DateTime<Utc>) -> DateTime<Utc> {
    let date = ts.date_naive();
    let year = date.year() + 1;
    let next = NaiveDate::from_ymd_opt(year, date.month(), date.day())
        .or_else(|| NaiveDate::from_ymd_opt(year, 2, 28));
    match next {
        Some(d) => Utc.from_utc_datetime(&d.and_time(ts.time())),
        None => ts + Duration::days(365),
    }
}

/// Roll a yearly instant forward until it is either in the future or
/// within the 24-hour grace window behind `now`.
pub fn roll_forward_yearly(mut due: DateTime<Utc>, now: DateTime<Utc>) -> DateTime<Utc> {
    while now - due > Duration::hours(YEARLY_GRACE_HOURS) {
        due = add_year(due);
    }
    due
}

/// Roll a weekly instant forward in 7-day steps until it is strictly
/// in the future. An outage spanning several intervals yields exactly
/// one occurrence in `(now, now + 7d]` — missed weeks are not
/// delivered late.
pub fn roll_forward_weekly(mut due: DateTime<Utc>, now: DateTime<Utc>) -> DateTime<Utc> {
    while due <= now {
        due += Duration::days(7);
    }
    due
}

/// Nominal birthday instant for a given year: UTC midnight of
/// month/day shifted by the guild's daily-reset offset. None for an
/// invalid month/day combination (including Feb 29 in non-leap
/// years, where the previous valid year still resolves).
pub fn birthday_nominal(
    year: i32,
    month: u32,
    day: u32,
    reset_offset_hours: i64,
) -> Option<DateTime<Utc>> {
    let date = NaiveDate::from_ymd_opt(year, month, day)?;
    let midnight = Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0)?);
    Some(midnight + Duration::hours(reset_offset_hours))
}

/// `birthday_nominal` with Feb 29 clamped to Feb 28 in non-leap
/// years. Still None for a genuinely invalid month/day.
pub fn birthday_nominal_clamped(
    year: i32,
    month: u32,
    day: u32,
    reset_offset_hours: i64,
) -> Option<DateTime<Utc>> {
    birthday_nominal(year, month, day, reset_offset_hours).or_else(|| {
        if month == 2 && day == 29 {
            birthday_nominal(year, 2, 28, reset_offset_hours)
        } else {
            None
        }
    })
}
