//! Date arithmetic used by the phrase interpreter.
//!
//! Everything is relative to an injected `now`; nothing here reads a clock.

use chrono::{
    DateTime, Duration, FixedOffset, LocalResult, NaiveTime, Offset, TimeZone, Weekday,
};

/// Days from `from` until the next `target`, always in 1..=7.
/// Naming today's weekday means the same weekday next week.
pub fn days_until(from: Weekday, target: Weekday) -> i64 {
    let diff = (target.num_days_from_monday() as i64 - from.num_days_from_monday() as i64)
        .rem_euclid(7);
    if diff == 0 {
        7
    } else {
        diff
    }
}

/// Convert a matched clock reading to a time of day.
///
/// With a meridiem the hour must be 1..=12 (`12am` is midnight, `12pm` is
/// noon); without one it is read as a 24-hour value. Returns `None` for
/// readings that are not valid times.
pub fn clock_time(hour: u32, minute: u32, meridiem: Option<&str>) -> Option<NaiveTime> {
    let hour = match meridiem.map(str::to_ascii_lowercase).as_deref() {
        Some("pm") if (1..=12).contains(&hour) => {
            if hour == 12 {
                12
            } else {
                hour + 12
            }
        }
        Some("am") if (1..=12).contains(&hour) => {
            if hour == 12 {
                0
            } else {
                hour
            }
        }
        Some(_) => return None,
        None => hour,
    };
    NaiveTime::from_hms_opt(hour, minute, 0)
}

/// The wall-clock moment `days` calendar days after `now`, at `time` or at
/// `now`'s own time of day.
///
/// The result carries the offset in force on the target day in `now`'s zone,
/// so a due date across a DST change keeps its local time. A wall time that
/// falls in a forward gap is read with the offset from before the gap; an
/// ambiguous one resolves to the earlier instant. Returns `None` only when
/// the target date is out of range.
pub fn local_due<Tz: TimeZone>(
    now: &DateTime<Tz>,
    days: i64,
    time: Option<NaiveTime>,
) -> Option<DateTime<FixedOffset>> {
    let local = now.naive_local();
    let date = local.date().checked_add_signed(Duration::try_days(days)?)?;
    let wall = date.and_time(time.unwrap_or_else(|| local.time()));
    let tz = now.timezone();
    match tz.from_local_datetime(&wall) {
        LocalResult::Single(at) | LocalResult::Ambiguous(at, _) => Some(at.fixed_offset()),
        LocalResult::None => {
            let before = tz
                .offset_from_utc_datetime(&wall.checked_sub_signed(Duration::days(1))?)
                .fix();
            before.from_local_datetime(&wall).single()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_weekday_rolls_forward_a_week() {
        assert_eq!(days_until(Weekday::Wed, Weekday::Wed), 7);
        assert_eq!(days_until(Weekday::Wed, Weekday::Thu), 1);
        assert_eq!(days_until(Weekday::Wed, Weekday::Tue), 6);
        assert_eq!(days_until(Weekday::Sun, Weekday::Mon), 1);
    }

    #[test]
    fn twelve_hour_conversion() {
        assert_eq!(clock_time(5, 0, Some("pm")), NaiveTime::from_hms_opt(17, 0, 0));
        assert_eq!(clock_time(12, 30, Some("PM")), NaiveTime::from_hms_opt(12, 30, 0));
        assert_eq!(clock_time(12, 0, Some("am")), NaiveTime::from_hms_opt(0, 0, 0));
        assert_eq!(clock_time(9, 15, Some("am")), NaiveTime::from_hms_opt(9, 15, 0));
        assert_eq!(clock_time(13, 0, Some("pm")), None);
        assert_eq!(clock_time(0, 0, Some("am")), None);
    }

    #[test]
    fn twenty_four_hour_readings() {
        assert_eq!(clock_time(18, 45, None), NaiveTime::from_hms_opt(18, 45, 0));
        assert_eq!(clock_time(24, 0, None), None);
        assert_eq!(clock_time(9, 60, None), None);
    }

    #[test]
    fn due_keeps_offset_and_time_of_day() {
        let tz = FixedOffset::east_opt(2 * 3600).unwrap();
        let now = tz.with_ymd_and_hms(2024, 3, 8, 9, 41, 12).unwrap();
        let at = local_due(&now, 0, NaiveTime::from_hms_opt(17, 0, 0)).unwrap();
        assert_eq!(at, tz.with_ymd_and_hms(2024, 3, 8, 17, 0, 0).unwrap());
        assert_eq!(local_due(&now, 3, None), Some(now + Duration::days(3)));
    }

    #[test]
    fn absurd_day_counts_resolve_to_nothing() {
        let now = FixedOffset::east_opt(0)
            .unwrap()
            .with_ymd_and_hms(2024, 3, 8, 9, 0, 0)
            .unwrap();
        assert_eq!(local_due(&now, i64::MAX, None), None);
    }
}
