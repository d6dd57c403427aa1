//! Auto-focus schedule window evaluation.

use chrono::{Datelike, NaiveDateTime, NaiveTime, Timelike};

use crate::settings::ScheduleConfig;

/// Is the auto-focus window active at `now` (local clock time)?
///
/// Active iff the schedule is enabled, `now`'s day of week (0 = Sunday) is
/// in `days`, and the time of day falls within `[start, end)`. An end at or
/// before the start wraps past midnight: 22:00-06:00 covers 23:00 and
/// 05:59 but not 12:00.
pub fn is_active(config: &ScheduleConfig, now: NaiveDateTime) -> bool {
    if !config.enabled {
        return false;
    }
    let day = now.weekday().num_days_from_sunday() as u8;
    if !config.days.contains(&day) {
        return false;
    }
    let (Some(start), Some(end)) = (
        parse_hhmm(&config.start_time),
        parse_hhmm(&config.end_time),
    ) else {
        // A window that cannot be parsed is treated as inactive.
        return false;
    };

    let minute = now.hour() * 60 + now.minute();
    if end <= start {
        minute >= start || minute < end
    } else {
        minute >= start && minute < end
    }
}

/// Parse "HH:MM" into minutes since midnight.
fn parse_hhmm(value: &str) -> Option<u32> {
    let t = NaiveTime::parse_from_str(value, "%H:%M").ok()?;
    Some(t.hour() * 60 + t.minute())
}
