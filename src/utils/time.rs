use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, TimeZone, Timelike, Weekday};

/// Parse an `H:MM` or `HH:MM` string into a clock time
pub fn parse_clock(time_str: &str) -> Option<NaiveTime> {
    let (hour, minute) = time_str.trim().split_once(':')?;
    NaiveTime::from_hms_opt(clock_field(hour)?, clock_field(minute)?, 0)
}

fn clock_field(field: &str) -> Option<u32> {
    if field.is_empty() || field.len() > 2 || !field.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    field.parse().ok()
}

/// Format a clock time as zero-padded HH:MM
pub fn format_clock(time: &NaiveTime) -> String {
    format!("{:02}:{:02}", time.hour(), time.minute())
}

/// Normalise HH:MM or HH:MM:SS to zero-padded HH:MM
pub fn normalize_clock(time_str: &str) -> Option<String> {
    parse_clock(time_str)
        .or_else(|| NaiveTime::parse_from_str(time_str.trim(), "%H:%M:%S").ok())
        .map(|time| format_clock(&time))
}

/// Add minutes to an HH:MM time on a 24h clock.
///
/// The date never advances; a result past midnight wraps around.
pub fn add_minutes(time_str: &str, minutes: u32) -> Option<String> {
    let start = parse_clock(time_str)?;
    let (end, _) = start.overflowing_add_signed(Duration::minutes(i64::from(minutes)));
    Some(format_clock(&end))
}

/// Day-of-week index with Sunday as 0
pub fn weekday_index(weekday: Weekday) -> u8 {
    weekday.num_days_from_sunday() as u8
}

/// Day-of-week index of a calendar date, Sunday as 0
pub fn day_of_week(date: &NaiveDate) -> u8 {
    weekday_index(date.weekday())
}

/// The calendar day after `now` in its own timezone
pub fn tomorrow<Tz: TimeZone>(now: &DateTime<Tz>) -> NaiveDate {
    let today = now.date_naive();
    today.succ_opt().unwrap_or(today)
}
