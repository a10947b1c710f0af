use super::models::{GenerateOptions, GeneratedSlot, SchedulePreference};
use crate::utils::time::{add_minutes, day_of_week, format_clock, parse_clock};
use chrono::NaiveDate;
use tracing::{debug, warn};

/// Days scanned per requested slot before giving up
const DAYS_SCANNED_PER_SLOT: u64 = 7 * 2;

/// Most slots a single call will produce
pub const MAX_GENERATED_SLOTS: u32 = 1_000;

/// A preference that passed validation, with its times precomputed
struct ResolvedPreference {
    day_of_week: u8,
    start_time: String,
    end_time: String,
}

/// Generate `count` slots starting at `start_date` (inclusive).
///
/// Days are walked one at a time; every preference whose weekday matches the
/// day yields a slot, in the order the preferences were given. Bad input
/// produces an empty or short list rather than an error.
pub fn generate(
    start_date: NaiveDate,
    preferences: &[SchedulePreference],
    count: u32,
    duration_minutes: u32,
) -> Vec<GeneratedSlot> {
    generate_with(
        start_date,
        preferences,
        count,
        duration_minutes,
        &GenerateOptions::default(),
    )
}

/// Same as [`generate`], skipping closed dates and honouring a custom scan bound
pub fn generate_with(
    start_date: NaiveDate,
    preferences: &[SchedulePreference],
    count: u32,
    duration_minutes: u32,
    options: &GenerateOptions,
) -> Vec<GeneratedSlot> {
    if count == 0 || duration_minutes == 0 {
        return Vec::new();
    }

    let resolved = resolve_preferences(preferences, duration_minutes);
    if resolved.is_empty() {
        return Vec::new();
    }

    if count > MAX_GENERATED_SLOTS {
        warn!(
            "Requested {} slots, generating at most {}",
            count, MAX_GENERATED_SLOTS
        );
    }
    let count = count.min(MAX_GENERATED_SLOTS);

    let max_days = options
        .max_days_scanned
        .map(u64::from)
        .unwrap_or_else(|| u64::from(count) * DAYS_SCANNED_PER_SLOT);

    let target = count as usize;
    let mut slots = Vec::new();
    let mut current = start_date;
    let mut days_scanned = 0u64;

    'days: while slots.len() < target && days_scanned < max_days {
        if !options.closed_dates.contains(&current) {
            let weekday = day_of_week(&current);
            for pref in resolved.iter().filter(|p| p.day_of_week == weekday) {
                slots.push(GeneratedSlot {
                    date: current,
                    day_of_week: weekday,
                    start_time: pref.start_time.clone(),
                    end_time: pref.end_time.clone(),
                });
                if slots.len() == target {
                    break 'days;
                }
            }
        }

        days_scanned += 1;
        current = match current.succ_opt() {
            Some(next) => next,
            None => break,
        };
    }

    if slots.len() < target {
        debug!(
            "Generated {} of {} requested slots after scanning {} days",
            slots.len(),
            target,
            days_scanned
        );
    }

    slots
}

fn resolve_preferences(
    preferences: &[SchedulePreference],
    duration_minutes: u32,
) -> Vec<ResolvedPreference> {
    preferences
        .iter()
        .filter_map(|pref| {
            if pref.day_of_week > 6 {
                warn!("Ignoring preference with day of week {}", pref.day_of_week);
                return None;
            }
            let Some(start) = parse_clock(&pref.time) else {
                warn!("Ignoring preference with invalid time '{}'", pref.time);
                return None;
            };
            let start_time = format_clock(&start);
            let end_time = add_minutes(&start_time, duration_minutes)?;
            Some(ResolvedPreference {
                day_of_week: pref.day_of_week,
                start_time,
                end_time,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_weekly_tuesday_slots() {
        // Monday 2024-01-01, Tuesdays at 09:00
        let prefs = vec![SchedulePreference::new(2, "09:00")];
        let slots = generate(date(2024, 1, 1), &prefs, 3, 60);

        let dates: Vec<NaiveDate> = slots.iter().map(|s| s.date).collect();
        assert_eq!(dates, vec![date(2024, 1, 2), date(2024, 1, 9), date(2024, 1, 16)]);
        for slot in &slots {
            assert_eq!(slot.day_of_week, 2);
            assert_eq!(slot.start_time, "09:00");
            assert_eq!(slot.end_time, "10:00");
        }
    }

    #[test]
    fn test_two_preferences_alternate() {
        let prefs = vec![
            SchedulePreference::new(1, "10:00"),
            SchedulePreference::new(4, "15:00"),
        ];
        let slots = generate(date(2024, 1, 1), &prefs, 4, 45);

        let summary: Vec<(NaiveDate, u8, &str, &str)> = slots
            .iter()
            .map(|s| (s.date, s.day_of_week, s.start_time.as_str(), s.end_time.as_str()))
            .collect();
        assert_eq!(
            summary,
            vec![
                (date(2024, 1, 1), 1, "10:00", "10:45"),
                (date(2024, 1, 4), 4, "15:00", "15:45"),
                (date(2024, 1, 8), 1, "10:00", "10:45"),
                (date(2024, 1, 11), 4, "15:00", "15:45"),
            ]
        );
    }

    #[test]
    fn test_start_date_is_inclusive() {
        let prefs = vec![SchedulePreference::new(1, "08:30")];
        let slots = generate(date(2024, 1, 1), &prefs, 1, 30);
        assert_eq!(slots[0].date, date(2024, 1, 1));
    }

    #[test]
    fn test_duplicate_weekday_keeps_declaration_order() {
        let prefs = vec![
            SchedulePreference::new(3, "14:00"),
            SchedulePreference::new(3, "09:00"),
        ];
        let slots = generate(date(2024, 1, 1), &prefs, 3, 60);

        assert_eq!(slots.len(), 3);
        assert_eq!(slots[0].date, date(2024, 1, 3));
        assert_eq!(slots[0].start_time, "14:00");
        assert_eq!(slots[1].date, date(2024, 1, 3));
        assert_eq!(slots[1].start_time, "09:00");
        assert_eq!(slots[2].date, date(2024, 1, 10));
        assert_eq!(slots[2].start_time, "14:00");
    }

    #[test]
    fn test_empty_inputs() {
        let prefs = vec![SchedulePreference::new(2, "09:00")];
        assert!(generate(date(2024, 1, 1), &[], 5, 60).is_empty());
        assert!(generate(date(2024, 1, 1), &prefs, 0, 60).is_empty());
        assert!(generate(date(2024, 1, 1), &prefs, 5, 0).is_empty());
    }

    #[test]
    fn test_invalid_preferences_never_match() {
        let prefs = vec![
            SchedulePreference::new(7, "09:00"),
            SchedulePreference::new(2, "25:00"),
        ];
        assert!(generate(date(2024, 1, 1), &prefs, 3, 60).is_empty());

        let mixed = vec![
            SchedulePreference::new(9, "09:00"),
            SchedulePreference::new(5, "9:30"),
        ];
        let slots = generate(date(2024, 1, 1), &mixed, 2, 30);
        assert_eq!(slots.len(), 2);
        assert!(slots.iter().all(|s| s.day_of_week == 5 && s.start_time == "09:30"));
    }

    #[test]
    fn test_rolls_over_month_and_year() {
        // Sundays from late December
        let prefs = vec![SchedulePreference::new(0, "11:00")];
        let slots = generate(date(2023, 12, 20), &prefs, 3, 60);
        let dates: Vec<NaiveDate> = slots.iter().map(|s| s.date).collect();
        assert_eq!(dates, vec![date(2023, 12, 24), date(2023, 12, 31), date(2024, 1, 7)]);
    }

    #[test]
    fn test_closed_dates_are_skipped() {
        let prefs = vec![SchedulePreference::new(2, "09:00")];
        let options = GenerateOptions {
            closed_dates: BTreeSet::from([date(2024, 1, 9)]),
            max_days_scanned: None,
        };
        let slots = generate_with(date(2024, 1, 1), &prefs, 3, 60, &options);
        let dates: Vec<NaiveDate> = slots.iter().map(|s| s.date).collect();
        assert_eq!(dates, vec![date(2024, 1, 2), date(2024, 1, 16), date(2024, 1, 23)]);
    }

    #[test]
    fn test_scan_bound_truncates() {
        let prefs = vec![SchedulePreference::new(2, "09:00")];
        let options = GenerateOptions {
            closed_dates: BTreeSet::new(),
            max_days_scanned: Some(10),
        };
        // Only 2024-01-02 and 2024-01-09 fall within ten days
        let slots = generate_with(date(2024, 1, 1), &prefs, 5, 60, &options);
        assert_eq!(slots.len(), 2);
    }

    #[test]
    fn test_huge_count_is_capped() {
        let prefs = vec![
            SchedulePreference::new(9, "09:00"),
            SchedulePreference::new(2, "09:00"),
        ];
        let slots = generate(date(2024, 1, 1), &prefs, u32::MAX, 60);
        assert_eq!(slots.len(), MAX_GENERATED_SLOTS as usize);
        assert!(slots.iter().all(|s| s.day_of_week == 2));

        // Nothing can match, nothing is scanned
        let impossible = vec![SchedulePreference::new(9, "09:00")];
        assert!(generate(date(2024, 1, 1), &impossible, u32::MAX, 60).is_empty());
    }

    #[test]
    fn test_output_is_sorted_and_consistent() {
        let prefs = vec![
            SchedulePreference::new(6, "12:00"),
            SchedulePreference::new(0, "10:00"),
            SchedulePreference::new(3, "17:15"),
        ];
        let slots = generate(date(2024, 2, 20), &prefs, 20, 50);
        assert_eq!(slots.len(), 20);
        assert!(slots.windows(2).all(|w| w[0].date <= w[1].date));
        for slot in &slots {
            assert_eq!(day_of_week(&slot.date), slot.day_of_week);
            assert_eq!(add_minutes(&slot.start_time, 50).unwrap(), slot.end_time);
        }
        assert_eq!(slots, generate(date(2024, 2, 20), &prefs, 20, 50));
    }
}
