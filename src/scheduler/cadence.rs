//! Weekly fire-time arithmetic for the ingestion schedule.

use chrono::{DateTime, Datelike, Days, FixedOffset, LocalResult, NaiveTime, TimeZone, Utc, Weekday};

/// A fixed weekday-set schedule at one local time of day, e.g. Tuesday
/// and Friday at 06:00 in UTC+9.
#[derive(Debug, Clone)]
pub struct WeeklyCadence {
    tz: FixedOffset,
    weekdays: Vec<Weekday>,
    target: NaiveTime,
}

impl WeeklyCadence {
    pub fn new(tz: FixedOffset, weekdays: Vec<Weekday>, hour: u32, minute: u32) -> Self {
        assert!(!weekdays.is_empty(), "cadence needs at least one weekday");
        let target = NaiveTime::from_hms_opt(hour, minute, 0)
            .unwrap_or_else(|| panic!("invalid time: {hour:02}:{minute:02}"));
        Self {
            tz,
            weekdays,
            target,
        }
    }

    /// The next fire time at or after `now`.
    pub fn next_run_from(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let localized_now = now.with_timezone(&self.tz);

        for day_offset in 0..=7u64 {
            let date = localized_now
                .date_naive()
                .checked_add_days(Days::new(day_offset))
                .expect("date remains representable when advancing a week");

            if !self.weekdays.contains(&date.weekday()) {
                continue;
            }
            if day_offset == 0 && localized_now.time() > self.target {
                continue;
            }

            let local_target = date.and_time(self.target);
            match self.tz.from_local_datetime(&local_target) {
                LocalResult::Single(dt) => return dt.with_timezone(&Utc),
                LocalResult::Ambiguous(first, _) => return first.with_timezone(&Utc),
                LocalResult::None => {
                    unreachable!("fixed offset should not produce nonexistent times")
                }
            }
        }

        unreachable!("a non-empty weekday set fires within one week")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::SCRAPE_WEEKDAYS;

    fn kst() -> FixedOffset {
        FixedOffset::east_opt(9 * 3600).expect("kst offset")
    }

    fn parse_utc(ts: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(ts)
            .expect("valid datetime")
            .with_timezone(&Utc)
    }

    fn cadence() -> WeeklyCadence {
        WeeklyCadence::new(kst(), SCRAPE_WEEKDAYS.to_vec(), 6, 0)
    }

    #[test]
    fn fires_same_day_before_the_trigger_time() {
        // 2026-08-18 is a Tuesday. 04:00 KST is before the 06:00 fire.
        let now = parse_utc("2026-08-17T19:00:00Z");
        let next = cadence().next_run_from(now);
        assert_eq!(next, parse_utc("2026-08-17T21:00:00Z")); // Tue 06:00 KST
    }

    #[test]
    fn rolls_to_friday_when_past_tuesdays_fire() {
        // Tuesday 09:00 KST, already past 06:00.
        let now = parse_utc("2026-08-18T00:00:00Z");
        let next = cadence().next_run_from(now);
        assert_eq!(next, parse_utc("2026-08-20T21:00:00Z")); // Fri 06:00 KST
    }

    #[test]
    fn rolls_over_the_weekend_to_tuesday() {
        // Saturday noon KST.
        let now = parse_utc("2026-08-22T03:00:00Z");
        let next = cadence().next_run_from(now);
        assert_eq!(next, parse_utc("2026-08-24T21:00:00Z")); // Tue 06:00 KST
    }

    #[test]
    fn fires_immediately_at_the_exact_trigger_instant() {
        let now = parse_utc("2026-08-17T21:00:00Z"); // Tue 06:00 KST
        let next = cadence().next_run_from(now);
        assert_eq!(next, now);
    }

    #[test]
    #[should_panic(expected = "at least one weekday")]
    fn empty_weekday_set_is_rejected() {
        WeeklyCadence::new(kst(), Vec::new(), 6, 0);
    }
}
