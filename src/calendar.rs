use crate::models::{DayName, FIRST_WEEK, LAST_WEEK};
use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// Anchors the plan to the calendar: week 1 Monday is `start`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainingCalendar {
    start: NaiveDate,
}

impl TrainingCalendar {
    /// Calendar whose first week contains `date`
    pub fn starting_week_of(date: NaiveDate) -> Self {
        let offset = date.weekday().num_days_from_monday();
        TrainingCalendar {
            start: date - Duration::days(i64::from(offset)),
        }
    }

    /// Monday of week 1
    pub fn start(&self) -> NaiveDate {
        self.start
    }

    /// Plan slot a date falls into, if it is inside the plan
    pub fn slot_for(&self, date: NaiveDate) -> Option<(u8, DayName)> {
        let days = (date - self.start).num_days();
        if days < 0 {
            return None;
        }

        let week = u8::try_from(days / 7 + 1).ok()?;
        if week > LAST_WEEK {
            return None;
        }

        let day = DayName::from_index(usize::try_from(days % 7).ok()?)?;
        Some((week, day))
    }

    /// Plan week for `today`, clamped to the plan
    pub fn current_week(&self, today: NaiveDate) -> u8 {
        let days = (today - self.start).num_days();
        if days < 0 {
            return FIRST_WEEK;
        }

        let week = days / 7 + 1;
        u8::try_from(week.min(i64::from(LAST_WEEK))).unwrap_or(LAST_WEEK)
    }

    pub fn date_of(&self, week: u8, day: DayName) -> NaiveDate {
        let offset = i64::from(week.saturating_sub(1)) * 7 + day.index() as i64;
        self.start + Duration::days(offset)
    }

    /// Final Sunday of the plan
    pub fn race_date(&self) -> NaiveDate {
        self.start + Duration::days(i64::from(LAST_WEEK) * 7 - 1)
    }

    /// Days left until race day, never negative
    pub fn days_until_race(&self, today: NaiveDate) -> u32 {
        let days = (self.race_date() - today).num_days().max(0);
        u32::try_from(days).unwrap_or(u32::MAX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    // 2024-01-01 is a Monday
    fn calendar() -> TrainingCalendar {
        TrainingCalendar::starting_week_of(date(2024, 1, 1))
    }

    #[test]
    fn test_start_aligns_to_monday() {
        let calendar = TrainingCalendar::starting_week_of(date(2024, 1, 4));
        assert_eq!(calendar.start(), date(2024, 1, 1));

        let calendar = TrainingCalendar::starting_week_of(date(2024, 1, 7));
        assert_eq!(calendar.start(), date(2024, 1, 1));
    }

    #[test]
    fn test_slot_for() {
        let calendar = calendar();
        assert_eq!(calendar.slot_for(date(2024, 1, 1)), Some((1, DayName::Monday)));
        assert_eq!(calendar.slot_for(date(2024, 1, 14)), Some((2, DayName::Sunday)));
        assert_eq!(calendar.slot_for(date(2023, 12, 31)), None);
        assert_eq!(calendar.slot_for(calendar.race_date()), Some((16, DayName::Sunday)));
        assert_eq!(
            calendar.slot_for(calendar.race_date() + Duration::days(1)),
            None
        );
    }

    #[test]
    fn test_current_week_is_clamped() {
        let calendar = calendar();
        assert_eq!(calendar.current_week(date(2023, 11, 1)), 1);
        assert_eq!(calendar.current_week(date(2024, 1, 8)), 2);
        assert_eq!(calendar.current_week(date(2024, 12, 1)), 16);
    }

    #[test]
    fn test_date_of_inverts_slot_for() {
        let calendar = calendar();
        let day = calendar.date_of(5, DayName::Thursday);
        assert_eq!(day, date(2024, 2, 1));
        assert_eq!(calendar.slot_for(day), Some((5, DayName::Thursday)));
    }

    #[test]
    fn test_race_countdown() {
        let calendar = calendar();
        assert_eq!(calendar.race_date(), date(2024, 4, 21));
        assert_eq!(calendar.days_until_race(date(2024, 4, 14)), 7);
        assert_eq!(calendar.days_until_race(date(2024, 5, 1)), 0);
    }
}
