//! Shared calendar helpers.

use chrono::{Datelike, NaiveDate};

/// Last calendar day of the given month.
pub fn last_day_of_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .expect("first of month is always valid")
        .pred_opt()
        .expect("first of month has a predecessor")
        .day()
}

/// A date in the given month with the day clamped to the month's length.
///
/// Day 31 in a 30-day month (or 28/29-day February) resolves to the month's
/// last day; the clamp is the defined behavior for month-end overflow, not
/// an error.
pub fn clamped_date(year: i32, month: u32, day: u32) -> NaiveDate {
    let day = day.min(last_day_of_month(year, month));
    NaiveDate::from_ymd_opt(year, month, day).expect("clamped day is valid for its month")
}

/// The month following the given date's month.
pub fn following_month(date: NaiveDate) -> (i32, u32) {
    if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn month_lengths() {
        assert_eq!(last_day_of_month(2025, 1), 31);
        assert_eq!(last_day_of_month(2025, 2), 28);
        assert_eq!(last_day_of_month(2024, 2), 29);
        assert_eq!(last_day_of_month(2025, 4), 30);
        assert_eq!(last_day_of_month(2025, 12), 31);
    }

    #[test]
    fn clamping_only_affects_overflowing_days() {
        assert_eq!(
            clamped_date(2025, 2, 31),
            NaiveDate::from_ymd_opt(2025, 2, 28).unwrap()
        );
        assert_eq!(
            clamped_date(2025, 2, 10),
            NaiveDate::from_ymd_opt(2025, 2, 10).unwrap()
        );
    }
}
