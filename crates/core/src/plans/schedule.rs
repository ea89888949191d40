//! Calendar arithmetic for recurring plans.

use chrono::{Datelike, Duration, NaiveDate};

use super::plans_model::Frequency;
use crate::utils::time_utils::{clamped_date, following_month};

/// Computes a plan's next execution date after `reference`.
///
/// - Daily: the following calendar day.
/// - Weekly: the next occurrence of the ISO weekday `execution_day`
///   (1 = Monday .. 7 = Sunday), strictly after `reference`.
/// - Monthly: `execution_day` in the following calendar month, clamped to
///   that month's last day. Day 31 in a 30-day month (or 28/29-day
///   February) resolves to the month's last day; the clamp is the defined
///   behavior for month-end overflow, not an error.
///
/// Deterministic and pure: the same `(frequency, execution_day, reference)`
/// always yields the same date. `execution_day` is assumed validated
/// (`validate_frequency_config`); a missing day falls back to 1.
pub fn next_execution_date(
    frequency: Frequency,
    execution_day: Option<u32>,
    reference: NaiveDate,
) -> NaiveDate {
    match frequency {
        Frequency::Daily => reference + Duration::days(1),
        Frequency::Weekly => {
            let target_weekday = execution_day.unwrap_or(1);
            let mut date = reference + Duration::days(1);
            while date.weekday().number_from_monday() != target_weekday {
                date += Duration::days(1);
            }
            date
        }
        Frequency::Monthly => {
            let (year, month) = following_month(reference);
            clamped_date(year, month, execution_day.unwrap_or(1))
        }
    }
}
