//! Actual/Actual variants.

use crate::types::{Date, Frequency};

/// ISDA: days falling in each calendar year over that year's length.
pub(super) fn isda(start: Date, end: Date) -> f64 {
    let mut total = 0.0;
    let mut current = start;

    while current.year() < end.year() {
        let next_year = current.add_days(i64::from(current.days_in_year()) - i64::from(day_of_year(current)) + 1);
        total += current.days_between(&next_year) as f64 / f64::from(current.days_in_year());
        current = next_year;
    }

    total + current.days_between(&end) as f64 / f64::from(current.days_in_year())
}

/// ICMA: accrued days over (frequency x days in the regular reference period).
pub(super) fn icma(
    start: Date,
    end: Date,
    reference_start: Date,
    reference_end: Date,
    frequency: Frequency,
) -> f64 {
    let period_days = reference_start.days_between(&reference_end);
    if period_days <= 0 || end <= start {
        return 0.0;
    }
    start.days_between(&end) as f64 / (f64::from(frequency.periods_per_year()) * period_days as f64)
}

fn day_of_year(date: Date) -> u32 {
    chrono::Datelike::ordinal(&date.as_naive_date())
}
