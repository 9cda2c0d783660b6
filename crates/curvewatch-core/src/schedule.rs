//! Unadjusted payment schedules.
//!
//! Bond schedules roll backward from maturity so any stub sits at the front; swap
//! schedules roll forward from the effective date so any stub sits at the back. Each
//! period carries the regular reference period it belongs to, which ACT/ACT ICMA needs
//! for stub accruals.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::types::{Date, Frequency};

/// One accrual period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulePeriod {
    /// Accrual start.
    pub start: Date,
    /// Accrual end, also the payment date.
    pub end: Date,
    /// Start of the regular period containing this accrual.
    pub reference_start: Date,
    /// End of the regular period containing this accrual.
    pub reference_end: Date,
}

impl SchedulePeriod {
    /// True if `date` falls strictly inside the accrual period.
    #[must_use]
    pub fn straddles(&self, date: Date) -> bool {
        self.start < date && date < self.end
    }

    /// True for a short or long stub.
    #[must_use]
    pub fn is_stub(&self) -> bool {
        self.start != self.reference_start || self.end != self.reference_end
    }
}

/// Ordered, contiguous accrual periods.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    frequency: Frequency,
    periods: Vec<SchedulePeriod>,
}

impl Schedule {
    /// Rolls back from `end` in whole periods until reaching `start`.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidSchedule` if `start >= end`.
    pub fn backward(start: Date, end: Date, frequency: Frequency) -> CoreResult<Self> {
        check_range(start, end)?;
        let step = frequency.months_per_period() as i32;

        // Offsets from the anchor avoid month-end drift.
        let mut boundaries = vec![end];
        let mut k = 1;
        loop {
            let date = end.add_months(-step * k)?;
            if date <= start {
                break;
            }
            boundaries.push(date);
            k += 1;
        }
        boundaries.push(start);
        boundaries.reverse();

        let count = boundaries.len() - 1;
        let first_reference = end.add_months(-step * count as i32)?;
        let periods = boundaries
            .windows(2)
            .enumerate()
            .map(|(i, w)| SchedulePeriod {
                start: w[0],
                end: w[1],
                reference_start: if i == 0 { first_reference } else { w[0] },
                reference_end: w[1],
            })
            .collect();

        Ok(Self { frequency, periods })
    }

    /// Rolls forward from `start` in whole periods until reaching `end`.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::InvalidSchedule` if `start >= end`.
    pub fn forward(start: Date, end: Date, frequency: Frequency) -> CoreResult<Self> {
        check_range(start, end)?;
        let step = frequency.months_per_period() as i32;

        let mut boundaries = vec![start];
        let mut k = 1;
        loop {
            let date = start.add_months(step * k)?;
            if date >= end {
                break;
            }
            boundaries.push(date);
            k += 1;
        }
        boundaries.push(end);

        let count = boundaries.len() - 1;
        let last_reference = start.add_months(step * count as i32)?;
        let periods = boundaries
            .windows(2)
            .enumerate()
            .map(|(i, w)| SchedulePeriod {
                start: w[0],
                end: w[1],
                reference_start: w[0],
                reference_end: if i + 1 == count { last_reference } else { w[1] },
            })
            .collect();

        Ok(Self { frequency, periods })
    }

    /// Schedule frequency.
    #[must_use]
    pub fn frequency(&self) -> Frequency {
        self.frequency
    }

    /// All periods in date order.
    #[must_use]
    pub fn periods(&self) -> &[SchedulePeriod] {
        &self.periods
    }

    /// Number of periods.
    #[must_use]
    pub fn len(&self) -> usize {
        self.periods.len()
    }

    /// True if the schedule has no periods.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.periods.is_empty()
    }

    /// Periods whose payment date is strictly after `date`.
    pub fn remaining(&self, date: Date) -> impl Iterator<Item = &SchedulePeriod> + '_ {
        self.periods.iter().filter(move |p| p.end > date)
    }

    /// The period strictly containing `date`, if any.
    #[must_use]
    pub fn period_containing(&self, date: Date) -> Option<&SchedulePeriod> {
        self.periods.iter().find(|p| p.straddles(date))
    }
}

fn check_range(start: Date, end: Date) -> CoreResult<()> {
    if start >= end {
        return Err(CoreError::invalid_schedule(format!(
            "start {start} is not before end {end}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> Date {
        Date::from_ymd(y, m, day).unwrap()
    }

    #[test]
    fn test_backward_regular() {
        let s = Schedule::backward(d(2023, 11, 15), d(2028, 11, 15), Frequency::SemiAnnual).unwrap();
        assert_eq!(s.len(), 10);
        assert_eq!(s.periods()[0].start, d(2023, 11, 15));
        assert_eq!(s.periods()[0].end, d(2024, 5, 15));
        assert!(s.periods().iter().all(|p| !p.is_stub()));
    }

    #[test]
    fn test_backward_front_stub() {
        let s = Schedule::backward(d(2026, 2, 1), d(2028, 11, 15), Frequency::Annual).unwrap();
        let first = s.periods()[0];
        assert_eq!(first.start, d(2026, 2, 1));
        assert_eq!(first.end, d(2026, 11, 15));
        assert_eq!(first.reference_start, d(2025, 11, 15));
        assert!(first.is_stub());
        assert_eq!(s.len(), 3);
    }

    #[test]
    fn test_backward_month_end_anchor() {
        let s = Schedule::backward(d(2025, 8, 31), d(2026, 8, 31), Frequency::Quarterly).unwrap();
        let ends: Vec<Date> = s.periods().iter().map(|p| p.end).collect();
        assert_eq!(ends, vec![d(2025, 11, 30), d(2026, 2, 28), d(2026, 5, 31), d(2026, 8, 31)]);
    }

    #[test]
    fn test_forward_back_stub() {
        let s = Schedule::forward(d(2026, 1, 30), d(2031, 1, 28), Frequency::Annual).unwrap();
        assert_eq!(s.len(), 5);
        let last = s.periods()[4];
        assert_eq!(last.start, d(2030, 1, 30));
        assert_eq!(last.end, d(2031, 1, 28));
        assert_eq!(last.reference_end, d(2031, 1, 30));
    }

    #[test]
    fn test_contiguous() {
        let s = Schedule::forward(d(2026, 1, 15), d(2036, 1, 15), Frequency::Quarterly).unwrap();
        assert_eq!(s.len(), 40);
        for w in s.periods().windows(2) {
            assert_eq!(w[0].end, w[1].start);
        }
    }

    #[test]
    fn test_remaining_and_containing() {
        let s = Schedule::forward(d(2025, 1, 15), d(2027, 1, 15), Frequency::SemiAnnual).unwrap();
        let val = d(2026, 3, 1);
        assert_eq!(s.remaining(val).count(), 2);
        let current = s.period_containing(val).unwrap();
        assert_eq!(current.start, d(2026, 1, 15));
        assert!(s.period_containing(d(2026, 1, 15)).is_none());
    }

    #[test]
    fn test_invalid_range() {
        assert!(Schedule::backward(d(2026, 1, 1), d(2026, 1, 1), Frequency::Annual).is_err());
        assert!(Schedule::forward(d(2027, 1, 1), d(2026, 1, 1), Frequency::Annual).is_err());
    }
}
