//! 30/360 bond basis.

use crate::types::Date;

/// Day count with 30-day months.
///
/// D1 = 31 becomes 30. D2 = 31 becomes 30 when D1 is 30 or 31.
pub(super) fn day_count(start: Date, end: Date) -> i64 {
    let d1 = start.day().min(30);
    let d2 = if end.day() == 31 && d1 == 30 { 30 } else { end.day() };

    360 * i64::from(end.year() - start.year())
        + 30 * (i64::from(end.month()) - i64::from(start.month()))
        + i64::from(d2)
        - i64::from(d1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> Date {
        Date::from_ymd(y, m, day).unwrap()
    }

    #[test]
    fn test_regular_months() {
        assert_eq!(day_count(d(2026, 1, 15), d(2026, 7, 15)), 180);
        assert_eq!(day_count(d(2026, 1, 15), d(2027, 1, 15)), 360);
    }

    #[test]
    fn test_month_end_rules() {
        assert_eq!(day_count(d(2026, 1, 31), d(2026, 3, 31)), 60);
        assert_eq!(day_count(d(2026, 1, 30), d(2026, 3, 31)), 60);
        assert_eq!(day_count(d(2026, 1, 15), d(2026, 3, 31)), 76);
        assert_eq!(day_count(d(2026, 2, 28), d(2026, 3, 31)), 33);
    }
}
