//! Subscription cancellation rules.

use chrono::{Datelike, Duration, NaiveDate};

use crate::stats::period::YearMonth;

/// Date a subscription scheduled to end at the period boundary is recorded as
/// canceled: the day before the next `payment_day`.
///
/// When `today` is before `payment_day` that is in the current month,
/// otherwise in the next one. A `payment_day` past the end of the month is
/// clamped to the month's last day first. A `payment_day` of 1 lands on the
/// last day of the preceding month.
pub fn cancellation_date(today: NaiveDate, payment_day: u32) -> NaiveDate {
    let current = YearMonth {
        year: today.year(),
        month: today.month(),
    };
    let month = if today.day() < payment_day {
        current
    } else {
        next_month(current)
    };

    let payment_day = payment_day.clamp(1, month.days());
    month.first_day() + Duration::days(i64::from(payment_day) - 2)
}

fn next_month(ym: YearMonth) -> YearMonth {
    if ym.month == 12 {
        YearMonth {
            year: ym.year + 1,
            month: 1,
        }
    } else {
        YearMonth {
            year: ym.year,
            month: ym.month + 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn before_payment_day_stays_in_month() {
        assert_eq!(cancellation_date(date(2025, 4, 7), 10), date(2025, 4, 9));
    }

    #[test]
    fn after_payment_day_moves_to_next_month() {
        assert_eq!(cancellation_date(date(2025, 4, 11), 10), date(2025, 5, 9));
    }

    #[test]
    fn on_payment_day_moves_to_next_month() {
        assert_eq!(cancellation_date(date(2025, 4, 10), 10), date(2025, 5, 9));
    }

    #[test]
    fn december_rolls_into_january() {
        assert_eq!(cancellation_date(date(2025, 12, 20), 5), date(2026, 1, 4));
    }

    #[test]
    fn clamps_to_month_length() {
        assert_eq!(cancellation_date(date(2025, 2, 1), 31), date(2025, 2, 27));
    }

    #[test]
    fn first_of_month_payment_ends_the_day_before() {
        assert_eq!(cancellation_date(date(2025, 3, 15), 1), date(2025, 3, 31));
        assert_eq!(cancellation_date(date(2025, 12, 1), 1), date(2025, 12, 31));
        assert_eq!(cancellation_date(date(2024, 2, 10), 1), date(2024, 2, 29));
    }
}
