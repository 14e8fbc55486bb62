//! Business-day calendar (Monday–Friday, no holiday schedule).

use chrono::{Datelike, Duration, NaiveDate, Weekday};

pub fn is_business_day(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// The first business day on or after `date`.
pub fn roll_forward(date: NaiveDate) -> NaiveDate {
    let mut d = date;
    while !is_business_day(d) {
        d += Duration::days(1);
    }
    d
}

/// The first business day strictly after `date`.
pub fn next_business_day(date: NaiveDate) -> NaiveDate {
    roll_forward(date + Duration::days(1))
}

/// All business days in `[start, end]`.
///
/// `start` is rolled forward first, so a weekend start begins on the
/// following Monday. Returns an empty vector when the range holds no
/// business day.
pub fn business_days(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    let mut out = Vec::new();
    let mut d = roll_forward(start);
    while d <= end {
        out.push(d);
        d = next_business_day(d);
    }
    out
}

/// The `n` business days immediately following `last`.
pub fn business_days_after(last: NaiveDate, n: usize) -> Vec<NaiveDate> {
    let mut out = Vec::with_capacity(n);
    let mut d = last;
    for _ in 0..n {
        d = next_business_day(d);
        out.push(d);
    }
    out
}

/// The `n` business days ending on `last` (rolled back to a business day).
pub fn business_days_ending(last: NaiveDate, n: usize) -> Vec<NaiveDate> {
    let mut out = Vec::with_capacity(n);
    let mut d = last;
    while !is_business_day(d) {
        d -= Duration::days(1);
    }
    for _ in 0..n {
        out.push(d);
        d -= Duration::days(1);
        while !is_business_day(d) {
            d -= Duration::days(1);
        }
    }
    out.reverse();
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn friday_rolls_to_monday() {
        // 2024-03-15 is a Friday.
        assert_eq!(next_business_day(ymd(2024, 3, 15)), ymd(2024, 3, 18));
        assert_eq!(roll_forward(ymd(2024, 3, 16)), ymd(2024, 3, 18));
        assert_eq!(roll_forward(ymd(2024, 3, 15)), ymd(2024, 3, 15));
    }

    #[test]
    fn business_days_skip_weekends() {
        let days = business_days(ymd(2024, 3, 14), ymd(2024, 3, 19));
        assert_eq!(
            days,
            vec![ymd(2024, 3, 14), ymd(2024, 3, 15), ymd(2024, 3, 18), ymd(2024, 3, 19)]
        );
        assert!(business_days(ymd(2024, 3, 16), ymd(2024, 3, 17)).is_empty());
    }

    #[test]
    fn days_after_friday_are_next_week() {
        let days = business_days_after(ymd(2024, 3, 15), 5);
        assert_eq!(days.first(), Some(&ymd(2024, 3, 18)));
        assert_eq!(days.last(), Some(&ymd(2024, 3, 22)));
    }

    #[test]
    fn days_ending_counts_back_over_weekends() {
        let days = business_days_ending(ymd(2024, 3, 18), 3);
        assert_eq!(days, vec![ymd(2024, 3, 14), ymd(2024, 3, 15), ymd(2024, 3, 18)]);
        // A Sunday end date means the preceding Friday.
        let days = business_days_ending(ymd(2024, 3, 17), 1);
        assert_eq!(days, vec![ymd(2024, 3, 15)]);
    }
}
