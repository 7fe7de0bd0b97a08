use anyhow::Context;
use chrono::{Datelike, Duration, NaiveDate, Weekday};

pub fn parse_date(s: &str) -> anyhow::Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .with_context(|| format!("invalid date {s:?}, expected YYYY-MM-DD"))
}

pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

pub fn shift_days(date: NaiveDate, days: i64) -> NaiveDate {
    date + Duration::days(days)
}

/// Monday–Friday dates in `[start, end)`. Market holidays are not excluded.
pub fn business_days(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    let mut out = Vec::new();
    let mut date = start;
    while date < end {
        if !is_weekend(date) {
            out.push(date);
        }
        date = shift_days(date, 1);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn skips_weekends_and_excludes_end() {
        // 2022-07-08 is a Friday, 2022-07-13 a Wednesday.
        let days = business_days(d(2022, 7, 8), d(2022, 7, 13));
        assert_eq!(
            days,
            vec![d(2022, 7, 8), d(2022, 7, 11), d(2022, 7, 12)]
        );
    }

    #[test]
    fn weekend_end_date_keeps_preceding_friday() {
        // 2022-07-31 is a Sunday.
        let days = business_days(d(2022, 7, 25), d(2022, 7, 31));
        assert_eq!(days.len(), 5);
        assert_eq!(days.last().copied(), Some(d(2022, 7, 29)));
    }

    #[test]
    fn empty_when_start_not_before_end() {
        assert!(business_days(d(2022, 7, 8), d(2022, 7, 8)).is_empty());
        assert!(business_days(d(2022, 7, 12), d(2022, 7, 8)).is_empty());
        // Saturday through Monday (exclusive) has no business days.
        assert!(business_days(d(2022, 7, 9), d(2022, 7, 11)).is_empty());
    }

    #[test]
    fn month_of_july_2022_has_21_business_days() {
        let days = business_days(d(2022, 7, 1), d(2022, 8, 1));
        assert_eq!(days.len(), 21);
        assert!(days.iter().all(|d| !is_weekend(*d)));
    }

    #[test]
    fn parses_iso_dates() {
        assert_eq!(parse_date(" 2022-07-08 ").unwrap(), d(2022, 7, 8));
        assert!(parse_date("07/08/2022").is_err());
        assert!(parse_date("2022-02-30").is_err());
    }

    #[test]
    fn shift_crosses_month_boundary() {
        assert_eq!(shift_days(d(2022, 7, 31), 1), d(2022, 8, 1));
        assert_eq!(shift_days(d(2022, 8, 1), -1), d(2022, 7, 31));
    }
}
