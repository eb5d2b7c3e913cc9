use crate::error::{ForecastError, Result};
use chrono::{Datelike, Months, NaiveDate};

pub fn days_in_month(year: i32, month: u32) -> u32 {
    (28..=31)
        .rev()
        .find(|&day| NaiveDate::from_ymd_opt(year, month, day).is_some())
        .unwrap_or(28)
}

pub fn first_day_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

pub fn last_day_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(days_in_month(date.year(), date.month()))
        .unwrap_or(date)
}

/// Adds whole months, clamping the day to the end of the target month
/// (Jan 31 + 1 month = Feb 28/29). Returns `None` past the calendar range.
pub fn add_months(date: NaiveDate, months: u32) -> Option<NaiveDate> {
    date.checked_add_months(Months::new(months))
}

pub fn add_years(date: NaiveDate, years: u32) -> Option<NaiveDate> {
    years
        .checked_mul(12)
        .and_then(|months| add_months(date, months))
}

/// First day of each month of the horizon, starting at the month containing `as_of`.
pub fn month_starts(as_of: NaiveDate, horizon_months: i64) -> Vec<NaiveDate> {
    if horizon_months <= 0 {
        return Vec::new();
    }

    let start = first_day_of_month(as_of);
    let horizon = u32::try_from(horizon_months).unwrap_or(u32::MAX);

    (0..horizon).map_while(|i| add_months(start, i)).collect()
}

pub fn month_key(date: NaiveDate) -> (i32, u32) {
    (date.year(), date.month())
}

/// Short label used to align series on a chart axis, e.g. "Jan 2025".
pub fn month_label(date: NaiveDate) -> String {
    date.format("%b %Y").to_string()
}

/// Parses a stored date. Accepts "YYYY-MM-DD" and timestamps that start with it
/// ("YYYY-MM-DD HH:MM:SS", "YYYY-MM-DDTHH:MM:SSZ").
pub fn parse_date(raw: &str) -> Result<NaiveDate> {
    let trimmed = raw.trim();
    let date_part = match trimmed.get(10..11) {
        Some("T") | Some(" ") => &trimmed[..10],
        _ => trimmed,
    };

    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").map_err(|_| {
        ForecastError::DateError(format!(
            "Invalid date format: '{}'. Expected YYYY-MM-DD",
            raw
        ))
    })
}

/// Like [`parse_date`], but a missing or blank value is `Ok(None)`.
pub fn parse_optional_date(raw: Option<&str>) -> Result<Option<NaiveDate>> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => parse_date(value).map(Some),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_days_in_month() {
        assert_eq!(days_in_month(2023, 2), 28);
        assert_eq!(days_in_month(2024, 2), 29);
        assert_eq!(days_in_month(2023, 4), 30);
        assert_eq!(days_in_month(2023, 12), 31);
        assert_eq!(days_in_month(1900, 2), 28);
        assert_eq!(days_in_month(2000, 2), 29);
    }

    #[test]
    fn test_month_bounds() {
        let date = NaiveDate::from_ymd_opt(2024, 2, 17).unwrap();
        assert_eq!(
            first_day_of_month(date),
            NaiveDate::from_ymd_opt(2024, 2, 1).unwrap()
        );
        assert_eq!(
            last_day_of_month(date),
            NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()
        );
    }

    #[test]
    fn test_add_months_clamps_day() {
        let date = NaiveDate::from_ymd_opt(2023, 1, 31).unwrap();
        assert_eq!(
            add_months(date, 1),
            NaiveDate::from_ymd_opt(2023, 2, 28)
        );
        assert_eq!(
            add_months(date, 12),
            NaiveDate::from_ymd_opt(2024, 1, 31)
        );

        let leap = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        assert_eq!(add_years(leap, 1), NaiveDate::from_ymd_opt(2025, 2, 28));
    }

    #[test]
    fn test_month_starts() {
        let as_of = NaiveDate::from_ymd_opt(2024, 11, 20).unwrap();
        let months = month_starts(as_of, 3);
        assert_eq!(
            months,
            vec![
                NaiveDate::from_ymd_opt(2024, 11, 1).unwrap(),
                NaiveDate::from_ymd_opt(2024, 12, 1).unwrap(),
                NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            ]
        );

        assert!(month_starts(as_of, 0).is_empty());
        assert!(month_starts(as_of, -5).is_empty());
    }

    #[test]
    fn test_month_label_and_key() {
        let date = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        assert_eq!(month_label(date), "Jan 2025");
        assert_eq!(month_key(date), (2025, 1));
    }

    #[test]
    fn test_parse_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        assert_eq!(parse_date("2024-03-05").unwrap(), expected);
        assert_eq!(parse_date(" 2024-03-05 ").unwrap(), expected);
        assert_eq!(parse_date("2024-03-05 00:00:00").unwrap(), expected);
        assert_eq!(parse_date("2024-03-05T10:30:00Z").unwrap(), expected);

        assert!(parse_date("05/03/2024").is_err());
        assert!(parse_date("2024-02-30").is_err());
        assert!(parse_date("").is_err());
    }

    #[test]
    fn test_parse_optional_date() {
        assert_eq!(parse_optional_date(None).unwrap(), None);
        assert_eq!(parse_optional_date(Some("  ")).unwrap(), None);
        assert_eq!(
            parse_optional_date(Some("2024-01-01")).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 1)
        );
        assert!(parse_optional_date(Some("not a date")).is_err());
    }
}
