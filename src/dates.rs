use time::{format_description::FormatItem, macros::format_description, Date, OffsetDateTime};

use crate::error::ApiError;

const DATE_FORMAT: &[FormatItem<'static>] = format_description!("[year]-[month]-[day]");

/// Parses a `YYYY-MM-DD` calendar date; anything else is a validation error.
pub fn parse_date(s: &str) -> Result<Date, ApiError> {
    Date::parse(s, DATE_FORMAT).map_err(|_| ApiError::Validation(format!("Invalid date: {s}")))
}

pub fn format_date(date: Date) -> String {
    date.format(DATE_FORMAT)
        .unwrap_or_else(|_| date.to_string())
}

/// Inclusive UTC bounds of a calendar day: `[00:00:00, 23:59:59]`.
pub fn day_bounds(date: Date) -> (OffsetDateTime, OffsetDateTime) {
    let start = date.with_time(time::macros::time!(0:00:00)).assume_utc();
    let end = date.with_time(time::macros::time!(23:59:59)).assume_utc();
    (start, end)
}

pub fn today_utc() -> Date {
    OffsetDateTime::now_utc().date()
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[test]
    fn parses_iso_dates() {
        assert_eq!(parse_date("2024-02-29").unwrap(), date!(2024 - 02 - 29));
    }

    #[test]
    fn rejects_garbage_and_impossible_dates() {
        assert!(parse_date("not-a-date").is_err());
        assert!(parse_date("2023-02-29").is_err());
        assert!(parse_date("2023-13-01").is_err());
    }

    #[test]
    fn formats_back_to_iso() {
        assert_eq!(format_date(date!(2023 - 05 - 01)), "2023-05-01");
    }

    #[test]
    fn day_bounds_are_inclusive_and_span_the_whole_day() {
        let (start, end) = day_bounds(date!(2023 - 05 - 01));
        assert_eq!(start.date(), date!(2023 - 05 - 01));
        assert_eq!(start.time(), time::macros::time!(0:00:00));
        assert_eq!(end.date(), date!(2023 - 05 - 01));
        assert_eq!(end.time(), time::macros::time!(23:59:59));
        assert!(start < end);
    }
}
