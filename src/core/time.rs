use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, TimeZone, Utc};

use crate::core::TimeUnit;

/// Parses a temporal observation value with a strftime-style `format`.
///
/// Formats without a day (`%Y`, `%Y-%m`) are completed to the first day of the
/// period so they map onto a concrete instant.
#[must_use]
pub fn parse_time(value: &str, format: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(datetime) = DateTime::parse_from_rfc3339(value) {
        return Some(datetime.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
        return Some(Utc.from_utc_datetime(&naive));
    }
    if let Ok(date) = NaiveDate::parse_from_str(value, format) {
        return date.and_hms_opt(0, 0, 0).map(|naive| Utc.from_utc_datetime(&naive));
    }
    if !format.contains("%d") {
        let completed_format = if format.contains("%m") {
            format!("{format}-%d")
        } else {
            format!("{format}-%m-%d")
        };
        let completed_value = if format.contains("%m") {
            format!("{value}-01")
        } else {
            format!("{value}-01-01")
        };
        if let Ok(date) = NaiveDate::parse_from_str(&completed_value, &completed_format) {
            return date.and_hms_opt(0, 0, 0).map(|naive| Utc.from_utc_datetime(&naive));
        }
    }
    None
}

#[must_use]
pub fn to_millis(time: DateTime<Utc>) -> f64 {
    time.timestamp_millis() as f64
}

#[must_use]
pub fn from_millis(millis: f64) -> Option<DateTime<Utc>> {
    if !millis.is_finite() {
        return None;
    }
    DateTime::from_timestamp_millis(millis.round() as i64)
}

/// Start of the `unit` period containing `time`.
#[must_use]
pub fn floor_to_unit(time: DateTime<Utc>, unit: TimeUnit) -> DateTime<Utc> {
    let date = time.date_naive();
    let floored = match unit {
        TimeUnit::Year => NaiveDate::from_ymd_opt(date.year(), 1, 1).and_then(midnight),
        TimeUnit::Month => NaiveDate::from_ymd_opt(date.year(), date.month(), 1).and_then(midnight),
        TimeUnit::Week => {
            let offset = i64::from(date.weekday().num_days_from_monday());
            midnight(date - Duration::days(offset))
        }
        TimeUnit::Day => midnight(date),
        TimeUnit::Hour => return truncate_seconds(time, 3_600),
        TimeUnit::Minute => return truncate_seconds(time, 60),
        TimeUnit::Second => return truncate_seconds(time, 1),
    };
    floored.unwrap_or(time)
}

/// Advances `time` by `steps` whole units.
#[must_use]
pub fn offset_by_unit(time: DateTime<Utc>, unit: TimeUnit, steps: i32) -> Option<DateTime<Utc>> {
    match unit {
        TimeUnit::Year => time.with_year(time.year() + steps),
        TimeUnit::Month => {
            let months = time.year() * 12 + time.month0() as i32 + steps;
            let year = months.div_euclid(12);
            let month0 = months.rem_euclid(12) as u32;
            let date = NaiveDate::from_ymd_opt(year, month0 + 1, time.day().min(28))?;
            Some(Utc.from_utc_datetime(&date.and_time(time.time())))
        }
        TimeUnit::Week => Some(time + Duration::weeks(i64::from(steps))),
        TimeUnit::Day => Some(time + Duration::days(i64::from(steps))),
        TimeUnit::Hour => Some(time + Duration::hours(i64::from(steps))),
        TimeUnit::Minute => Some(time + Duration::minutes(i64::from(steps))),
        TimeUnit::Second => Some(time + Duration::seconds(i64::from(steps))),
    }
}

/// Label for a tick or tooltip header at the precision of `unit`.
#[must_use]
pub fn format_time(time: DateTime<Utc>, unit: TimeUnit) -> String {
    let pattern = match unit {
        TimeUnit::Year => "%Y",
        TimeUnit::Month => "%m.%Y",
        TimeUnit::Week | TimeUnit::Day => "%d.%m.%Y",
        TimeUnit::Hour | TimeUnit::Minute => "%d.%m.%Y %H:%M",
        TimeUnit::Second => "%d.%m.%Y %H:%M:%S",
    };
    time.format(pattern).to_string()
}

fn midnight(date: NaiveDate) -> Option<DateTime<Utc>> {
    date.and_hms_opt(0, 0, 0)
        .map(|naive| Utc.from_utc_datetime(&naive))
}

fn truncate_seconds(time: DateTime<Utc>, seconds: i64) -> DateTime<Utc> {
    let timestamp = time.timestamp();
    DateTime::from_timestamp(timestamp - timestamp.rem_euclid(seconds), 0).unwrap_or(time)
}

#[cfg(test)]
mod tests {
    use chrono::{Datelike, TimeZone, Timelike, Utc};

    use super::{floor_to_unit, format_time, offset_by_unit, parse_time};
    use crate::core::TimeUnit;

    #[test]
    fn parses_year_only_values() {
        let parsed = parse_time("2020", "%Y").expect("year");
        assert_eq!(parsed.year(), 2020);
        assert_eq!(parsed.month(), 1);
        assert_eq!(parsed.day(), 1);
    }

    #[test]
    fn parses_year_month_and_full_dates() {
        let month = parse_time("2021-07", "%Y-%m").expect("month");
        assert_eq!((month.year(), month.month()), (2021, 7));
        let day = parse_time("2021-07-15", "%Y-%m-%d").expect("day");
        assert_eq!(day.day(), 15);
        assert!(parse_time("not a date", "%Y-%m-%d").is_none());
    }

    #[test]
    fn floors_and_offsets_months_across_year_boundary() {
        let time = Utc.with_ymd_and_hms(2020, 11, 17, 13, 45, 0).unwrap();
        let floored = floor_to_unit(time, TimeUnit::Month);
        assert_eq!((floored.month(), floored.day(), floored.hour()), (11, 1, 0));
        let next = offset_by_unit(floored, TimeUnit::Month, 3).expect("offset");
        assert_eq!((next.year(), next.month()), (2021, 2));
    }

    #[test]
    fn formats_at_unit_precision() {
        let time = Utc.with_ymd_and_hms(2019, 3, 4, 0, 0, 0).unwrap();
        assert_eq!(format_time(time, TimeUnit::Year), "2019");
        assert_eq!(format_time(time, TimeUnit::Month), "03.2019");
        assert_eq!(format_time(time, TimeUnit::Day), "04.03.2019");
    }
}
