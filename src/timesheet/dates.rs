use super::error::{ValidationError, ValidationResult};
use chrono::{Datelike, Days, NaiveDate, Weekday};
use clap::ValueEnum;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "PascalCase")]
pub enum QueryRange {
    #[default]
    Weekly,
    Monthly,
    Daily,
}

impl QueryRange {
    pub fn as_str(self) -> &'static str {
        match self {
            QueryRange::Weekly => "Weekly",
            QueryRange::Monthly => "Monthly",
            QueryRange::Daily => "Daily",
        }
    }
}

fn weekday(name: &str) -> Option<Weekday> {
    let weekday: Weekday = name.parse().ok()?;
    // only full names, "mon" is more likely a typo than a request
    (name.len() > 3).then_some(weekday)
}

/// Parses `input` with the user's date pattern.
pub fn parse_date(input: &str, date_format: &str) -> ValidationResult<NaiveDate> {
    NaiveDate::parse_from_str(input.trim(), date_format)
        .map_err(|_| ValidationError::DateFormat(date_format.to_string()))
}

/// Works out the date of a timesheet entry.
///
/// A weekday name picks that day of the current Monday-based week.
pub fn resolve_entry_date(
    input: Option<&str>,
    yesterday: bool,
    today: NaiveDate,
    date_format: &str,
) -> ValidationResult<NaiveDate> {
    if yesterday {
        return today
            .checked_sub_days(Days::new(1))
            .ok_or_else(|| ValidationError::DateFormat(date_format.to_string()));
    }

    let Some(input) = input.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(today);
    };

    if let Some(day) = weekday(input) {
        let monday = today - Days::new(today.weekday().num_days_from_monday() as u64);
        return Ok(monday + Days::new(day.num_days_from_monday() as u64));
    }

    parse_date(input, date_format)
}

/// The reference date of the period before the one containing `date`.
pub fn previous_period(date: NaiveDate, range: QueryRange) -> NaiveDate {
    let days = match range {
        QueryRange::Daily => 1,
        QueryRange::Weekly => 7,
        QueryRange::Monthly => date.day() as u64 + 1,
    };
    date - Days::new(days)
}

/// Server dates look like `2024-03-5T00:00:00`; the day may be unpadded.
pub fn parse_server_date(raw: &str) -> Option<NaiveDate> {
    let date = raw.split("T00").next()?;
    NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d").ok()
}
