use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::Serialize;
use std::fmt;
use tracing::debug;

/// A named, relative calendar interval resolved against a reference date
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Period {
    Yesterday,
    LastWeek,
    LastMonth,
    LastYear,
    #[default]
    ThisYear,
    /// Labelled "All Time" but resolves to the current year
    All,
}

impl Period {
    pub const ALL: [Period; 6] = [
        Period::Yesterday,
        Period::LastWeek,
        Period::LastMonth,
        Period::LastYear,
        Period::ThisYear,
        Period::All,
    ];

    /// Parse a period name. Unknown names fall back to `ThisYear`.
    pub fn parse_lenient(name: &str) -> Period {
        match name.trim() {
            "yesterday" => Period::Yesterday,
            "lastWeek" | "last-week" => Period::LastWeek,
            "lastMonth" | "last-month" => Period::LastMonth,
            "lastYear" | "last-year" => Period::LastYear,
            "thisYear" | "this-year" => Period::ThisYear,
            "all" => Period::All,
            other => {
                debug!(period = other, "unrecognized period, using thisYear");
                Period::ThisYear
            }
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Period::Yesterday => "Yesterday",
            Period::LastWeek => "Last Week",
            Period::LastMonth => "Last Month",
            Period::LastYear => "Last Year",
            Period::ThisYear => "This Year",
            Period::All => "All Time",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Period::Yesterday => "yesterday",
            Period::LastWeek => "lastWeek",
            Period::LastMonth => "lastMonth",
            Period::LastYear => "lastYear",
            Period::ThisYear => "thisYear",
            Period::All => "all",
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Inclusive interval, first millisecond of `start`'s day to the last of `end`'s
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl DateRange {
    fn days(first: NaiveDate, last: NaiveDate) -> Self {
        Self {
            start: first.and_time(NaiveTime::MIN),
            end: last.and_time(end_of_day()),
        }
    }

    pub fn contains(&self, at: NaiveDateTime) -> bool {
        at >= self.start && at <= self.end
    }
}

fn end_of_day() -> NaiveTime {
    NaiveTime::from_hms_milli_opt(23, 59, 59, 999).unwrap_or(NaiveTime::MIN)
}

fn year_span(year: i32, fallback: NaiveDate) -> (NaiveDate, NaiveDate) {
    let first = NaiveDate::from_ymd_opt(year, 1, 1).unwrap_or(fallback);
    let last = NaiveDate::from_ymd_opt(year, 12, 31).unwrap_or(fallback);
    (first, last)
}

/// Resolve `period` to a day-bounded interval relative to `today`
pub fn date_range_for(period: Period, today: NaiveDate) -> DateRange {
    match period {
        Period::Yesterday => {
            let day = today - Duration::days(1);
            DateRange::days(day, day)
        }
        Period::LastWeek => {
            let since_sunday = i64::from(today.weekday().num_days_from_sunday());
            DateRange::days(
                today - Duration::days(since_sunday + 7),
                today - Duration::days(since_sunday + 1),
            )
        }
        Period::LastMonth => {
            let first_of_this = today.with_day(1).unwrap_or(today);
            let last_of_prev = first_of_this - Duration::days(1);
            let first_of_prev = last_of_prev.with_day(1).unwrap_or(last_of_prev);
            DateRange::days(first_of_prev, last_of_prev)
        }
        Period::LastYear => {
            let (first, last) = year_span(today.year() - 1, today);
            DateRange::days(first, last)
        }
        Period::ThisYear | Period::All => {
            let (first, last) = year_span(today.year(), today);
            DateRange::days(first, last)
        }
    }
}
