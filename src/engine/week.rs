//! ISO-8601 week bucketing for weekly fragments.

use chrono::{Datelike, Duration, NaiveTime, Weekday};
use serde::Serialize;

use crate::domain::TimeMs;

/// Calendar week containing a given instant.
///
/// Weeks start Monday 00:00 UTC. `start_ms` is inclusive, `end_ms` exclusive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekInformation {
    pub week_number: u32,
    pub year: i32,
    pub week_date: String,
    #[serde(rename = "startDate")]
    pub start_ms: TimeMs,
    #[serde(rename = "endDate")]
    pub end_ms: TimeMs,
}

impl WeekInformation {
    /// The week immediately before this one, crossing ISO years as needed.
    pub fn previous(&self) -> WeekInformation {
        week_information(self.start_ms.minus_days(7))
    }
}

pub fn week_information(now: TimeMs) -> WeekInformation {
    let date = now.to_datetime().date_naive();
    let iso = date.iso_week();
    let days_from_monday = date.weekday().num_days_from_monday() as i64;
    let monday = date - Duration::days(days_from_monday);
    debug_assert_eq!(monday.weekday(), Weekday::Mon);

    let start_ms = TimeMs::from_datetime(monday.and_time(NaiveTime::MIN).and_utc());

    WeekInformation {
        week_number: iso.week(),
        year: iso.year(),
        week_date: format!("{}-W{:02}", iso.year(), iso.week()),
        start_ms,
        end_ms: start_ms.plus_days(7),
    }
}
