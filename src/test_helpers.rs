use crate::Timestamp;
use chrono::{NaiveDate, TimeZone as _};
use chrono_tz::Tz;

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

pub fn at(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> Timestamp {
    at_in(chrono_tz::UTC, year, month, day, hour, minute)
}

pub fn at_in(timezone: Tz, year: i32, month: u32, day: u32, hour: u32, minute: u32) -> Timestamp {
    timezone
        .with_ymd_and_hms(year, month, day, hour, minute, 0)
        .unwrap()
}

pub fn starts<'a, P: 'a>(
    occurrences: impl IntoIterator<Item = crate::Occurrence<'a, P>>,
) -> Vec<Timestamp> {
    occurrences.into_iter().map(|occ| occ.start).collect()
}
