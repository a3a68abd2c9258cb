use crate::{
    error::{Error, Result},
    Timestamp,
};
use chrono::{
    DateTime, Duration, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, Offset as _,
    TimeZone as _, Utc,
};
use chrono_tz::Tz;

/// One side of a query window, before it is pinned to a zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    /// A whole day: the start of the day as a lower bound, the start of the
    /// following day as an upper bound.
    Date(NaiveDate),
    /// A wall-clock time in the window's zone.
    Naive(NaiveDateTime),
    At(Timestamp),
}

impl From<NaiveDate> for Bound {
    fn from(date: NaiveDate) -> Self {
        Bound::Date(date)
    }
}

impl From<NaiveDateTime> for Bound {
    fn from(naive: NaiveDateTime) -> Self {
        Bound::Naive(naive)
    }
}

impl From<Timestamp> for Bound {
    fn from(at: Timestamp) -> Self {
        Bound::At(at)
    }
}

impl From<DateTime<Utc>> for Bound {
    fn from(at: DateTime<Utc>) -> Self {
        Bound::At(at.with_timezone(&chrono_tz::UTC))
    }
}

impl Bound {
    fn lower(self, timezone: Tz) -> Timestamp {
        match self {
            Bound::Date(date) => start_of_day(timezone, date),
            Bound::Naive(naive) => localize(timezone, naive),
            Bound::At(at) => at,
        }
    }

    fn upper(self, timezone: Tz) -> Timestamp {
        match self {
            Bound::Date(date) => start_of_day(timezone, date.succ_opt().unwrap_or(date)),
            other => other.lower(timezone),
        }
    }
}

/// The `[from, to)` range a query is interested in. Either side may be open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Window {
    from: Option<Timestamp>,
    to: Option<Timestamp>,
}

impl Window {
    /// Pins both bounds to `timezone`.
    ///
    /// Fails when `to` is earlier than `from`; the bounds are never swapped.
    /// A whole-day `to` is earlier only when the day is over by `from`.
    pub fn new(from: Option<Bound>, to: Option<Bound>, timezone: Tz) -> Result<Self> {
        let from = from.map(|bound| bound.lower(timezone));
        let upper = to.map(|bound| bound.upper(timezone));

        if let (Some(from), Some(bound), Some(upper)) = (from, to, upper) {
            let backwards = match bound {
                Bound::Date(_) => upper <= from,
                _ => upper < from,
            };
            if backwards {
                return Err(Error::InvalidWindow {
                    from,
                    to: bound.lower(timezone),
                });
            }
        }

        Ok(Window { from, to: upper })
    }

    pub fn between(from: impl Into<Bound>, to: impl Into<Bound>, timezone: Tz) -> Result<Self> {
        Window::new(Some(from.into()), Some(to.into()), timezone)
    }

    pub fn unbounded() -> Self {
        Window::default()
    }

    pub fn starting(from: Timestamp) -> Self {
        Window {
            from: Some(from),
            to: None,
        }
    }

    pub fn ending(to: Timestamp) -> Self {
        Window {
            from: None,
            to: Some(to),
        }
    }

    pub fn from_date(&self) -> Option<Timestamp> {
        self.from
    }

    /// Exclusive upper bound.
    pub fn to_date(&self) -> Option<Timestamp> {
        self.to
    }

    pub fn is_unbounded(&self) -> bool {
        self.from.is_none() && self.to.is_none()
    }

    /// Whether the interval `[start, end)` happens inside this window.
    ///
    /// An interval ending exactly at `from` is over; one starting at `from`
    /// counts even when it has no duration.
    pub fn overlaps(&self, start: Timestamp, end: Timestamp) -> bool {
        let before_to = self.to.map_or(true, |to| start < to);
        let after_from = self.from.map_or(true, |from| end > from || start >= from);
        before_to && after_from
    }

    pub(crate) fn or_starting(self, from: Timestamp) -> Self {
        Window {
            from: self.from.or(Some(from)),
            ..self
        }
    }
}

pub(crate) fn start_of_day(timezone: Tz, date: NaiveDate) -> Timestamp {
    localize(timezone, date.and_time(NaiveTime::MIN))
}

/// Makes a wall-clock time aware in `timezone`.
///
/// Ambiguous times resolve to the earliest instant, times inside a DST gap
/// keep the offset in force before the gap.
pub(crate) fn localize(timezone: Tz, naive: NaiveDateTime) -> Timestamp {
    match timezone.from_local_datetime(&naive) {
        LocalResult::Single(at) | LocalResult::Ambiguous(at, _) => at,
        LocalResult::None => {
            let before = naive - Duration::days(1);
            let offset = timezone.offset_from_utc_datetime(&before).fix();
            let utc = naive - Duration::seconds(i64::from(offset.local_minus_utc()));
            timezone.from_utc_datetime(&utc)
        }
    }
}
