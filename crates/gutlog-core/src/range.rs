//! Time ranges for log queries

use chrono::{DateTime, Days, Local, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// A half-open `[from, to)` range of log timestamps; `None` leaves that end open
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

impl DateRange {
    /// Every log
    pub fn all() -> Self {
        Self::default()
    }

    pub fn between(from: DateTime<Utc>, to: DateTime<Utc>) -> Self {
        Self {
            from: Some(from),
            to: Some(to),
        }
    }

    /// A local calendar day
    pub fn day(date: NaiveDate) -> Self {
        Self::local_days(date, date)
    }

    /// Local calendar days `first..=last`, in any order
    pub fn local_days(first: NaiveDate, last: NaiveDate) -> Self {
        let (first, last) = if first <= last {
            (first, last)
        } else {
            (last, first)
        };
        Self {
            from: Some(local_midnight(first)),
            to: last.checked_add_days(Days::new(1)).map(local_midnight),
        }
    }

    /// Local days from `first` through `last`; a missing bound leaves that end open
    pub fn from_local_days(first: Option<NaiveDate>, last: Option<NaiveDate>) -> Self {
        match (first, last) {
            (Some(first), Some(last)) => Self::local_days(first, last),
            (first, last) => Self {
                from: first.map(local_midnight),
                to: last
                    .and_then(|d| d.checked_add_days(Days::new(1)))
                    .map(local_midnight),
            },
        }
    }

    pub fn contains(&self, ts: &DateTime<Utc>) -> bool {
        self.from.map_or(true, |from| *ts >= from) && self.to.map_or(true, |to| *ts < to)
    }
}

/// Start of a local calendar day, in UTC
///
/// Days that begin inside a DST gap start at the first valid instant.
fn local_midnight(date: NaiveDate) -> DateTime<Utc> {
    let naive = date.and_time(NaiveTime::MIN);
    match Local.from_local_datetime(&naive).earliest() {
        Some(ts) => ts.with_timezone(&Utc),
        None => Utc.from_utc_datetime(&naive),
    }
}
