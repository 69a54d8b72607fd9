//! Calendar date utilities: parsing, formatting, day enumeration and date windows

use std::error::Error;
use std::fmt::{Display, Formatter};

use chrono::{DateTime, Duration, Local, NaiveDate, NaiveDateTime, NaiveTime};

/// Date-time layouts accepted by [`parse_date`], tried in this order (after RFC 3339)
const DATE_TIME_LAYOUTS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

/// Date-only layouts accepted by [`parse_date`]. They resolve to midnight.
const DATE_LAYOUTS: &[&str] = &[
    "%Y-%m-%d",
    "%Y.%m.%d",
    "%d.%m.%Y",
];

/// Parse a date or a date-time.
///
/// An absent (or empty) input returns the current local moment: an entry with an unknown start is treated as starting now.
/// Timestamps carrying an offset (e.g. `2024-01-05T10:00:00+03:00`) are converted to local time, so that they compare with each other as instants.
pub fn parse_date(input: Option<&str>) -> Result<NaiveDateTime, Box<dyn Error>> {
    let input = match input.map(str::trim) {
        None | Some("") => return Ok(Local::now().naive_local()),
        Some(s) => s,
    };

    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Ok(dt.with_timezone(&Local).naive_local());
    }
    for layout in DATE_TIME_LAYOUTS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(input, layout) {
            return Ok(dt);
        }
    }
    for layout in DATE_LAYOUTS {
        if let Ok(d) = NaiveDate::parse_from_str(input, layout) {
            return Ok(midnight(d));
        }
    }

    Err(format!("Unable to parse date {:?}", input).into())
}

/// The first instant of a calendar day
pub fn midnight(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN)
}


/// The date layouts this crate knows how to produce
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DateFormat {
    /// `dd.MM.yyyy`, used in task lists
    DayMonthYear,
    /// `dd.MM`, used for grid column labels
    DayMonth,
    /// `yyyy.MM.dd`, the layout the backend expects in its query strings and uses for its day keys
    Api,
    /// `yyyy-MM-dd`
    Iso,
}

impl DateFormat {
    fn layout(&self) -> &'static str {
        match self {
            DateFormat::DayMonthYear => "%d.%m.%Y",
            DateFormat::DayMonth => "%d.%m",
            DateFormat::Api => "%Y.%m.%d",
            DateFormat::Iso => "%Y-%m-%d",
        }
    }
}

/// Format the calendar date part of `date`
pub fn format_date(date: NaiveDate, format: DateFormat) -> String {
    date.format(format.layout()).to_string()
}


/// Every calendar day from `from` to `to`, both included, in ascending order.
///
/// This is empty if `from > to`.
pub fn enumerate_days(from: NaiveDate, to: NaiveDate) -> Days {
    Days { next: Some(from), last: to }
}

/// Iterator returned by [`enumerate_days`]. Clone it to restart from the same point.
#[derive(Clone, Debug)]
pub struct Days {
    next: Option<NaiveDate>,
    last: NaiveDate,
}

impl Iterator for Days {
    type Item = NaiveDate;

    fn next(&mut self) -> Option<NaiveDate> {
        let current = self.next.filter(|d| *d <= self.last)?;
        self.next = current.succ_opt();
        Some(current)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = match self.next {
            Some(d) if d <= self.last => (self.last - d).num_days() as usize + 1,
            _ => 0,
        };
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Days {}


/// An inclusive range of calendar days
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DateWindow {
    from: NaiveDate,
    to: NaiveDate,
}

impl DateWindow {
    /// Create a window. Fails when `from` is after `to`.
    pub fn new(from: NaiveDate, to: NaiveDate) -> Result<Self, Box<dyn Error>> {
        if enumerate_days(from, to).len() == 0 {
            return Err(format!("Invalid date window: {} is after {}", from, to).into());
        }
        Ok(Self { from, to })
    }

    /// Build a window from two user-supplied strings.
    ///
    /// Unlike [`parse_date`], missing bounds are an error here, they never default to "now".
    pub fn parse(from: Option<&str>, to: Option<&str>) -> Result<Self, Box<dyn Error>> {
        let from = parse_bound(from, "start")?;
        let to = parse_bound(to, "end")?;
        Self::new(from, to)
    }

    /// The `days`-long window that ends on `today`. It is clamped to the earliest representable date.
    pub fn lookback(today: NaiveDate, days: u32) -> Self {
        let from = today
            .checked_sub_signed(Duration::days(days as i64))
            .unwrap_or(NaiveDate::MIN);
        Self { from, to: today }
    }

    pub fn from(&self) -> NaiveDate { self.from }
    pub fn to(&self) -> NaiveDate   { self.to   }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from <= date && date <= self.to
    }

    /// The days of this window, used as the grid's date axis
    pub fn days(&self) -> Days {
        enumerate_days(self.from, self.to)
    }
}

impl Display for DateWindow {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}..{}", format_date(self.from, DateFormat::Iso), format_date(self.to, DateFormat::Iso))
    }
}

fn parse_bound(input: Option<&str>, which: &str) -> Result<NaiveDate, Box<dyn Error>> {
    match input.map(str::trim) {
        None | Some("") => Err(format!("Missing {} date", which).into()),
        Some(s) => Ok(parse_date(Some(s))?.date()),
    }
}
