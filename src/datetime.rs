// used for the underlying instants and calendar arithmetic
use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, NaiveDateTime, TimeZone, Timelike, Utc};

// custom made ordering for datetimes
use std::cmp::Ordering;

// used to print out readable forms of a datetime
use std::fmt;

use crate::error::{MementoError, Result};

// Sun, 06 Nov 1994 08:49:37 GMT
pub const PATTERN_RFC1123: &str = "%a, %d %b %Y %H:%M:%S GMT";
pub const PATTERN_AMERICAN_SHORT: &str = "%m-%d-%Y";

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

pub fn month_name(month: u32) -> Option<&'static str> {
    MONTH_NAMES.get(month.checked_sub(1)? as usize).copied()
}

/// Converts a month title (like "December") into its number (12).
pub fn month_from_name(name: &str) -> Option<u32> {
    MONTH_NAMES
        .iter()
        .position(|m| m.eq_ignore_ascii_case(name.trim()))
        .map(|i| i as u32 + 1)
}

// ------------- DisplayFormat -------------
/// Patterns used when a datetime is shown to a person. Parsing and storage
/// never look at these.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayFormat {
    date_pattern: String,
    time_pattern: String,
}

impl DisplayFormat {
    pub fn new(date_pattern: &str, time_pattern: &str) -> Result<Self> {
        for pattern in [date_pattern, time_pattern] {
            if StrftimeItems::new(pattern).any(|item| matches!(item, Item::Error)) {
                return Err(MementoError::Config(format!(
                    "Invalid display pattern: {}",
                    pattern
                )));
            }
        }
        Ok(Self {
            date_pattern: date_pattern.to_owned(),
            time_pattern: time_pattern.to_owned(),
        })
    }
    pub fn date_pattern(&self) -> &str {
        &self.date_pattern
    }
    pub fn time_pattern(&self) -> &str {
        &self.time_pattern
    }
}
impl Default for DisplayFormat {
    // Jan 13, 2012 6:52:01 PM
    fn default() -> Self {
        Self {
            date_pattern: "%b %-d, %Y".to_owned(),
            time_pattern: "%-I:%M:%S %p".to_owned(),
        }
    }
}

// ------------- TemporalValue -------------
/// A point in time carrying its calendar day, month and year (UTC).
///
/// Ordering is day-granular first: two values on the same calendar day are
/// equal no matter the time of day, values on different days compare by
/// their instants. `==` follows the same rule, use [`TemporalValue::same_instant`]
/// for exact comparison.
#[derive(Clone, Debug)]
pub struct TemporalValue {
    day: u32,
    month: u32,
    year: i32,
    instant: DateTime<Utc>,
}

impl TemporalValue {
    pub fn now() -> Self {
        Self::from_instant(Utc::now())
    }
    pub fn from_instant(instant: DateTime<Utc>) -> Self {
        Self {
            day: instant.day(),
            month: instant.month(),
            year: instant.year(),
            instant,
        }
    }
    /// Midnight at the start of the given day.
    pub fn from_ymd(day: u32, month: u32, year: i32) -> Result<Self> {
        let midnight = NaiveDate::from_ymd_opt(year, month, day)
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .ok_or_else(|| {
                MementoError::parse(format!("Invalid date: {}-{}-{}", month, day, year))
            })?;
        Ok(Self::from_instant(midnight.and_utc()))
    }
    /// Incoming date is in RFC 1123 format, e.g. `Sat, 22 Dec 2007 09:05:17 GMT`.
    pub fn parse_rfc1123(date: &str) -> Result<Self> {
        let trimmed = date.trim();
        // the weekday is redundant and not every archive gets it right
        let body = match trimmed.split_once(',') {
            Some((_, rest)) => rest.trim(),
            None => trimmed,
        };
        let (stamp, offset) = match body.rsplit_once(char::is_whitespace) {
            Some((stamp, zone)) => match zone_offset(zone) {
                Some(offset) => (stamp.trim(), Some(offset)),
                // no zone given, read it as GMT
                None => (body, None),
            },
            None => return Err(MementoError::parse(format!("Not an RFC 1123 date: [{}]", date))),
        };
        let naive = NaiveDateTime::parse_from_str(stamp, "%d %b %Y %H:%M:%S")
            .map_err(|e| MementoError::parse(format!("Not an RFC 1123 date: [{}] {}", date, e)))?;
        let instant = match offset {
            Some(offset) => offset
                .from_local_datetime(&naive)
                .single()
                .ok_or_else(|| MementoError::parse(format!("Ambiguous date: [{}]", date)))?
                .with_timezone(&Utc),
            None => naive.and_utc(),
        };
        Ok(Self::from_instant(instant))
    }
    /// Date in mm-dd-yyyy format, e.g. `12-31-2001`.
    pub fn parse_short_date(date: &str) -> Result<Self> {
        let parsed = NaiveDate::parse_from_str(date.trim(), PATTERN_AMERICAN_SHORT)
            .map_err(|e| MementoError::parse(format!("Not a short date: [{}] {}", date, e)))?;
        Self::from_ymd(parsed.day(), parsed.month(), parsed.year())
    }
    pub fn day(&self) -> u32 {
        self.day
    }
    pub fn month(&self) -> u32 {
        self.month
    }
    pub fn year(&self) -> i32 {
        self.year
    }
    pub fn instant(&self) -> DateTime<Utc> {
        self.instant
    }
    /// RFC 1123 in GMT, as sent in `Accept-Datetime`.
    pub fn to_rfc1123(&self) -> String {
        self.instant.format(PATTERN_RFC1123).to_string()
    }
    pub fn format_date(&self, format: &DisplayFormat) -> String {
        self.instant.format(format.date_pattern()).to_string()
    }
    pub fn format_date_time(&self, format: &DisplayFormat) -> String {
        format!(
            "{} {}",
            self.format_date(format),
            self.instant.format(format.time_pattern())
        )
    }
    /// Moves the time of day to 23:59, the date stays put.
    pub fn set_to_end_of_day(&mut self) {
        if let Some(adjusted) = self.instant.with_hour(23).and_then(|t| t.with_minute(59)) {
            self.instant = adjusted;
        }
    }
    /// Same date and time down to the second.
    pub fn same_instant(&self, other: &Self) -> bool {
        self.instant.timestamp() == other.instant.timestamp()
    }
    pub fn same_calendar_day(&self, other: &Self) -> bool {
        self.day == other.day && self.month == other.month && self.year == other.year
    }
    /// Whole days from `self` to `later`, truncated toward zero.
    pub fn days_until(&self, later: &Self) -> i64 {
        (later.instant - self.instant).num_days()
    }
}

fn zone_offset(zone: &str) -> Option<FixedOffset> {
    match zone.to_ascii_uppercase().as_str() {
        "GMT" | "UTC" | "UT" | "Z" => FixedOffset::east_opt(0),
        numeric
            if numeric.len() == 5
                && numeric.is_ascii()
                && (numeric.starts_with('+') || numeric.starts_with('-')) =>
        {
            let hours: i32 = numeric[1..3].parse().ok()?;
            let minutes: i32 = numeric[3..5].parse().ok()?;
            let seconds = hours * 3600 + minutes * 60;
            if numeric.starts_with('-') {
                FixedOffset::west_opt(seconds)
            } else {
                FixedOffset::east_opt(seconds)
            }
        }
        _ => None,
    }
}

impl Ord for TemporalValue {
    fn cmp(&self, other: &Self) -> Ordering {
        if self.same_calendar_day(other) {
            Ordering::Equal
        } else {
            self.instant.cmp(&other.instant)
        }
    }
}
impl PartialOrd for TemporalValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl PartialEq for TemporalValue {
    fn eq(&self, other: &Self) -> bool {
        self.same_calendar_day(other)
    }
}
impl Eq for TemporalValue {}
impl fmt::Display for TemporalValue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.instant.format(PATTERN_RFC1123))
    }
}
