//! Time handling for the NextBus feed.
//!
//! Schedules give wall-clock times as "HH:MM:SS" strings with no date or
//! timezone, and use "--" for stops a run does not serve. Vehicle location
//! queries take a reference time in milliseconds since the Unix epoch.

use chrono::{DateTime, NaiveDateTime, NaiveTime, Utc};
use std::fmt;

/// Placeholder the feed uses for a stop with no scheduled time.
pub const NO_TIME: &str = "--";

/// Error returned when parsing an invalid schedule time.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid schedule time {value:?}: {reason}")]
pub struct TimeError {
    value: String,
    reason: &'static str,
}

impl TimeError {
    fn new(value: &str, reason: &'static str) -> Self {
        Self {
            value: value.to_string(),
            reason,
        }
    }

    /// The text that failed to parse.
    pub fn value(&self) -> &str {
        &self.value
    }
}

/// Parse a schedule cell.
///
/// Returns `Ok(None)` for the "--" placeholder and a wall-clock time for
/// "HH:MM:SS". Surrounding whitespace is ignored.
///
/// # Examples
///
/// ```
/// use chrono::NaiveTime;
/// use nextbus::domain::parse_schedule_time;
///
/// assert_eq!(parse_schedule_time("--").unwrap(), None);
/// assert_eq!(
///     parse_schedule_time("08:15:00").unwrap(),
///     NaiveTime::from_hms_opt(8, 15, 0)
/// );
///
/// assert!(parse_schedule_time("8:15").is_err());
/// assert!(parse_schedule_time("24:00:00").is_err());
/// ```
pub fn parse_schedule_time(s: &str) -> Result<Option<NaiveTime>, TimeError> {
    let s = s.trim();
    if s == NO_TIME {
        return Ok(None);
    }

    // Must be exactly 8 characters: HH:MM:SS
    if s.len() != 8 {
        return Err(TimeError::new(s, "expected HH:MM:SS format"));
    }

    let bytes = s.as_bytes();
    if bytes[2] != b':' || bytes[5] != b':' {
        return Err(TimeError::new(s, "expected colons at positions 2 and 5"));
    }

    let hour =
        parse_two_digits(&bytes[0..2]).ok_or_else(|| TimeError::new(s, "invalid hour digits"))?;
    if hour > 23 {
        return Err(TimeError::new(s, "hour must be 0-23"));
    }

    let minute =
        parse_two_digits(&bytes[3..5]).ok_or_else(|| TimeError::new(s, "invalid minute digits"))?;
    if minute > 59 {
        return Err(TimeError::new(s, "minute must be 0-59"));
    }

    let second =
        parse_two_digits(&bytes[6..8]).ok_or_else(|| TimeError::new(s, "invalid second digits"))?;
    if second > 59 {
        return Err(TimeError::new(s, "second must be 0-59"));
    }

    NaiveTime::from_hms_opt(hour, minute, second)
        .map(Some)
        .ok_or_else(|| TimeError::new(s, "invalid time"))
}

fn parse_two_digits(bytes: &[u8]) -> Option<u32> {
    match bytes {
        [a, b] if a.is_ascii_digit() && b.is_ascii_digit() => {
            Some(u32::from(a - b'0') * 10 + u32::from(b - b'0'))
        }
        _ => None,
    }
}

/// Reference time for vehicle location queries.
///
/// The feed reports vehicles that moved since this instant. Zero asks the
/// server for its default lookback window (typically the last 15 minutes).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReferenceTime {
    /// Let the server pick the lookback window.
    #[default]
    Default,
    /// Milliseconds since the Unix epoch, sent verbatim.
    EpochMillis(i64),
    /// A calendar timestamp, converted to epoch milliseconds.
    At(DateTime<Utc>),
}

impl ReferenceTime {
    /// Milliseconds since the Unix epoch, as sent in the `t` parameter.
    ///
    /// # Examples
    ///
    /// ```
    /// use chrono::{TimeZone, Utc};
    /// use nextbus::domain::ReferenceTime;
    ///
    /// assert_eq!(ReferenceTime::Default.epoch_millis(), 0);
    /// assert_eq!(ReferenceTime::from(1_700_000_000_000).epoch_millis(), 1_700_000_000_000);
    ///
    /// let at = Utc.with_ymd_and_hms(1970, 1, 1, 0, 0, 1).unwrap();
    /// assert_eq!(ReferenceTime::from(at).epoch_millis(), 1000);
    /// ```
    pub fn epoch_millis(&self) -> i64 {
        match self {
            ReferenceTime::Default => 0,
            ReferenceTime::EpochMillis(ms) => *ms,
            ReferenceTime::At(at) => at.timestamp_millis(),
        }
    }
}

impl From<i64> for ReferenceTime {
    fn from(ms: i64) -> Self {
        ReferenceTime::EpochMillis(ms)
    }
}

impl From<DateTime<Utc>> for ReferenceTime {
    fn from(at: DateTime<Utc>) -> Self {
        ReferenceTime::At(at)
    }
}

/// Naive timestamps are taken to be UTC.
impl From<NaiveDateTime> for ReferenceTime {
    fn from(at: NaiveDateTime) -> Self {
        ReferenceTime::At(at.and_utc())
    }
}

impl fmt::Display for ReferenceTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.epoch_millis())
    }
}
