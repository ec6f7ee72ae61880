//! Timestamp prefix styles
//!
//! The timestamp is part of the per-message prefix and is rendered once per
//! logical line, at `Begin` or `Complete`.

use chrono::{DateTime, Local, TimeZone};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Time-of-day with milliseconds: `10:30:45.123`
pub const SHORT_FORMAT: &str = "%H:%M:%S%.3f";

/// Date and time with milliseconds: `2025-01-08 10:30:45.123`
pub const FULL_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// Timestamp style for the message prefix
///
/// # Examples
///
/// ```
/// use gpa_logger::TimestampFormat;
///
/// assert!(TimestampFormat::None.now().is_none());
/// assert!(TimestampFormat::Full.now().is_some());
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimestampFormat {
    /// No timestamp in the prefix
    #[default]
    None,

    /// Time of day only
    Short,

    /// Calendar date and time of day
    Full,
}

impl TimestampFormat {
    /// Format `datetime` in this style; `None` for [`TimestampFormat::None`].
    #[must_use]
    pub fn format<Tz>(&self, datetime: &DateTime<Tz>) -> Option<String>
    where
        Tz: TimeZone,
        Tz::Offset: fmt::Display,
    {
        match self {
            TimestampFormat::None => None,
            TimestampFormat::Short => Some(datetime.format(SHORT_FORMAT).to_string()),
            TimestampFormat::Full => Some(datetime.format(FULL_FORMAT).to_string()),
        }
    }

    /// Format the current local time in this style
    #[must_use]
    pub fn now(&self) -> Option<String> {
        self.format(&Local::now())
    }

    pub fn to_str(&self) -> &'static str {
        match self {
            TimestampFormat::None => "none",
            TimestampFormat::Short => "short",
            TimestampFormat::Full => "full",
        }
    }
}

impl fmt::Display for TimestampFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_str())
    }
}

impl FromStr for TimestampFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "none" | "off" | "" => Ok(TimestampFormat::None),
            "short" => Ok(TimestampFormat::Short),
            "full" => Ok(TimestampFormat::Full),
            _ => Err(format!("Invalid timestamp format: '{}'", s)),
        }
    }
}
