//! Severity level definitions

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Ordered importance of a log message. The filter compares on this order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub enum Severity {
    Trace = 0,
    Debug = 1,
    #[default]
    Info = 2,
    Warn = 3,
    Error = 4,
    Fatal = 5,
}

impl Severity {
    pub const ALL: [Severity; 6] = [
        Severity::Trace,
        Severity::Debug,
        Severity::Info,
        Severity::Warn,
        Severity::Error,
        Severity::Fatal,
    ];

    pub fn to_str(&self) -> &'static str {
        match self {
            Severity::Trace => "TRACE",
            Severity::Debug => "DEBUG",
            Severity::Info => "INFO",
            Severity::Warn => "WARN",
            Severity::Error => "ERROR",
            Severity::Fatal => "FATAL",
        }
    }

    /// Error and Fatal are routed to stderr by the console appender.
    #[inline]
    pub fn is_error(&self) -> bool {
        *self >= Severity::Error
    }

    #[cfg(feature = "console")]
    pub fn color_code(&self) -> colored::Color {
        use colored::Color::*;
        match self {
            Severity::Trace => BrightBlack,
            Severity::Debug => Blue,
            Severity::Info => Green,
            Severity::Warn => Yellow,
            Severity::Error => Red,
            Severity::Fatal => BrightRed,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_str())
    }
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "TRACE" => Ok(Severity::Trace),
            "DEBUG" => Ok(Severity::Debug),
            "INFO" => Ok(Severity::Info),
            "WARN" | "WARNING" => Ok(Severity::Warn),
            "ERROR" => Ok(Severity::Error),
            "FATAL" => Ok(Severity::Fatal),
            _ => Err(format!("Invalid severity: '{}'", s)),
        }
    }
}

/// Lenient parse used by configuration loaders.
///
/// Matching is case-insensitive. Unrecognized text resolves to
/// [`Severity::Info`] instead of failing; use `str::parse` when an error is
/// wanted.
///
/// ```
/// use gpa_logger::{severity_from_string, Severity};
///
/// assert_eq!(severity_from_string("warn"), Severity::Warn);
/// assert_eq!(severity_from_string("bogus"), Severity::Info);
/// ```
pub fn severity_from_string(text: &str) -> Severity {
    text.parse().unwrap_or_default()
}
