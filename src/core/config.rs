//! Logger configuration
//!
//! A [`LoggerConfig`] is a plain value. It is moved into a
//! [`Logger`](super::Logger) at `init` and is read-only from then on; changing
//! it means calling `reinit` with a new value, which replaces the old one
//! wholesale.

use super::{
    error::Result,
    module::{module_mask_from_string, Module},
    severity::{severity_from_string, Severity},
    timestamp::TimestampFormat,
};
use serde::{Deserialize, Serialize};

/// Upper bound, in bytes, on the application name.
pub const MAX_NAME_LENGTH: usize = 1023;

/// Truncate `name` to at most [`MAX_NAME_LENGTH`] bytes without splitting a
/// character.
fn bounded_name(name: &str) -> String {
    if name.len() <= MAX_NAME_LENGTH {
        return name.to_string();
    }
    let mut end = MAX_NAME_LENGTH;
    while !name.is_char_boundary(end) {
        end -= 1;
    }
    name[..end].to_string()
}

/// Active filter threshold, module mask and display options.
///
/// # Example
///
/// ```
/// use gpa_logger::{LoggerConfig, Module, Severity, TimestampFormat};
///
/// let config = LoggerConfig::new("renderer")
///     .with_log_level(Severity::Debug)
///     .with_mask(Module::GENERIC | Module::PAGE_TRACKER)
///     .with_timestamp_format(TimestampFormat::Short)
///     .with_show_level(true);
///
/// assert_eq!(config.name(), "renderer");
/// assert_eq!(config.log_level, Severity::Debug);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "RawConfig", from = "RawConfig")]
pub struct LoggerConfig {
    name: String,
    pub timestamp_format: TimestampFormat,
    pub log_level: Severity,
    pub show_pid: bool,
    pub show_level: bool,
    pub use_colors: bool,
    pub mask: Module,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            timestamp_format: TimestampFormat::None,
            log_level: Severity::Info,
            show_pid: false,
            show_level: false,
            use_colors: false,
            mask: Module::GENERIC,
        }
    }
}

impl LoggerConfig {
    /// Defaults with the given application name (truncated if over-long)
    pub fn new(app_name: &str) -> Self {
        Self {
            name: bounded_name(app_name),
            ..Self::default()
        }
    }

    /// Parse a configuration from JSON text.
    ///
    /// Level and mask are given as words and go through the lenient parsers,
    /// so unrecognized words fall back to defaults. Only malformed JSON is an
    /// error. Missing fields take their default values.
    ///
    /// ```
    /// use gpa_logger::{LoggerConfig, Module, Severity};
    ///
    /// let config = LoggerConfig::from_json(
    ///     r#"{ "name": "app", "log_level": "warn", "mask": "Generic,PageTracker" }"#,
    /// ).unwrap();
    /// assert_eq!(config.log_level, Severity::Warn);
    /// assert_eq!(config.mask, Module::GENERIC | Module::PAGE_TRACKER);
    /// ```
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Serialize to a JSON string
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Replace the application name, truncating it to [`MAX_NAME_LENGTH`]
    pub fn set_name(&mut self, name: &str) {
        self.name = bounded_name(name);
    }

    #[must_use]
    pub fn with_name(mut self, name: &str) -> Self {
        self.set_name(name);
        self
    }

    #[must_use]
    pub fn with_log_level(mut self, level: Severity) -> Self {
        self.log_level = level;
        self
    }

    #[must_use]
    pub fn with_mask(mut self, mask: Module) -> Self {
        self.mask = mask;
        self
    }

    #[must_use]
    pub fn with_timestamp_format(mut self, format: TimestampFormat) -> Self {
        self.timestamp_format = format;
        self
    }

    #[must_use]
    pub fn with_show_pid(mut self, show: bool) -> Self {
        self.show_pid = show;
        self
    }

    #[must_use]
    pub fn with_show_level(mut self, show: bool) -> Self {
        self.show_level = show;
        self
    }

    #[must_use]
    pub fn with_colors(mut self, use_colors: bool) -> Self {
        self.use_colors = use_colors;
        self
    }
}

/// Textual wire form of [`LoggerConfig`].
#[derive(Serialize, Deserialize)]
#[serde(default)]
struct RawConfig {
    name: String,
    timestamp_format: String,
    log_level: String,
    show_pid: bool,
    show_level: bool,
    use_colors: bool,
    mask: RawMask,
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum RawMask {
    Bits(u32),
    Names(String),
}

impl Default for RawConfig {
    fn default() -> Self {
        LoggerConfig::default().into()
    }
}

impl From<LoggerConfig> for RawConfig {
    fn from(config: LoggerConfig) -> Self {
        Self {
            name: config.name,
            timestamp_format: config.timestamp_format.to_string(),
            log_level: config.log_level.to_string(),
            show_pid: config.show_pid,
            show_level: config.show_level,
            use_colors: config.use_colors,
            mask: RawMask::Names(config.mask.to_string()),
        }
    }
}

impl From<RawConfig> for LoggerConfig {
    fn from(raw: RawConfig) -> Self {
        Self {
            name: bounded_name(&raw.name),
            timestamp_format: raw.timestamp_format.parse().unwrap_or_default(),
            log_level: severity_from_string(&raw.log_level),
            show_pid: raw.show_pid,
            show_level: raw.show_level,
            use_colors: raw.use_colors,
            mask: match raw.mask {
                RawMask::Bits(bits) => Module::from_bits_retain(bits),
                RawMask::Names(names) => module_mask_from_string(&names),
            },
        }
    }
}
