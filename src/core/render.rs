//! Text rendering of delivered fragments
//!
//! Appenders that write lines of text share this framing: a prefix built
//! from the configuration in front of `Begin`/`Complete` fragments and a
//! newline after `End`/`Complete` fragments. Concatenating the rendered
//! fragments of one multi-part message therefore yields exactly one prefixed
//! line.

use super::{config::LoggerConfig, message_state::MessageState, severity::Severity};
use std::fmt::Write as _;

pub const LINE_TERMINATOR: char = '\n';

/// Build the prefix for a new logical line: `[name] [pid] [LEVEL] [time] `,
/// each part present only when configured.
///
/// `colorize` lets an appender opt out of colors (files, pipes) even when
/// the configuration asks for them.
pub fn render_prefix(config: &LoggerConfig, severity: Severity, colorize: bool) -> String {
    let mut prefix = String::new();

    if !config.name().is_empty() {
        let _ = write!(prefix, "[{}] ", config.name());
    }

    if config.show_pid {
        let _ = write!(prefix, "[{}] ", std::process::id());
    }

    if config.show_level {
        let level = format!("{:5}", severity.to_str());
        let _ = write!(prefix, "[{}] ", paint_level(level, severity, colorize && config.use_colors));
    }

    if let Some(timestamp) = config.timestamp_format.now() {
        let _ = write!(prefix, "[{}] ", timestamp);
    }

    prefix
}

#[cfg(feature = "console")]
fn paint_level(level: String, severity: Severity, colorize: bool) -> String {
    use colored::Colorize;
    if colorize {
        level.color(severity.color_code()).to_string()
    } else {
        level
    }
}

#[cfg(not(feature = "console"))]
fn paint_level(level: String, _severity: Severity, _colorize: bool) -> String {
    level
}

/// Render one fragment with the framing implied by its state.
pub fn render_fragment(
    config: &LoggerConfig,
    severity: Severity,
    message: &str,
    state: MessageState,
    colorize: bool,
) -> String {
    let mut output = if state.has_prefix() {
        render_prefix(config, severity, colorize)
    } else {
        String::new()
    };

    output.push_str(message);

    if state.has_terminator() {
        output.push(LINE_TERMINATOR);
    }
    output
}
