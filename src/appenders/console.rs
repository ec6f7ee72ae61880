//! Console appender implementation

use crate::core::{
    render_fragment, Appender, LoggerConfig, LoggerError, MessageState, Result, Severity,
};
use std::io::Write;

/// Writes to stdout, or stderr for `Error` and `Fatal`.
///
/// Fragments of one multi-part message carry the severity of its `Begin`,
/// so the whole line lands on one stream.
pub struct ConsoleAppender {
    use_colors: bool,
}

impl ConsoleAppender {
    pub fn new() -> Self {
        Self { use_colors: true }
    }

    /// Allow or suppress colors regardless of the logger configuration.
    /// Colors are only emitted when both this and `use_colors` in the
    /// configuration are set.
    pub fn with_colors(use_colors: bool) -> Self {
        Self { use_colors }
    }
}

impl Default for ConsoleAppender {
    fn default() -> Self {
        Self::new()
    }
}

impl Appender for ConsoleAppender {
    fn append(
        &mut self,
        config: &LoggerConfig,
        severity: Severity,
        message: &str,
        state: MessageState,
    ) -> Result<()> {
        let output = render_fragment(config, severity, message, state, self.use_colors);

        // Route Error and Fatal levels to stderr, others to stdout
        let written = if severity.is_error() {
            std::io::stderr().lock().write_all(output.as_bytes())
        } else {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(output.as_bytes()).and_then(|()| {
                if state.has_terminator() {
                    Ok(())
                } else {
                    // No newline to trigger the line buffer
                    stdout.flush()
                }
            })
        };
        written.map_err(|e| LoggerError::writer(format!("console write failed: {}", e)))
    }

    fn flush(&mut self) -> Result<()> {
        // Flush both stdout and stderr since we write to both
        std::io::stdout().flush()?;
        std::io::stderr().flush()?;
        Ok(())
    }

    fn name(&self) -> &str {
        "console"
    }
}
