//! File appender implementation

use crate::core::{
    render_fragment, Appender, LoggerConfig, LoggerError, MessageState, Result, Severity,
};
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Appends rendered lines to a file.
///
/// With the `file` feature the file is locked exclusively (advisory lock)
/// while the appender lives, so two appenders cannot interleave lines in the
/// same file. Output is buffered and flushed whenever a line is terminated.
pub struct FileAppender {
    path: PathBuf,
    writer: BufWriter<File>,
}

impl FileAppender {
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| {
                LoggerError::io_operation(
                    "opening log file",
                    format!("cannot open '{}'", path.display()),
                    e,
                )
            })?;
        lock_exclusive(&file, &path)?;

        Ok(Self {
            path,
            writer: BufWriter::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(feature = "file")]
fn lock_exclusive(file: &File, path: &Path) -> Result<()> {
    use fs2::FileExt;
    file.try_lock_exclusive()
        .map_err(|_| LoggerError::file_lock(path.display().to_string()))
}

#[cfg(not(feature = "file"))]
fn lock_exclusive(_file: &File, _path: &Path) -> Result<()> {
    Ok(())
}

impl Appender for FileAppender {
    fn append(
        &mut self,
        config: &LoggerConfig,
        severity: Severity,
        message: &str,
        state: MessageState,
    ) -> Result<()> {
        let output = render_fragment(config, severity, message, state, false);
        self.writer.write_all(output.as_bytes())?;

        if state.has_terminator() {
            self.writer.flush()?;
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }

    fn name(&self) -> &str {
        "file"
    }
}

impl Drop for FileAppender {
    fn drop(&mut self) {
        // Ensure all buffered data is flushed to disk
        let _ = self.flush();
    }
}
