//! JSON Lines appender
//!
//! Writes one JSON object per logical message. Fragments of a multi-part
//! message are accumulated and written as a single object at `End`.

use crate::core::{Appender, LoggerConfig, MessageState, Result, Severity};
use chrono::{Local, SecondsFormat};
use serde::Serialize;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;

#[derive(Serialize)]
struct JsonLine<'a> {
    timestamp: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    app: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pid: Option<u32>,
    level: &'static str,
    message: &'a str,
}

/// Multi-part message being assembled
struct Pending {
    timestamp: String,
    severity: Severity,
    message: String,
}

pub struct JsonAppender {
    writer: BufWriter<File>,
    pending: Option<Pending>,
}

impl JsonAppender {
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;

        Ok(Self {
            writer: BufWriter::new(file),
            pending: None,
        })
    }

    fn now() -> String {
        Local::now().to_rfc3339_opts(SecondsFormat::Millis, false)
    }

    fn write_line(
        &mut self,
        config: &LoggerConfig,
        timestamp: &str,
        severity: Severity,
        message: &str,
    ) -> Result<()> {
        let line = JsonLine {
            timestamp,
            app: Some(config.name()).filter(|name| !name.is_empty()),
            pid: config.show_pid.then(std::process::id),
            level: severity.to_str(),
            message,
        };
        serde_json::to_writer(&mut self.writer, &line)?;
        self.writer.write_all(b"\n")?;
        Ok(())
    }
}

impl Appender for JsonAppender {
    fn append(
        &mut self,
        config: &LoggerConfig,
        severity: Severity,
        message: &str,
        state: MessageState,
    ) -> Result<()> {
        match state {
            MessageState::Complete => self.write_line(config, &Self::now(), severity, message),
            MessageState::Begin => {
                self.pending = Some(Pending {
                    timestamp: Self::now(),
                    severity,
                    message: message.to_string(),
                });
                Ok(())
            }
            MessageState::Continue | MessageState::End => {
                let mut pending = self.pending.take().unwrap_or_else(|| Pending {
                    timestamp: Self::now(),
                    severity,
                    message: String::new(),
                });
                pending.message.push_str(message);

                if state == MessageState::End {
                    self.write_line(config, &pending.timestamp, pending.severity, &pending.message)
                } else {
                    self.pending = Some(pending);
                    Ok(())
                }
            }
        }
    }

    fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }

    fn name(&self) -> &str {
        "json"
    }
}
