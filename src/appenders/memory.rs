//! In-memory appender
//!
//! Captures every delivered fragment. Clones share one buffer, so a test
//! can register a clone and inspect the original afterwards.

use crate::core::{
    render_fragment, Appender, LoggerConfig, MessageState, Result, Severity,
};
use parking_lot::Mutex;
use std::sync::Arc;

/// One delivered fragment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub severity: Severity,
    pub message: String,
    pub state: MessageState,
}

#[derive(Debug, Default)]
struct Journal {
    records: Vec<Record>,
    rendered: String,
}

#[derive(Debug, Clone)]
pub struct MemoryAppender {
    name: String,
    label: Option<String>,
    journal: Arc<Mutex<Journal>>,
}

impl MemoryAppender {
    pub fn new() -> Self {
        Self::named("memory")
    }

    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            label: None,
            journal: Arc::new(Mutex::new(Journal::default())),
        }
    }

    /// A second appender writing into the same journal, with each message
    /// recorded as `label:message`. Useful to observe delivery order across
    /// several appenders.
    #[must_use]
    pub fn tap(&self, label: &str) -> Self {
        Self {
            name: label.to_string(),
            label: Some(label.to_string()),
            journal: Arc::clone(&self.journal),
        }
    }

    /// Captured fragments in delivery order
    pub fn records(&self) -> Vec<Record> {
        self.journal.lock().records.clone()
    }

    /// Captured message texts in delivery order
    pub fn messages(&self) -> Vec<String> {
        self.journal
            .lock()
            .records
            .iter()
            .map(|record| record.message.clone())
            .collect()
    }

    /// Everything captured, rendered as a text sink would write it
    pub fn rendered(&self) -> String {
        self.journal.lock().rendered.clone()
    }

    pub fn clear(&self) {
        let mut journal = self.journal.lock();
        journal.records.clear();
        journal.rendered.clear();
    }
}

impl Default for MemoryAppender {
    fn default() -> Self {
        Self::new()
    }
}

impl Appender for MemoryAppender {
    fn append(
        &mut self,
        config: &LoggerConfig,
        severity: Severity,
        message: &str,
        state: MessageState,
    ) -> Result<()> {
        let message = match &self.label {
            Some(label) => format!("{}:{}", label, message),
            None => message.to_string(),
        };
        let rendered = render_fragment(config, severity, &message, state, false);

        let mut journal = self.journal.lock();
        journal.rendered.push_str(&rendered);
        journal.records.push(Record {
            severity,
            message,
            state,
        });
        Ok(())
    }

    fn name(&self) -> &str {
        &self.name
    }
}
