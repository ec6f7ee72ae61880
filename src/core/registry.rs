//! Ordered set of registered appenders
//!
//! The list lives behind an `Arc` that is replaced on every mutation
//! (copy-on-write). Dispatch takes a snapshot by cloning the `Arc` under the
//! read lock and iterates it with the lock released, so appenders never run
//! while the registry is locked.
//!
//! Consequences for concurrent mutation:
//! - an appender added during a dispatch does not receive that message;
//! - an appender removed during a dispatch may still receive the message
//!   whose snapshot was taken before the removal, and stays alive until that
//!   snapshot is dropped. Dispatches starting after `remove` returns never
//!   reach it, except for the rest of a multi-part message whose `Begin`
//!   it received.

use super::appender::AppenderHandle;
use parking_lot::RwLock;
use std::sync::Arc;

pub type Snapshot = Arc<Vec<AppenderHandle>>;

#[derive(Default)]
pub struct AppenderRegistry {
    entries: RwLock<Snapshot>,
}

impl AppenderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append to the end of delivery order. Duplicates are kept.
    pub fn add(&self, appender: AppenderHandle) {
        let mut entries = self.entries.write();
        Arc::make_mut(&mut *entries).push(appender);
    }

    /// Remove the first entry referring to the same appender.
    /// Returns `false` if it was not registered.
    pub fn remove(&self, appender: &AppenderHandle) -> bool {
        let mut entries = self.entries.write();
        match entries.iter().position(|entry| entry.same(appender)) {
            Some(index) => {
                Arc::make_mut(&mut *entries).remove(index);
                true
            }
            None => false,
        }
    }

    /// Consistent view of the registry at this instant, in delivery order
    pub fn snapshot(&self) -> Snapshot {
        Arc::clone(&self.entries.read())
    }

    /// Unregister everything, returning the former entries in order
    pub fn clear(&self) -> Vec<AppenderHandle> {
        let previous = std::mem::take(&mut *self.entries.write());
        Arc::try_unwrap(previous).unwrap_or_else(|shared| shared.as_ref().clone())
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}
