//! Appender trait for log output destinations

use super::{
    config::LoggerConfig, error::Result, message_state::MessageState, severity::Severity,
};
use parking_lot::{Mutex, MutexGuard};
use std::fmt;
use std::sync::Arc;

/// An output sink.
///
/// `append` receives the raw message text of one fragment together with the
/// active configuration, so each sink decides how to render prefix and line
/// ending (see [`render_fragment`](super::render::render_fragment)). The
/// logger never calls one appender from two threads at once.
pub trait Appender: Send {
    fn append(
        &mut self,
        config: &LoggerConfig,
        severity: Severity,
        message: &str,
        state: MessageState,
    ) -> Result<()>;

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }

    fn name(&self) -> &str;
}

/// Registration handle for an appender.
///
/// Clones refer to the same appender. Identity for removal is the shared
/// allocation, so registering one handle twice delivers twice and removing
/// it once drops one of the two entries.
#[derive(Clone)]
pub struct AppenderHandle {
    inner: Arc<Mutex<dyn Appender>>,
}

impl AppenderHandle {
    pub fn new<A: Appender + 'static>(appender: A) -> Self {
        Self {
            inner: Arc::new(Mutex::new(appender)),
        }
    }

    /// Whether both handles refer to the same appender
    #[inline]
    pub fn same(&self, other: &AppenderHandle) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    pub fn name(&self) -> String {
        self.inner.lock().name().to_string()
    }

    /// Flush the underlying appender
    pub fn flush(&self) -> Result<()> {
        self.inner.lock().flush()
    }

    pub(crate) fn lock(&self) -> MutexGuard<'_, dyn Appender> {
        self.inner.lock()
    }
}

impl fmt::Debug for AppenderHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppenderHandle")
            .field("ptr", &Arc::as_ptr(&self.inner).cast::<()>())
            .finish()
    }
}
