//! Dispatch engine and logger lifecycle

use super::{
    appender::{Appender, AppenderHandle},
    config::LoggerConfig,
    coordinator::{Coordinator, OpenSequence, ProtocolViolation},
    error::{LoggerError, Result},
    filter::should_deliver,
    message_state::MessageState,
    metrics::LoggerMetrics,
    module::Module,
    registry::AppenderRegistry,
    severity::Severity,
    timestamp::TimestampFormat,
};
use std::fmt;
use std::marker::PhantomData;

/// Outcome of a dispatch call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Delivered to this many appenders
    Delivered { appenders: usize },
    /// Delivered in a corrected shape after a multi-part protocol violation
    Degraded {
        appenders: usize,
        violation: ProtocolViolation,
    },
    /// Rejected by the severity/module filter; nothing was formatted
    Filtered,
    /// The logger has been shut down
    Stopped,
}

impl Delivery {
    /// Whether the fragment reached the appender registry
    pub fn is_delivered(&self) -> bool {
        matches!(self, Delivery::Delivered { .. } | Delivery::Degraded { .. })
    }

    pub fn violation(&self) -> Option<ProtocolViolation> {
        match self {
            Delivery::Degraded { violation, .. } => Some(*violation),
            _ => None,
        }
    }
}

/// The logging context: configuration, appender registry and the
/// multi-part delivery token.
///
/// A `Logger` is created with [`Logger::init`] and torn down with
/// [`Logger::shutdown`] (or on drop). Share it between threads by reference
/// or behind an `Arc`; dispatch and appender registration take `&self`.
/// Reconfiguration and shutdown take `&mut self`, so they cannot overlap
/// with a dispatch or an open [`MultipartMessage`].
///
/// Appenders must not log through the logger they are registered with.
///
/// # Example
///
/// ```
/// use gpa_logger::prelude::*;
///
/// let mut logger = Logger::init(LoggerConfig::new("demo"));
/// let memory = MemoryAppender::new();
/// logger.add_appender(memory.clone());
///
/// logger.log_message(
///     Severity::Info,
///     Module::GENERIC,
///     MessageState::Complete,
///     format_args!("hello {}", 5),
/// );
/// assert_eq!(memory.messages(), ["hello 5"]);
///
/// logger.shutdown();
/// ```
pub struct Logger {
    config: LoggerConfig,
    registry: AppenderRegistry,
    coordinator: Coordinator,
    metrics: LoggerMetrics,
    running: bool,
}

impl Logger {
    /// Create a running logger with `config` and no appenders
    #[must_use]
    pub fn init(config: LoggerConfig) -> Self {
        Self {
            config,
            registry: AppenderRegistry::new(),
            coordinator: Coordinator::new(),
            metrics: LoggerMetrics::new(),
            running: true,
        }
    }

    /// Create a running logger with the default configuration
    #[must_use]
    pub fn new() -> Self {
        Self::init(LoggerConfig::default())
    }

    /// Replace the configuration.
    ///
    /// Any open multi-part message is closed, and every registered appender
    /// is flushed and unregistered; the new configuration starts with an
    /// empty registry. A shut-down logger becomes usable again.
    pub fn reinit(&mut self, config: LoggerConfig) {
        self.close_open_sequence();
        self.release_appenders();
        self.config = config;
        self.running = true;
    }

    /// Close any open multi-part message, then flush and release all
    /// appenders. Later dispatch calls return [`Delivery::Stopped`].
    ///
    /// Returns `false` if an appender failed to flush. Calling it again is a
    /// no-op.
    pub fn shutdown(&mut self) -> bool {
        if !self.running {
            return true;
        }
        self.close_open_sequence();
        let flushed = self.release_appenders();
        self.running = false;
        flushed
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn config(&self) -> &LoggerConfig {
        &self.config
    }

    pub fn metrics(&self) -> &LoggerMetrics {
        &self.metrics
    }

    /// Register an appender at the end of delivery order.
    /// Keep the returned handle to remove it later. A multi-part message
    /// already open is not delivered to it.
    pub fn add_appender<A: Appender + 'static>(&self, appender: A) -> AppenderHandle {
        let handle = AppenderHandle::new(appender);
        self.registry.add(handle.clone());
        handle
    }

    /// Register an existing handle. Registering the same handle twice
    /// delivers every message to it twice.
    pub fn add_appender_handle(&self, handle: AppenderHandle) {
        self.registry.add(handle);
    }

    /// Unregister the first registration of `handle`.
    ///
    /// A dispatch already in flight may still deliver one fragment to it,
    /// and a multi-part message whose `Begin` it received is still finished
    /// on it. The handle keeps it alive until then. Returns `false` if it
    /// was not registered.
    pub fn remove_appender(&self, handle: &AppenderHandle) -> bool {
        self.registry.remove(handle)
    }

    pub fn appender_count(&self) -> usize {
        self.registry.len()
    }

    /// Whether a message tagged `severity`/`module` would be delivered
    #[inline]
    pub fn is_enabled(&self, severity: Severity, module: Module) -> bool {
        self.running && should_deliver(severity, module, &self.config)
    }

    /// Filter, format and deliver one fragment.
    ///
    /// `args` is only rendered if the filter accepts the call. `Continue`
    /// and `End` fragments of a multi-part message opened by this thread are
    /// always accepted, since its `Begin` already passed the filter.
    pub fn log_message(
        &self,
        severity: Severity,
        module: Module,
        state: MessageState,
        args: fmt::Arguments<'_>,
    ) -> Delivery {
        if !self.running {
            self.metrics.record_rejected_stopped();
            return Delivery::Stopped;
        }

        let continuing = matches!(state, MessageState::Continue | MessageState::End)
            && self.coordinator.owns_open_sequence();
        if !continuing && !should_deliver(severity, module, &self.config) {
            self.metrics.record_filtered();
            return Delivery::Filtered;
        }

        let message = fmt::format(args);

        let mut turn = self.coordinator.acquire();
        let route = turn.route(state, OpenSequence { severity, module }, &self.registry);
        let step = route.step;

        if let (Some(open), Some(close_to)) = (step.close, &route.close_to) {
            self.deliver(close_to, open.severity, "", MessageState::End);
        }
        if let Some(violation) = step.violation {
            self.report_violation(&route.deliver_to, violation);
        }
        self.deliver(&route.deliver_to, step.severity, &message, step.state);
        self.metrics.record_delivered();
        drop(turn);

        let appenders = route.deliver_to.len();
        match step.violation {
            Some(violation) => Delivery::Degraded {
                appenders,
                violation,
            },
            None => Delivery::Delivered { appenders },
        }
    }

    /// Log a single-shot message tagged [`Module::GENERIC`]
    pub fn log(&self, severity: Severity, message: &str) -> Delivery {
        self.log_message(
            severity,
            Module::GENERIC,
            MessageState::Complete,
            format_args!("{}", message),
        )
    }

    #[inline]
    pub fn trace(&self, message: &str) -> Delivery {
        self.log(Severity::Trace, message)
    }

    #[inline]
    pub fn debug(&self, message: &str) -> Delivery {
        self.log(Severity::Debug, message)
    }

    #[inline]
    pub fn info(&self, message: &str) -> Delivery {
        self.log(Severity::Info, message)
    }

    #[inline]
    pub fn warn(&self, message: &str) -> Delivery {
        self.log(Severity::Warn, message)
    }

    #[inline]
    pub fn error(&self, message: &str) -> Delivery {
        self.log(Severity::Error, message)
    }

    #[inline]
    pub fn fatal(&self, message: &str) -> Delivery {
        self.log(Severity::Fatal, message)
    }

    /// Open a multi-part message.
    ///
    /// Until the returned handle is ended or dropped, other threads block
    /// when they try to deliver. If the filter rejects `severity`/`module`
    /// the handle is inert and its fragments are discarded.
    ///
    /// ```
    /// use gpa_logger::prelude::*;
    ///
    /// let logger = Logger::new();
    /// let memory = MemoryAppender::new();
    /// logger.add_appender(memory.clone());
    ///
    /// let mut line = logger.begin(Severity::Info, Module::GENERIC, format_args!("a"));
    /// line.continue_with(format_args!("b"));
    /// line.end(format_args!("c"));
    ///
    /// assert_eq!(memory.rendered(), "abc\n");
    /// ```
    pub fn begin(
        &self,
        severity: Severity,
        module: Module,
        args: fmt::Arguments<'_>,
    ) -> MultipartMessage<'_> {
        let delivery = self.log_message(severity, module, MessageState::Begin, args);
        MultipartMessage {
            logger: self,
            severity,
            module,
            open: matches!(delivery, Delivery::Delivered { .. }),
            _thread_bound: PhantomData,
        }
    }

    /// Flush every registered appender.
    ///
    /// Each appender is flushed even if an earlier one fails; the first
    /// failure is returned. Fails with [`LoggerError::LoggerStopped`] after
    /// shutdown.
    pub fn flush(&self) -> Result<()> {
        if !self.running {
            return Err(LoggerError::LoggerStopped);
        }
        flush_each(self.registry.snapshot().iter())
    }

    /// Deliver one fragment to each appender in order.
    ///
    /// Every call is isolated: an error or panic in one appender is
    /// reported and counted, and delivery continues with the next one.
    fn deliver(
        &self,
        appenders: &[AppenderHandle],
        severity: Severity,
        message: &str,
        state: MessageState,
    ) {
        for (idx, appender) in appenders.iter().enumerate() {
            let append_result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                appender.lock().append(&self.config, severity, message, state)
            }));

            match append_result {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    eprintln!("[LOGGER ERROR] Appender #{} failed: {}", idx, e);
                    self.metrics.record_appender_failure();
                }
                Err(panic_info) => {
                    eprintln!(
                        "[LOGGER CRITICAL] Appender #{} panicked: {}. \
                         Other appenders continue to function.",
                        idx,
                        panic_message(panic_info.as_ref())
                    );
                    self.metrics.record_appender_failure();
                }
            }
        }
    }

    /// Count a violation and emit a diagnostic through the normal path.
    /// Caller holds the delivery token.
    fn report_violation(&self, appenders: &[AppenderHandle], violation: ProtocolViolation) {
        self.metrics.record_protocol_violation();
        if should_deliver(Severity::Warn, Module::GENERIC, &self.config) {
            let diagnostic = format!("multi-part protocol violation: {}", violation);
            self.deliver(appenders, Severity::Warn, &diagnostic, MessageState::Complete);
        }
    }

    /// Terminate a multi-part message whose handle was dropped without `end`
    fn close_abandoned(&self) {
        let mut turn = self.coordinator.acquire();
        if let Some((open, owed)) = turn.close() {
            self.deliver(&owed, open.severity, "", MessageState::End);
            self.report_violation(&owed, ProtocolViolation::AbandonedSequence);
        }
    }

    fn close_open_sequence(&mut self) {
        if let Some((open, owed)) = self.coordinator.take_open() {
            self.deliver(&owed, open.severity, "", MessageState::End);
            self.report_violation(&owed, ProtocolViolation::ClosedByLifecycle);
        }
    }

    /// Unregister all appenders, flushing each. Returns `false` if any
    /// flush failed.
    fn release_appenders(&self) -> bool {
        flush_each(self.registry.clear().iter()).is_ok()
    }
}

/// Flush each appender in isolation, reporting every failure.
/// Returns the first failure after all appenders were flushed.
fn flush_each<'a>(appenders: impl Iterator<Item = &'a AppenderHandle>) -> Result<()> {
    let mut first_failure = None;
    for (idx, appender) in appenders.enumerate() {
        let flush_result =
            std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| appender.flush()));

        let failure = match flush_result {
            Ok(Ok(())) => continue,
            Ok(Err(e)) => {
                eprintln!("[LOGGER ERROR] Appender #{} flush failed: {}", idx, e);
                e
            }
            Err(panic_info) => {
                let reason = panic_message(panic_info.as_ref());
                eprintln!(
                    "[LOGGER CRITICAL] Appender #{} panicked during flush: {}",
                    idx, reason
                );
                LoggerError::other(format!("appender #{} panicked during flush: {}", idx, reason))
            }
        };
        first_failure.get_or_insert(failure);
    }
    first_failure.map_or(Ok(()), Err)
}

fn panic_message(panic_info: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic_info.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic_info.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Logger {
    fn drop(&mut self) {
        if !self.shutdown() {
            eprintln!("[LOGGER ERROR] Failed to flush during shutdown");
        }

        let failures = self.metrics.appender_failures();
        if failures > 0 {
            eprintln!(
                "[LOGGER WARNING] Logger shutting down with {} failed appender calls",
                failures
            );
        }
    }
}

/// An open multi-part message.
///
/// Returned by [`Logger::begin`]. Holds the delivery token of its logger
/// until [`end`](Self::end) is called or the handle is dropped; dropping it
/// without `end` terminates the line and reports
/// [`ProtocolViolation::AbandonedSequence`]. It cannot leave the thread that
/// opened it.
pub struct MultipartMessage<'a> {
    logger: &'a Logger,
    severity: Severity,
    module: Module,
    open: bool,
    _thread_bound: PhantomData<*const ()>,
}

impl MultipartMessage<'_> {
    /// Whether `begin` was delivered and the message is still open
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Append a fragment without prefix or line terminator
    pub fn continue_with(&mut self, args: fmt::Arguments<'_>) -> Delivery {
        if !self.open {
            return Delivery::Filtered;
        }
        let delivery =
            self.logger
                .log_message(self.severity, self.module, MessageState::Continue, args);
        if delivery.violation().is_some() {
            // Closed underneath us by an out-of-sequence call on this thread
            self.open = false;
        }
        delivery
    }

    /// Append the last fragment and terminate the line
    pub fn end(mut self, args: fmt::Arguments<'_>) -> Delivery {
        if !self.open {
            return Delivery::Filtered;
        }
        self.open = false;
        self.logger
            .log_message(self.severity, self.module, MessageState::End, args)
    }
}

impl Drop for MultipartMessage<'_> {
    fn drop(&mut self) {
        if self.open {
            self.logger.close_abandoned();
        }
    }
}

/// Builder for constructing Logger with a fluent API
///
/// # Example
/// ```
/// use gpa_logger::prelude::*;
///
/// let logger = Logger::builder()
///     .app_name("renderer")
///     .log_level(Severity::Debug)
///     .mask(Module::GENERIC | Module::PAGE_TRACKER)
///     .show_level(true)
///     .appender(MemoryAppender::new())
///     .build();
///
/// assert_eq!(logger.appender_count(), 1);
/// ```
pub struct LoggerBuilder {
    config: LoggerConfig,
    appenders: Vec<AppenderHandle>,
}

impl LoggerBuilder {
    /// Create a new builder with default values
    pub fn new() -> Self {
        Self {
            config: LoggerConfig::default(),
            appenders: Vec::new(),
        }
    }

    /// Start from a complete configuration
    #[must_use = "builder methods return a new value"]
    pub fn config(mut self, config: LoggerConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn app_name(mut self, name: &str) -> Self {
        self.config.set_name(name);
        self
    }

    /// Set minimum severity
    #[must_use = "builder methods return a new value"]
    pub fn log_level(mut self, level: Severity) -> Self {
        self.config.log_level = level;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn mask(mut self, mask: Module) -> Self {
        self.config.mask = mask;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn timestamp_format(mut self, format: TimestampFormat) -> Self {
        self.config.timestamp_format = format;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn show_pid(mut self, show: bool) -> Self {
        self.config.show_pid = show;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn show_level(mut self, show: bool) -> Self {
        self.config.show_level = show;
        self
    }

    #[must_use = "builder methods return a new value"]
    pub fn use_colors(mut self, use_colors: bool) -> Self {
        self.config.use_colors = use_colors;
        self
    }

    /// Add an appender
    #[must_use = "builder methods return a new value"]
    pub fn appender<A: Appender + 'static>(mut self, appender: A) -> Self {
        self.appenders.push(AppenderHandle::new(appender));
        self
    }

    /// Add an existing appender handle
    #[must_use = "builder methods return a new value"]
    pub fn appender_handle(mut self, handle: AppenderHandle) -> Self {
        self.appenders.push(handle);
        self
    }

    /// Build the Logger
    pub fn build(self) -> Logger {
        let logger = Logger::init(self.config);
        for appender in self.appenders {
            logger.add_appender_handle(appender);
        }
        logger
    }
}

impl Default for LoggerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl Logger {
    /// Create a builder for Logger
    #[must_use]
    pub fn builder() -> LoggerBuilder {
        LoggerBuilder::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::appenders::{MemoryAppender, Record};
    use crate::core::LoggerError;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn record(severity: Severity, message: &str, state: MessageState) -> Record {
        Record {
            severity,
            message: message.to_string(),
            state,
        }
    }

    #[test]
    fn test_builder_basic() {
        let logger = Logger::builder().log_level(Severity::Debug).build();
        assert_eq!(logger.config().log_level, Severity::Debug);
        assert_eq!(logger.appender_count(), 0);
        assert!(logger.is_running());
    }

    #[test]
    fn test_builder_config_then_overrides() {
        let logger = Logger::builder()
            .config(LoggerConfig::new("base").with_show_pid(true))
            .app_name("override")
            .use_colors(true)
            .timestamp_format(TimestampFormat::Full)
            .build();
        assert_eq!(logger.config().name(), "override");
        assert!(logger.config().show_pid);
        assert!(logger.config().use_colors);
        assert_eq!(logger.config().timestamp_format, TimestampFormat::Full);
    }

    #[test]
    fn test_single_shot_delivery() {
        let logger = Logger::new();
        let memory = MemoryAppender::new();
        logger.add_appender(memory.clone());

        let delivery = logger.log_message(
            Severity::Info,
            Module::GENERIC,
            MessageState::Complete,
            format_args!("hello {}", 5),
        );

        assert_eq!(delivery, Delivery::Delivered { appenders: 1 });
        assert_eq!(
            memory.records(),
            [record(Severity::Info, "hello 5", MessageState::Complete)]
        );
    }

    #[test]
    fn test_filtered_message_is_not_formatted() {
        struct Explodes;
        impl fmt::Display for Explodes {
            fn fmt(&self, _f: &mut fmt::Formatter<'_>) -> fmt::Result {
                panic!("formatted a filtered message");
            }
        }

        let logger = Logger::init(LoggerConfig::default().with_log_level(Severity::Warn));
        let memory = MemoryAppender::new();
        logger.add_appender(memory.clone());

        let delivery = logger.log_message(
            Severity::Info,
            Module::GENERIC,
            MessageState::Complete,
            format_args!("{}", Explodes),
        );

        assert_eq!(delivery, Delivery::Filtered);
        assert!(memory.records().is_empty());
        assert_eq!(logger.metrics().filtered(), 1);
    }

    #[test]
    fn test_module_mask_filters() {
        let logger = Logger::new();
        let memory = MemoryAppender::new();
        logger.add_appender(memory.clone());

        let delivery = logger.log_message(
            Severity::Fatal,
            Module::PAGE_TRACKER,
            MessageState::Complete,
            format_args!("tracked"),
        );
        assert_eq!(delivery, Delivery::Filtered);
        assert!(memory.records().is_empty());
        assert!(!logger.is_enabled(Severity::Fatal, Module::PAGE_TRACKER));
        assert!(logger.is_enabled(Severity::Info, Module::GENERIC));
    }

    #[test]
    fn test_multipart_states() {
        let logger = Logger::new();
        let memory = MemoryAppender::new();
        logger.add_appender(memory.clone());

        for (state, text) in [
            (MessageState::Begin, "a"),
            (MessageState::Continue, "b"),
            (MessageState::End, "c"),
        ] {
            let delivery =
                logger.log_message(Severity::Info, Module::GENERIC, state, format_args!("{text}"));
            assert_eq!(delivery, Delivery::Delivered { appenders: 1 });
        }

        assert_eq!(
            memory.records(),
            [
                record(Severity::Info, "a", MessageState::Begin),
                record(Severity::Info, "b", MessageState::Continue),
                record(Severity::Info, "c", MessageState::End),
            ]
        );
        assert_eq!(memory.rendered(), "abc\n");
    }

    #[test]
    fn test_continuation_passes_even_below_threshold() {
        let logger = Logger::init(LoggerConfig::default().with_log_level(Severity::Warn));
        let memory = MemoryAppender::new();
        logger.add_appender(memory.clone());

        logger.log_message(Severity::Warn, Module::GENERIC, MessageState::Begin, format_args!("a"));
        // Tagged lower than the threshold but belongs to the open message
        logger.log_message(Severity::Trace, Module::GENERIC, MessageState::End, format_args!("b"));

        assert_eq!(memory.rendered(), "ab\n");
        assert_eq!(memory.records()[1].severity, Severity::Warn);
    }

    #[test]
    fn test_rejected_begin_discards_its_fragments_silently() {
        let logger = Logger::init(LoggerConfig::default().with_log_level(Severity::Warn));
        let memory = MemoryAppender::new();
        logger.add_appender(memory.clone());

        let mut line = logger.begin(Severity::Debug, Module::GENERIC, format_args!("a"));
        assert!(!line.is_open());
        assert_eq!(line.continue_with(format_args!("b")), Delivery::Filtered);
        assert_eq!(line.end(format_args!("c")), Delivery::Filtered);

        assert!(memory.records().is_empty());
        assert_eq!(logger.metrics().protocol_violations(), 0);
    }

    #[test]
    fn test_end_without_begin_degrades() {
        let logger = Logger::new();
        let memory = MemoryAppender::new();
        logger.add_appender(memory.clone());

        let delivery =
            logger.log_message(Severity::Info, Module::GENERIC, MessageState::End, format_args!("x"));

        assert_eq!(
            delivery,
            Delivery::Degraded {
                appenders: 1,
                violation: ProtocolViolation::EndWithoutBegin
            }
        );
        let records = memory.records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].severity, Severity::Warn);
        assert!(records[0].message.contains("end without a matching begin"));
        assert_eq!(records[1], record(Severity::Info, "x", MessageState::Complete));
        assert_eq!(logger.metrics().protocol_violations(), 1);
    }

    #[test]
    fn test_nested_begin_closes_open_line() {
        let logger = Logger::new();
        let memory = MemoryAppender::new();
        logger.add_appender(memory.clone());

        logger.log_message(Severity::Info, Module::GENERIC, MessageState::Begin, format_args!("first"));
        let delivery =
            logger.log_message(Severity::Info, Module::GENERIC, MessageState::Begin, format_args!("second"));

        assert_eq!(delivery.violation(), Some(ProtocolViolation::NestedBegin));
        let states: Vec<_> = memory.records().iter().map(|r| r.state).collect();
        assert_eq!(
            states,
            [
                MessageState::Begin,
                MessageState::End,
                MessageState::Complete,
                MessageState::Complete
            ]
        );
        assert!(memory.rendered().ends_with("second\n"));
    }

    #[test]
    fn test_diagnostic_respects_filter() {
        let logger = Logger::init(LoggerConfig::default().with_log_level(Severity::Error));
        let memory = MemoryAppender::new();
        logger.add_appender(memory.clone());

        logger.log_message(Severity::Error, Module::GENERIC, MessageState::Continue, format_args!("x"));

        // Warn-level diagnostic is below the threshold, only the fragment arrives
        assert_eq!(memory.records(), [record(Severity::Error, "x", MessageState::Complete)]);
        assert_eq!(logger.metrics().protocol_violations(), 1);
    }

    #[test]
    fn test_dropped_handle_terminates_line() {
        let logger = Logger::new();
        let memory = MemoryAppender::new();
        logger.add_appender(memory.clone());

        {
            let mut line = logger.begin(Severity::Info, Module::GENERIC, format_args!("partial"));
            line.continue_with(format_args!("..."));
        }

        let records = memory.records();
        assert_eq!(records[2], record(Severity::Info, "", MessageState::End));
        assert!(records[3].message.contains("dropped without end"));
        assert!(memory.rendered().starts_with("partial...\n"));

        // Token released: another message goes through normally
        assert!(logger.info("after").is_delivered());
    }

    #[test]
    fn test_shutdown_closes_open_sequence() {
        let mut logger = Logger::new();
        let memory = MemoryAppender::new();
        logger.add_appender(memory.clone());

        logger.log_message(Severity::Info, Module::GENERIC, MessageState::Begin, format_args!("a"));
        assert!(logger.shutdown());

        let records = memory.records();
        assert_eq!(records[1], record(Severity::Info, "", MessageState::End));
        assert_eq!(memory.rendered().lines().next(), Some("a"));
        assert_eq!(logger.appender_count(), 0);
        assert!(!logger.is_running());
    }

    #[test]
    fn test_dispatch_after_shutdown_is_noop() {
        let mut logger = Logger::new();
        let memory = MemoryAppender::new();
        logger.add_appender(memory.clone());
        logger.shutdown();

        assert_eq!(logger.info("late"), Delivery::Stopped);
        assert!(memory.records().is_empty());
        assert_eq!(logger.metrics().rejected_stopped(), 1);
        assert!(matches!(logger.flush(), Err(LoggerError::LoggerStopped)));
        // Second shutdown is harmless
        assert!(logger.shutdown());
    }

    #[test]
    fn test_reinit_replaces_config_and_clears_registry() {
        let mut logger = Logger::init(LoggerConfig::new("first").with_log_level(Severity::Error));
        let memory = MemoryAppender::new();
        logger.add_appender(memory.clone());

        logger.reinit(LoggerConfig::new("second"));

        assert_eq!(logger.config().name(), "second");
        assert_eq!(logger.config().log_level, Severity::Info);
        assert_eq!(logger.appender_count(), 0);

        logger.info("not delivered to the released appender");
        assert!(memory.records().is_empty());
    }

    #[test]
    fn test_reinit_revives_stopped_logger() {
        let mut logger = Logger::new();
        logger.shutdown();
        logger.reinit(LoggerConfig::default());
        let memory = MemoryAppender::new();
        logger.add_appender(memory.clone());

        assert!(logger.info("back").is_delivered());
        assert_eq!(memory.messages(), ["back"]);
    }

    #[test]
    fn test_delivery_order_matches_registration() {
        let logger = Logger::new();
        let journal = MemoryAppender::new();
        logger.add_appender(journal.tap("A"));
        logger.add_appender(journal.tap("B"));
        logger.add_appender(journal.tap("C"));

        logger.info("once");
        assert_eq!(journal.messages(), ["A:once", "B:once", "C:once"]);
    }

    #[test]
    fn test_failing_appender_isolated() {
        struct Failing;
        impl Appender for Failing {
            fn append(
                &mut self,
                _config: &LoggerConfig,
                _severity: Severity,
                _message: &str,
                _state: MessageState,
            ) -> Result<()> {
                Err(LoggerError::other("Simulated failure"))
            }
            fn name(&self) -> &str {
                "failing"
            }
        }

        struct Panicking;
        impl Appender for Panicking {
            fn append(
                &mut self,
                _config: &LoggerConfig,
                _severity: Severity,
                _message: &str,
                _state: MessageState,
            ) -> Result<()> {
                panic!("appender panic");
            }
            fn name(&self) -> &str {
                "panicking"
            }
        }

        let logger = Logger::new();
        let memory = MemoryAppender::new();
        logger.add_appender(Failing);
        logger.add_appender(Panicking);
        logger.add_appender(memory.clone());

        assert!(logger.info("still arrives").is_delivered());
        assert_eq!(memory.messages(), ["still arrives"]);
        assert_eq!(logger.metrics().appender_failures(), 2);

        // The panicking appender is still usable and the token was released
        assert!(logger.info("again").is_delivered());
        assert_eq!(logger.metrics().appender_failures(), 4);
    }

    #[test]
    fn test_appender_added_mid_sequence_waits_for_next_message() {
        let logger = Logger::init(LoggerConfig::new("app").with_show_level(true));
        let early = MemoryAppender::new();
        logger.add_appender(early.clone());

        logger.log_message(Severity::Info, Module::GENERIC, MessageState::Begin, format_args!("a"));
        let late = MemoryAppender::new();
        logger.add_appender(late.clone());
        let delivery =
            logger.log_message(Severity::Info, Module::GENERIC, MessageState::Continue, format_args!("b"));
        assert_eq!(delivery, Delivery::Delivered { appenders: 1 });
        logger.log_message(Severity::Info, Module::GENERIC, MessageState::End, format_args!("c"));
        logger.info("next");

        assert_eq!(early.rendered(), "[app] [INFO ] abc\n[app] [INFO ] next\n");
        assert_eq!(late.rendered(), "[app] [INFO ] next\n");
    }

    #[test]
    fn test_appender_removed_mid_sequence_still_gets_end() {
        let logger = Logger::init(LoggerConfig::new("app").with_show_level(true));
        let gone = MemoryAppender::new();
        let handle = logger.add_appender(gone.clone());

        let mut line = logger.begin(Severity::Info, Module::GENERIC, format_args!("a"));
        assert!(logger.remove_appender(&handle));
        line.end(format_args!("b"));

        logger.add_appender_handle(handle);
        logger.info("next");

        assert_eq!(gone.rendered(), "[app] [INFO ] ab\n[app] [INFO ] next\n");
    }

    #[test]
    fn test_abandoned_line_closed_on_original_appenders() {
        let logger = Logger::new();
        let gone = MemoryAppender::new();
        let handle = logger.add_appender(gone.clone());
        let late = MemoryAppender::new();

        {
            let _line = logger.begin(Severity::Info, Module::GENERIC, format_args!("partial"));
            logger.remove_appender(&handle);
            logger.add_appender(late.clone());
        }

        assert!(gone.rendered().starts_with("partial\n"));
        assert!(gone.rendered().contains("dropped without end"));
        assert!(late.records().is_empty());
    }

    #[test]
    fn test_flush_isolates_failing_appenders() {
        struct FailingFlush;
        impl Appender for FailingFlush {
            fn append(
                &mut self,
                _config: &LoggerConfig,
                _severity: Severity,
                _message: &str,
                _state: MessageState,
            ) -> Result<()> {
                Ok(())
            }
            fn flush(&mut self) -> Result<()> {
                Err(LoggerError::writer("flush refused"))
            }
            fn name(&self) -> &str {
                "failing-flush"
            }
        }

        struct PanickingFlush;
        impl Appender for PanickingFlush {
            fn append(
                &mut self,
                _config: &LoggerConfig,
                _severity: Severity,
                _message: &str,
                _state: MessageState,
            ) -> Result<()> {
                Ok(())
            }
            fn flush(&mut self) -> Result<()> {
                panic!("flush panic");
            }
            fn name(&self) -> &str {
                "panicking-flush"
            }
        }

        struct CountingFlush(Arc<AtomicUsize>);
        impl Appender for CountingFlush {
            fn append(
                &mut self,
                _config: &LoggerConfig,
                _severity: Severity,
                _message: &str,
                _state: MessageState,
            ) -> Result<()> {
                Ok(())
            }
            fn flush(&mut self) -> Result<()> {
                self.0.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
            fn name(&self) -> &str {
                "counting"
            }
        }

        let flushes = Arc::new(AtomicUsize::new(0));
        let mut logger = Logger::new();
        logger.add_appender(FailingFlush);
        logger.add_appender(PanickingFlush);
        logger.add_appender(CountingFlush(Arc::clone(&flushes)));

        let result = logger.flush();
        assert!(matches!(result, Err(LoggerError::WriterError(_))));
        assert_eq!(flushes.load(Ordering::SeqCst), 1);

        assert!(!logger.shutdown());
        assert_eq!(flushes.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_delivered_counts_caller_fragments_only() {
        let logger = Logger::new();
        logger.add_appender(MemoryAppender::new());

        // Degraded End: diagnostic plus the fragment itself
        logger.log_message(Severity::Info, Module::GENERIC, MessageState::End, format_args!("x"));
        assert_eq!(logger.metrics().delivered(), 1);

        // Abandoned line: Begin counted, engine-generated End and diagnostic not
        drop(logger.begin(Severity::Info, Module::GENERIC, format_args!("y")));
        assert_eq!(logger.metrics().delivered(), 2);
        assert_eq!(logger.metrics().protocol_violations(), 2);
    }

    #[test]
    fn test_duplicate_registration_duplicates_delivery() {
        let logger = Logger::new();
        let memory = MemoryAppender::new();
        let handle = logger.add_appender(memory.clone());
        logger.add_appender_handle(handle.clone());

        logger.info("twice");
        assert_eq!(memory.messages(), ["twice", "twice"]);

        assert!(logger.remove_appender(&handle));
        logger.info("once");
        assert_eq!(memory.messages().len(), 3);

        assert!(logger.remove_appender(&handle));
        assert!(!logger.remove_appender(&handle));
    }
}
