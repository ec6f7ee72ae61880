//! Logging macros for ergonomic log message formatting.
//!
//! Every macro expands to [`Logger::log_message`](crate::Logger::log_message)
//! with `format_args!`, so arguments are only formatted when the message
//! passes the filter.
//!
//! Level macros tag messages with [`Module::GENERIC`](crate::Module::GENERIC)
//! unless a module is given first:
//!
//! ```
//! use gpa_logger::prelude::*;
//! use gpa_logger::{info, warn};
//!
//! let logger = Logger::init(
//!     LoggerConfig::default().with_mask(Module::GENERIC | Module::PAGE_TRACKER),
//! );
//!
//! let port = 8080;
//! info!(logger, "Server listening on port {}", port);
//! warn!(logger, module = Module::PAGE_TRACKER; "{} pages evicted", 3);
//! ```
//!
//! Multi-part messages use the `_begin`, `_continue` and `_end` forms:
//!
//! ```
//! use gpa_logger::prelude::*;
//! use gpa_logger::{debug_begin, debug_continue, debug_end};
//!
//! let logger = Logger::init(LoggerConfig::default().with_log_level(Severity::Debug));
//! debug_begin!(logger, "queues:");
//! for depth in [3, 0, 7] {
//!     debug_continue!(logger, " {}", depth);
//! }
//! debug_end!(logger, "");
//! ```

/// Dispatch one fragment with explicit severity, module and state.
///
/// ```
/// # use gpa_logger::prelude::*;
/// # let logger = Logger::new();
/// use gpa_logger::log_message;
/// log_message!(logger, Severity::Info, Module::GENERIC, MessageState::Complete, "hello {}", 5);
/// ```
#[macro_export]
macro_rules! log_message {
    ($logger:expr, $severity:expr, $module:expr, $state:expr, $($arg:tt)+) => {
        $logger.log_message($severity, $module, $state, format_args!($($arg)+))
    };
}

/// Log a single-shot message at the given severity.
///
/// ```
/// # use gpa_logger::prelude::*;
/// # let logger = Logger::new();
/// use gpa_logger::log;
/// log!(logger, Severity::Info, "Simple message");
/// log!(logger, Severity::Error, "Error code: {}", 500);
/// log!(logger, Severity::Warn, module = Module::PAGE_TRACKER; "tracked");
/// ```
#[macro_export]
macro_rules! log {
    ($logger:expr, $severity:expr, module = $module:expr; $($arg:tt)+) => {
        $crate::log_message!($logger, $severity, $module, $crate::MessageState::Complete, $($arg)+)
    };
    ($logger:expr, $severity:expr, $($arg:tt)+) => {
        $crate::log_message!(
            $logger,
            $severity,
            $crate::Module::GENERIC,
            $crate::MessageState::Complete,
            $($arg)+
        )
    };
}

/// Open a multi-part message at the given severity.
#[macro_export]
macro_rules! log_begin {
    ($logger:expr, $severity:expr, module = $module:expr; $($arg:tt)+) => {
        $crate::log_message!($logger, $severity, $module, $crate::MessageState::Begin, $($arg)+)
    };
    ($logger:expr, $severity:expr, $($arg:tt)+) => {
        $crate::log_message!(
            $logger,
            $severity,
            $crate::Module::GENERIC,
            $crate::MessageState::Begin,
            $($arg)+
        )
    };
}

/// Continue the multi-part message opened by this thread.
#[macro_export]
macro_rules! log_continue {
    ($logger:expr, $severity:expr, module = $module:expr; $($arg:tt)+) => {
        $crate::log_message!($logger, $severity, $module, $crate::MessageState::Continue, $($arg)+)
    };
    ($logger:expr, $severity:expr, $($arg:tt)+) => {
        $crate::log_message!(
            $logger,
            $severity,
            $crate::Module::GENERIC,
            $crate::MessageState::Continue,
            $($arg)+
        )
    };
}

/// End the multi-part message opened by this thread.
#[macro_export]
macro_rules! log_end {
    ($logger:expr, $severity:expr, module = $module:expr; $($arg:tt)+) => {
        $crate::log_message!($logger, $severity, $module, $crate::MessageState::End, $($arg)+)
    };
    ($logger:expr, $severity:expr, $($arg:tt)+) => {
        $crate::log_message!(
            $logger,
            $severity,
            $crate::Module::GENERIC,
            $crate::MessageState::End,
            $($arg)+
        )
    };
}

/// Log a trace-level message.
///
/// Compiled out of builds without `debug_assertions`: nothing is dispatched
/// and the result is [`Delivery::Filtered`](crate::Delivery::Filtered). The
/// arguments are still type-checked. `trace_begin!` and friends are not
/// affected.
#[macro_export]
macro_rules! trace {
    ($logger:expr, $($arg:tt)+) => {
        if cfg!(debug_assertions) {
            $crate::log!($logger, $crate::Severity::Trace, $($arg)+)
        } else {
            $crate::Delivery::Filtered
        }
    };
}

/// Log a debug-level message.
#[macro_export]
macro_rules! debug {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::Severity::Debug, $($arg)+)
    };
}

/// Log an info-level message.
///
/// ```
/// # use gpa_logger::prelude::*;
/// # let logger = Logger::new();
/// use gpa_logger::info;
/// info!(logger, "Application started");
/// info!(logger, "Processing {} items", 100);
/// ```
#[macro_export]
macro_rules! info {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::Severity::Info, $($arg)+)
    };
}

/// Log a warning-level message.
#[macro_export]
macro_rules! warn {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::Severity::Warn, $($arg)+)
    };
}

/// Log an error-level message.
#[macro_export]
macro_rules! error {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::Severity::Error, $($arg)+)
    };
}

/// Log a fatal-level message.
#[macro_export]
macro_rules! fatal {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::Severity::Fatal, $($arg)+)
    };
}

#[macro_export]
macro_rules! trace_begin {
    ($logger:expr, $($arg:tt)+) => { $crate::log_begin!($logger, $crate::Severity::Trace, $($arg)+) };
}

#[macro_export]
macro_rules! trace_continue {
    ($logger:expr, $($arg:tt)+) => { $crate::log_continue!($logger, $crate::Severity::Trace, $($arg)+) };
}

#[macro_export]
macro_rules! trace_end {
    ($logger:expr, $($arg:tt)+) => { $crate::log_end!($logger, $crate::Severity::Trace, $($arg)+) };
}

#[macro_export]
macro_rules! debug_begin {
    ($logger:expr, $($arg:tt)+) => { $crate::log_begin!($logger, $crate::Severity::Debug, $($arg)+) };
}

#[macro_export]
macro_rules! debug_continue {
    ($logger:expr, $($arg:tt)+) => { $crate::log_continue!($logger, $crate::Severity::Debug, $($arg)+) };
}

#[macro_export]
macro_rules! debug_end {
    ($logger:expr, $($arg:tt)+) => { $crate::log_end!($logger, $crate::Severity::Debug, $($arg)+) };
}

#[macro_export]
macro_rules! info_begin {
    ($logger:expr, $($arg:tt)+) => { $crate::log_begin!($logger, $crate::Severity::Info, $($arg)+) };
}

#[macro_export]
macro_rules! info_continue {
    ($logger:expr, $($arg:tt)+) => { $crate::log_continue!($logger, $crate::Severity::Info, $($arg)+) };
}

#[macro_export]
macro_rules! info_end {
    ($logger:expr, $($arg:tt)+) => { $crate::log_end!($logger, $crate::Severity::Info, $($arg)+) };
}

#[macro_export]
macro_rules! warn_begin {
    ($logger:expr, $($arg:tt)+) => { $crate::log_begin!($logger, $crate::Severity::Warn, $($arg)+) };
}

#[macro_export]
macro_rules! warn_continue {
    ($logger:expr, $($arg:tt)+) => { $crate::log_continue!($logger, $crate::Severity::Warn, $($arg)+) };
}

#[macro_export]
macro_rules! warn_end {
    ($logger:expr, $($arg:tt)+) => { $crate::log_end!($logger, $crate::Severity::Warn, $($arg)+) };
}

#[macro_export]
macro_rules! error_begin {
    ($logger:expr, $($arg:tt)+) => { $crate::log_begin!($logger, $crate::Severity::Error, $($arg)+) };
}

#[macro_export]
macro_rules! error_continue {
    ($logger:expr, $($arg:tt)+) => { $crate::log_continue!($logger, $crate::Severity::Error, $($arg)+) };
}

#[macro_export]
macro_rules! error_end {
    ($logger:expr, $($arg:tt)+) => { $crate::log_end!($logger, $crate::Severity::Error, $($arg)+) };
}

#[macro_export]
macro_rules! fatal_begin {
    ($logger:expr, $($arg:tt)+) => { $crate::log_begin!($logger, $crate::Severity::Fatal, $($arg)+) };
}

#[macro_export]
macro_rules! fatal_continue {
    ($logger:expr, $($arg:tt)+) => { $crate::log_continue!($logger, $crate::Severity::Fatal, $($arg)+) };
}

#[macro_export]
macro_rules! fatal_end {
    ($logger:expr, $($arg:tt)+) => { $crate::log_end!($logger, $crate::Severity::Fatal, $($arg)+) };
}

#[cfg(test)]
mod tests {
    use crate::appenders::MemoryAppender;
    use crate::core::{Delivery, Logger, LoggerConfig, MessageState, Module, Severity};

    fn capture(config: LoggerConfig) -> (Logger, MemoryAppender) {
        let logger = Logger::init(config);
        let memory = MemoryAppender::new();
        logger.add_appender(memory.clone());
        (logger, memory)
    }

    #[test]
    fn test_log_macro() {
        let (logger, memory) = capture(LoggerConfig::default());
        log!(logger, Severity::Info, "Test message");
        log!(logger, Severity::Info, "Formatted: {}", 42);
        assert_eq!(memory.messages(), ["Test message", "Formatted: 42"]);
    }

    #[test]
    fn test_level_macros() {
        let (logger, memory) =
            capture(LoggerConfig::default().with_log_level(Severity::Trace));
        trace_begin!(logger, "t {}", 1);
        trace_end!(logger, "");
        debug!(logger, "d");
        info!(logger, "i");
        warn!(logger, "w");
        error!(logger, "e {}", "x");
        fatal!(logger, "f");

        let severities: Vec<_> = memory.records().iter().map(|r| r.severity).collect();
        assert_eq!(severities[1..], Severity::ALL);
        assert_eq!(memory.messages()[0], "t 1");
    }

    #[test]
    fn test_trace_gated_on_debug_assertions() {
        let (logger, memory) =
            capture(LoggerConfig::default().with_log_level(Severity::Trace));
        let delivery = trace!(logger, "t {}", 1);
        assert_eq!(delivery.is_delivered(), cfg!(debug_assertions));
        assert_eq!(memory.records().len(), usize::from(cfg!(debug_assertions)));

        // Explicit severity is never gated
        assert!(log!(logger, Severity::Trace, "kept").is_delivered());
        assert_eq!(memory.messages().last().map(String::as_str), Some("kept"));
    }

    #[test]
    fn test_module_form() {
        let (logger, memory) = capture(LoggerConfig::default());
        let delivery = info!(logger, module = Module::PAGE_TRACKER; "masked {}", 1);
        assert_eq!(delivery, Delivery::Filtered);

        let delivery = info!(logger, module = Module::GENERIC | Module::PAGE_TRACKER; "shared");
        assert!(delivery.is_delivered());
        assert_eq!(memory.messages(), ["shared"]);
    }

    #[test]
    fn test_multipart_macros() {
        let (logger, memory) = capture(LoggerConfig::default());
        warn_begin!(logger, "a");
        warn_continue!(logger, "{}", "b");
        warn_end!(logger, "c");

        let states: Vec<_> = memory.records().iter().map(|r| r.state).collect();
        assert_eq!(
            states,
            [MessageState::Begin, MessageState::Continue, MessageState::End]
        );
        assert_eq!(memory.rendered(), "abc\n");
    }

    #[test]
    fn test_log_message_macro() {
        let (logger, memory) = capture(LoggerConfig::default());
        log_message!(logger, Severity::Info, Module::GENERIC, MessageState::Complete, "hello {}", 5);
        assert_eq!(memory.messages(), ["hello 5"]);
    }
}
