//! # GPA Logger
//!
//! An embeddable logging engine: messages tagged with a [`Severity`] and a
//! [`Module`] are filtered against a [`LoggerConfig`] and fanned out to
//! pluggable [`Appender`]s.
//!
//! ## Features
//!
//! - **Filtering before formatting**: rejected calls never render their
//!   arguments
//! - **Multi-part messages**: a line built from `Begin`, `Continue` and `End`
//!   fragments reaches every appender without interleaving from other threads
//! - **Concurrent registration**: appenders can be added and removed while
//!   other threads log
//! - **Graceful misuse**: out-of-sequence fragments are delivered in a
//!   well-formed shape and reported
//!
//! ## Example
//!
//! ```
//! use gpa_logger::prelude::*;
//! use gpa_logger::{info, info_begin, info_continue, info_end};
//!
//! let mut logger = Logger::init(LoggerConfig::new("demo").with_show_level(true));
//! let memory = MemoryAppender::new();
//! logger.add_appender(memory.clone());
//!
//! info!(logger, "loaded {} assets", 12);
//! info_begin!(logger, "scanning");
//! info_continue!(logger, ".");
//! info_end!(logger, " done");
//!
//! assert_eq!(
//!     memory.rendered(),
//!     "[demo] [INFO ] loaded 12 assets\n[demo] [INFO ] scanning. done\n"
//! );
//! logger.shutdown();
//! ```

pub mod appenders;
pub mod core;
pub mod macros;

pub mod prelude {
    pub use crate::appenders::{ConsoleAppender, FileAppender, JsonAppender, MemoryAppender};
    pub use crate::core::{
        module_mask_from_string, severity_from_string, Appender, AppenderHandle, Delivery,
        Logger, LoggerBuilder, LoggerConfig, LoggerError, LoggerMetrics, MessageState, Module,
        MultipartMessage, ProtocolViolation, Result, Severity, TimestampFormat,
    };
}

pub use appenders::{ConsoleAppender, FileAppender, JsonAppender, MemoryAppender};
pub use crate::core::{
    module_mask_from_string, render_fragment, severity_from_string, should_deliver, Appender,
    AppenderHandle, Delivery, Logger, LoggerBuilder, LoggerConfig, LoggerError, LoggerMetrics,
    MessageState, Module, MultipartMessage, ProtocolViolation, Result, Severity,
    TimestampFormat, MAX_NAME_LENGTH,
};
