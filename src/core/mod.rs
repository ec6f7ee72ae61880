//! Core logger types and traits

pub mod appender;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod filter;
pub mod logger;
pub mod message_state;
pub mod metrics;
pub mod module;
pub mod registry;
pub mod render;
pub mod severity;
pub mod timestamp;

pub use appender::{Appender, AppenderHandle};
pub use config::{LoggerConfig, MAX_NAME_LENGTH};
pub use coordinator::ProtocolViolation;
pub use error::{LoggerError, Result};
pub use filter::should_deliver;
pub use logger::{Delivery, Logger, LoggerBuilder, MultipartMessage};
pub use message_state::MessageState;
pub use metrics::LoggerMetrics;
pub use module::{module_mask_from_string, Module};
pub use registry::AppenderRegistry;
pub use render::{render_fragment, render_prefix};
pub use severity::{severity_from_string, Severity};
pub use timestamp::TimestampFormat;
