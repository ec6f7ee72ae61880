//! Appender implementations

pub mod console;
pub mod file;
pub mod json;
pub mod memory;

pub use console::ConsoleAppender;
pub use file::FileAppender;
pub use json::JsonAppender;
pub use memory::{MemoryAppender, Record};

// Re-export the trait for implementors
pub use crate::core::{Appender, AppenderHandle};
