//! Basic logger usage example
//!
//! Demonstrates severity filtering, module masks and the console and file
//! appenders.
//!
//! Run with: cargo run --example basic_usage

use gpa_logger::prelude::*;
use gpa_logger::{debug, error, info, trace, warn};

fn main() -> Result<()> {
    println!("=== GPA Logger - Basic Usage Example ===\n");

    let mut logger = Logger::builder()
        .app_name("basic")
        .log_level(Severity::Trace)
        .show_level(true)
        .use_colors(true)
        .timestamp_format(TimestampFormat::Short)
        .appender(ConsoleAppender::new())
        .build();

    println!("1. Logging at different levels:");
    logger.trace("This is a trace message");
    logger.debug("This is a debug message");
    logger.info("This is an info message");
    logger.warn("This is a warning message");
    logger.error("This is an error message");
    logger.fatal("This is a fatal message");

    println!("\n2. Raising the threshold to WARN:");
    logger.reinit(
        LoggerConfig::new("basic")
            .with_log_level(severity_from_string("warn"))
            .with_show_level(true),
    );
    logger.add_appender(ConsoleAppender::with_colors(false));
    trace!(logger, "Trace message (hidden)");
    debug!(logger, "Debug message (hidden)");
    info!(logger, "Info message (hidden)");
    warn!(logger, "Warning message (visible)");

    println!("\n3. Module masks:");
    logger.reinit(
        LoggerConfig::new("basic")
            .with_mask(module_mask_from_string("PageTracker"))
            .with_show_level(true),
    );
    logger.add_appender(ConsoleAppender::with_colors(false));
    info!(logger, "Generic message (hidden)");
    info!(logger, module = Module::PAGE_TRACKER; "Page tracker message (visible)");

    println!("\n4. Logging to a file:");
    let path = std::env::temp_dir().join("gpa_logger_basic.log");
    let file = logger.add_appender(FileAppender::new(&path)?);
    error!(logger, module = Module::PAGE_TRACKER; "{} pages failed to map", 3);
    logger.flush()?;
    logger.remove_appender(&file);
    println!("   Wrote to {}", path.display());

    logger.shutdown();
    println!("\n=== Example completed successfully! ===");

    Ok(())
}
