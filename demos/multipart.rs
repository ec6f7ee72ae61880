//! Multi-part message example
//!
//! Builds log lines from several fragments while other threads log
//! concurrently. Each line comes out whole.
//!
//! Run with: cargo run --example multipart

use gpa_logger::prelude::*;
use gpa_logger::{info, warn_begin, warn_continue, warn_end};
use std::thread;

fn main() {
    println!("=== GPA Logger - Multi-part Example ===\n");

    let mut logger = Logger::init(
        LoggerConfig::new("multipart")
            .with_log_level(Severity::Debug)
            .with_show_level(true),
    );
    logger.add_appender(ConsoleAppender::with_colors(false));

    println!("1. Handle API:");
    let mut line = logger.begin(Severity::Info, Module::GENERIC, format_args!("free pages:"));
    for count in [12, 0, 7] {
        line.continue_with(format_args!(" {}", count));
    }
    line.end(format_args!(""));

    println!("\n2. Macros:");
    warn_begin!(logger, "retrying");
    for _ in 0..3 {
        warn_continue!(logger, ".");
    }
    warn_end!(logger, " giving up");

    println!("\n3. Concurrent writers:");
    thread::scope(|s| {
        for worker in 0..3 {
            let logger = &logger;
            s.spawn(move || {
                for step in 0..3 {
                    let mut line =
                        logger.begin(Severity::Debug, Module::GENERIC, format_args!("worker {}:", worker));
                    line.continue_with(format_args!(" step {}", step));
                    line.end(format_args!(" done"));
                    info!(logger, "worker {} single line", worker);
                }
            });
        }
    });

    println!("\n4. Forgotten end:");
    {
        let _line = logger.begin(Severity::Info, Module::GENERIC, format_args!("never finished"));
    }

    logger.shutdown();
    println!("\n=== Example completed successfully! ===");
}
