//! Logging infrastructure.
//!
//! This module provides:
//! - Per-run loggers writing a dedicated log file
//! - Compact mode with progress filtering
//! - Tail buffer for error diagnosis
//! - Integration with the `tracing` ecosystem
//!
//! # Example
//!
//! ```no_run
//! use bilingual_core::logging::{LogConfig, RunLogger};
//!
//! let logger = RunLogger::new("my_run", "/path/to/logs", LogConfig::default()).unwrap();
//!
//! logger.phase("Segment");
//! logger.progress(50);
//! logger.success("Run completed");
//! ```

mod run_logger;
mod types;

pub use run_logger::RunLogger;
pub use types::{LogConfig, LogLevel, MessagePrefix};

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize global tracing subscriber for application-wide logging.
///
/// This sets up a subscriber that:
/// - Respects RUST_LOG environment variable
/// - Falls back to the provided default level
/// - Outputs to stderr, compact or full format
///
/// Should be called once at application startup.
pub fn init_tracing(default_level: LogLevel, compact: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level_to_filter_str(default_level)));

    let layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(!compact)
        .with_thread_ids(false);

    if compact {
        tracing_subscriber::registry()
            .with(layer.compact())
            .with(filter)
            .init();
    } else {
        tracing_subscriber::registry().with(layer).with(filter).init();
    }
}

/// Convert LogLevel to filter string.
fn level_to_filter_str(level: LogLevel) -> &'static str {
    match level {
        LogLevel::Trace => "trace",
        LogLevel::Debug => "debug",
        LogLevel::Info => "info",
        LogLevel::Warn => "warn",
        LogLevel::Error => "error",
    }
}
