//! Logging infrastructure for ffbatch.
//!
//! This module provides:
//! - A per-run logger with feed + file dual output
//! - The log channel drained by the presentation layer
//! - Tail buffer for error diagnosis
//! - Integration with the `tracing` ecosystem
//!
//! # Example
//!
//! ```no_run
//! use ffbatch_core::logging::{log_channel, LogConfig, RunLogger};
//!
//! let (tx, feed) = log_channel();
//! let logger = RunLogger::to_feed("run", LogConfig::default(), tx);
//!
//! logger.phase("Compress");
//! logger.command("ffmpeg -i input.mp4 ...");
//! logger.success("Done");
//!
//! for line in feed.drain() {
//!     println!("{line}");
//! }
//! ```

mod channel;
mod run_logger;
mod types;

pub use channel::{log_channel, LogFeed, LogSender};
pub use run_logger::{RunLogger, RunLoggerBuilder};
pub(crate) use run_logger::sanitize_filename;
pub use types::{LogConfig, LogLevel, MessagePrefix};

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize the global tracing subscriber: stderr plus a non-blocking
/// `ffbatch.log` in `log_dir`.
///
/// `RUST_LOG` overrides `default_level`. Call once at startup.
///
/// Keep the returned guard alive until exit so buffered lines are flushed.
pub fn init_tracing_with_file(
    default_level: LogLevel,
    log_dir: &Path,
) -> std::io::Result<WorkerGuard> {
    std::fs::create_dir_all(log_dir)?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level.as_filter_str()));

    let appender = tracing_appender::rolling::never(log_dir, "ffbatch.log");
    let (file_writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_thread_ids(false),
        )
        .with(fmt::layer().with_writer(file_writer).with_ansi(false))
        .with(filter)
        .init();

    Ok(guard)
}

/// Initialize tracing for tests (only logs warnings and above).
#[cfg(test)]
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("warn")
        .with_test_writer()
        .try_init();
}
