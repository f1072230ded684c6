// only enables the `doc_cfg` feature when the `docsrs` configuration attribute is defined
#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
//! A leveled, structured logger that writes asynchronously into a primary and an error log file.
//!
//! Each log line carries the severity, a timestamp, the call site, an optional tag
//! and key-value pairs, and the message:
//!
//! ```text
//! [INFO][2019-07-03T12:34:56.789+08:00][server.rs:28@app::server::start] request||user=42||accepted
//! ```
//!
//! Configure the process-wide logger once, and then use the macros:
//!
//! ```rust,no_run
//! use kvlog::{Config, LogContext};
//!
//! kvlog::init(Config::default().log_level("debug").package_prefix("app")).unwrap();
//!
//! let ctx = LogContext::new().with_tag("request").with_kv("user", 42);
//! kvlog::info!(&ctx, "accepted");
//! kvlog::debug!("{} items in the queue", 7);
//!
//! kvlog::close().unwrap();
//! ```
//!
//! Before [`init`] is called, all lines go to stdout.
//!
//! Severities are ordered from most to least severe as
//! `Fatal`, `Error`, `Warn`, `Trace`, `Info`, `Debug`;
//! see [`Severity`] for the details, and [`Logger`] for the routing to the two logs.
//!
//! A [`Logger`] can also be created and used directly, see the `logger:` form of the macros.
//! Libraries that log via the [`log`](https://docs.rs/log) facade can be connected with
//! [`bridge::install`].
//!
//! See
//!
//! * the module [`writers`] for the outputs and the asynchronous writer,
//! * the module [`error_info`] for the error codes that `kvlog` prints to stderr
//!   when something goes wrong that it cannot report otherwise.

mod call_site;
mod clock;
mod config;
mod context;
mod fatal;
mod formats;
mod kvlog_error;
mod logger;
mod logger_slot;
mod macros;
mod severity;
mod util;

pub mod bridge;
pub mod error_info;
pub mod writers;

pub use crate::call_site::Origin;
pub use crate::clock::Clock;
pub use crate::config::{
    Config, DEFAULT_BUFFERED_LINES, DEFAULT_ERROR_LOG_LEVEL, DEFAULT_ERROR_LOG_PATH,
    DEFAULT_LOG_LEVEL, DEFAULT_LOG_PATH,
};
pub use crate::context::{KeyValue, LogContext};
pub use crate::fatal::{Fatal, FATAL_EXIT_CODE};
pub use crate::formats::{MAX_LINE_LENGTH, UNTAGGED};
pub use crate::kvlog_error::KvLogError;
pub use crate::logger::{Logger, LoggerBuilder};
pub use crate::logger_slot::LoggerSlot;
pub use crate::severity::Severity;

use std::{fmt, sync::Arc, sync::LazyLock, thread::JoinHandle};

static LOGGER: LazyLock<LoggerSlot> = LazyLock::new(|| LoggerSlot::new(Logger::fallback()));

/// Joining it waits until the previous logger has written out its lines and closed its outputs.
pub type Retirer = JoinHandle<Result<(), KvLogError>>;

/// Replaces the process-wide logger with one that writes into the files of the given configuration.
///
/// Can be called repeatedly. Lines that were accepted by the previous logger are
/// written out to its outputs in the background, then its outputs are closed.
/// The returned [`Retirer`] can be joined to wait for that; dropping it detaches the thread.
///
/// # Errors
///
/// [`KvLogError::Io`] if a log file cannot be opened or a thread cannot be spawned;
/// the previous logger then stays in place.
pub fn init(config: Config) -> Result<Retirer, KvLogError> {
    init_with(Logger::builder(config).build()?)
}

/// Replaces the process-wide logger with the given one.
///
/// See [`init`] for the returned [`Retirer`].
///
/// # Errors
///
/// [`KvLogError::Io`] if the background thread that closes the previous logger
/// cannot be spawned; the given logger is installed nevertheless.
pub fn init_with(logger: Logger) -> Result<Retirer, KvLogError> {
    LOGGER.replace(logger)
}

/// A snapshot of the process-wide logger.
#[must_use]
pub fn current() -> Arc<Logger> {
    LOGGER.current()
}

/// Blocks until the process-wide logger has handed all lines to its outputs.
///
/// # Errors
///
/// See [`Logger::flush`].
pub fn flush() -> Result<(), KvLogError> {
    LOGGER.load().flush()
}

/// Rotates the log files of the process-wide logger.
///
/// # Errors
///
/// See [`Logger::rotate`].
pub fn rotate() -> Result<(), KvLogError> {
    LOGGER.load().rotate()
}

/// Writes out everything and closes the process-wide logger.
///
/// Should be called before the program ends. Further lines are dropped
/// until [`init`] installs a new logger.
///
/// # Errors
///
/// See [`Logger::close`].
pub fn close() -> Result<(), KvLogError> {
    LOGGER.load().close()
}

#[doc(hidden)]
pub fn __log_to_current(
    severity: Severity,
    context: &LogContext,
    origin: &Origin,
    args: fmt::Arguments,
) -> Result<(), Fatal> {
    LOGGER.load().log(severity, context, origin, args)
}
