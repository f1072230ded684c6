//! Connects the [`log`](https://docs.rs/log) facade to the process-wide logger.
//!
//! Records of libraries that use `log` then end up in the same files as the lines of the
//! `kvlog` macros. Their call site shows the module path instead of the function name,
//! and their target is used as tag if it differs from the module path.
//!
//! ```rust,no_run
//! kvlog::init(kvlog::Config::default()).unwrap();
//! kvlog::bridge::install().unwrap();
//! log::info!("this goes through kvlog");
//! ```
//!
//! `log` has no counterpart for `kvlog`'s `Trace`, which is more severe than `Info`;
//! so `log::Level::Trace` is mapped to [`Severity::Debug`](crate::Severity::Debug).

use crate::{
    util::{eprint_err, ErrorCode},
    KvLogError, LogContext, Origin, Severity,
};

const UNKNOWN: &str = "<unknown>";

/// Implementation of [`log::Log`] that forwards to the current process-wide logger.
#[derive(Debug, Default)]
pub struct LogBridge;

impl log::Log for LogBridge {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        Severity::from(metadata.level()).is_enabled_for(crate::LOGGER.load().max_level())
    }

    fn log(&self, record: &log::Record) {
        let module_path = record.module_path_static().unwrap_or(UNKNOWN);
        let origin = Origin::new(
            record.file_static().unwrap_or(UNKNOWN),
            record.line().unwrap_or(0),
            0,
            module_path,
        );
        let context = if record.target() == module_path {
            LogContext::new()
        } else {
            LogContext::new().with_tag(record.target())
        };
        // log::Level has no fatal severity
        let _ = crate::LOGGER.load().log(
            Severity::from(record.level()),
            &context,
            &origin,
            *record.args(),
        );
    }

    fn flush(&self) {
        if let Err(e) = crate::flush() {
            eprint_err(ErrorCode::Flush, "flushing the log bridge failed", &e);
        }
    }
}

/// Registers [`LogBridge`] as the logger of the `log` facade.
///
/// The `log` max level is opened completely; filtering happens with the level
/// of the current `kvlog` logger, which can change with every [`init`](crate::init).
///
/// # Errors
///
/// [`KvLogError::Log`] if another logger was already registered with `log`.
pub fn install() -> Result<(), KvLogError> {
    log::set_boxed_logger(Box::new(LogBridge))?;
    log::set_max_level(log::LevelFilter::Trace);
    Ok(())
}
