//! Error codes of `kvlog`.
//!
//! Some failures happen where no caller can be told about them, e.g. in the
//! background thread of an [`AsyncWriter`](crate::writers::AsyncWriter).
//! `kvlog` then prints a line with one of the following error codes to stderr.
//!
//! ## `Write`
//!
//! Writing a log line to its output failed.
//!
//! Example:
//!
//! ```text
//! [kvlog][ERRCODE::Write] writing log line failed, caused by Os { code: 28, kind: StorageFull, .. }
//! ```
//!
//! The writer continues with the next lines. The first such error is also returned
//! by the next [`flush`](crate::flush) or [`close`](crate::close).
//!
//! ## `Flush`
//!
//! Flushing the outputs failed when the [`log`](https://docs.rs/log) facade asked for it,
//! see [`bridge`](crate::bridge).
//!
//! Example:
//!
//! ```text
//! [kvlog][ERRCODE::Flush] flushing the log bridge failed, caused by WriterClosed
//! ```
//!
//! ## `Close`
//!
//! Closing an output failed in a situation where nobody waits for the result:
//! when an [`AsyncWriter`](crate::writers::AsyncWriter) is dropped without being closed,
//! or when a logger that was replaced by [`init`](crate::init) is closed in the background.
//!
//! Example:
//!
//! ```text
//! [kvlog][ERRCODE::Close] closing the replaced logger failed, caused by Io(..)
//! ```
//!
//! ## `LogFile`
//!
//! A log file could not be rotated automatically after it reached its maximum size.
//!
//! Example:
//!
//! ```text
//! [kvlog][ERRCODE::LogFile] rotation of the log file failed, caused by Os { code: 13, kind: PermissionDenied, .. }
//! ```
//!
//! Writing continues into the current file. Check the permissions of the log directory.
