//! Output plumbing of `kvlog`.
//!
//! Each output is a [`Sink`]. A [`Logger`](crate::Logger) never writes to a sink directly;
//! it hands the finished lines to an [`AsyncWriter`], which owns the sink
//! and does the blocking I/O in its own thread:
//!
//! * [`RotatingFile`] appends to a log file and moves it aside on [`RotatingFile::rotate`]
//!   or when it grows too large,
//! * [`StdStream`] writes to stdout or stderr,
//! * [`MemorySink`] collects the output in memory, which is mainly useful in tests.
//!
//! A [`DirectWriter`] is the synchronous alternative to an [`AsyncWriter`]:
//! it writes in the calling thread and never drops a line.
//!
//! You can also implement [`Sink`] yourself and drive it with an [`AsyncWriter`],
//! e.g. to feed a [`Logger`](crate::Logger) created with
//! [`Logger::with_writers`](crate::Logger::with_writers).
//!
//! ```rust
//! use kvlog::writers::{AsyncWriter, MemorySink};
//!
//! let sink = MemorySink::new();
//! let writer = AsyncWriter::new(sink.clone(), 1024).unwrap();
//! writer.write_bytes(b"hello\n").unwrap();
//! writer.flush().unwrap();
//! assert_eq!(sink.contents(), b"hello\n");
//! ```

mod async_writer;
mod direct_writer;
mod rotating_file;
mod sink;

pub use self::async_writer::{AsyncWriter, DEFAULT_POOL_CAPA};
pub use self::direct_writer::DirectWriter;
pub use self::rotating_file::{RotatingFile, DEFAULT_MAX_FILE_SIZE};
pub use self::sink::{MemorySink, Sink, StdStream};
