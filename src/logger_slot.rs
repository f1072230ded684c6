use crate::{
    util::{eprint_err, ErrorCode},
    KvLogError, Logger, Retirer,
};
use arc_swap::{ArcSwap, Guard};
use std::{sync::Arc, thread::Builder as ThreadBuilder};

const RETIRER: &str = "kvlog-retirer";

/// Holds the logger that is currently in use, and allows replacing it while other
/// threads are logging.
///
/// Readers take a snapshot of the current logger for each call.
/// A thread that still holds a snapshot of a replaced logger can continue to use it safely;
/// its lines are dropped once the replaced logger is closed.
///
/// The process-wide logger that is used by [`init`](crate::init) and the logging macros
/// lives in such a slot.
pub struct LoggerSlot {
    current: ArcSwap<Logger>,
}

impl LoggerSlot {
    /// Creates a slot that holds the given logger.
    #[must_use]
    pub fn new(logger: Logger) -> Self {
        Self {
            current: ArcSwap::from_pointee(logger),
        }
    }

    /// A snapshot of the current logger.
    #[must_use]
    pub fn current(&self) -> Arc<Logger> {
        self.current.load_full()
    }

    pub(crate) fn load(&self) -> Guard<Arc<Logger>> {
        self.current.load()
    }

    /// Installs a new logger and closes the previous one in a background thread.
    ///
    /// Closing writes out everything the previous logger had accepted.
    /// The returned handle allows waiting for that.
    ///
    /// # Errors
    ///
    /// [`KvLogError::Io`] if the background thread cannot be spawned;
    /// the new logger is installed nevertheless, and the previous one is closed
    /// when its last snapshot is dropped.
    pub fn replace(&self, logger: Logger) -> Result<Retirer, KvLogError> {
        let previous = self.current.swap(Arc::new(logger));
        Ok(ThreadBuilder::new()
            .name(RETIRER.to_string())
            .spawn(move || {
                previous.close().inspect_err(|e| {
                    eprint_err(ErrorCode::Close, "closing the replaced logger failed", e);
                })
            })?)
    }
}

impl std::fmt::Debug for LoggerSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> Result<(), std::fmt::Error> {
        f.debug_struct("LoggerSlot")
            .field("current", &self.current.load())
            .finish()
    }
}

#[cfg(test)]
mod test {
    use super::LoggerSlot;
    use crate::{
        writers::{AsyncWriter, MemorySink},
        LogContext, Logger, Severity,
    };
    use std::sync::Arc;

    fn memory_logger(sink: &MemorySink) -> Logger {
        Logger::with_writers(AsyncWriter::new(sink.clone(), 100_000).unwrap(), None)
            .max_level(Severity::Debug)
            .mirror_to_terminal(false)
            .build()
            .unwrap()
    }

    #[test]
    fn replace_keeps_old_lines_and_closes_once() {
        let old_sink = MemorySink::new();
        let new_sink = MemorySink::new();
        let slot = Arc::new(LoggerSlot::new(memory_logger(&old_sink)));

        let writers: Vec<_> = (0..4)
            .map(|t| {
                let slot = Arc::clone(&slot);
                std::thread::spawn(move || {
                    let ctx = LogContext::new().with_kv("thread", t);
                    for i in 0..1000 {
                        crate::info!(logger: &slot.current(), &ctx, "line {}", i);
                    }
                })
            })
            .collect();

        let snapshot = slot.current();
        crate::info!(logger: &snapshot, &LogContext::new(), "before the swap");
        let retirer = slot.replace(memory_logger(&new_sink)).unwrap();
        crate::info!(logger: &slot.current(), &LogContext::new(), "after the swap");

        for w in writers {
            w.join().unwrap();
        }
        retirer.join().unwrap().unwrap();
        assert!(snapshot.is_closed());

        // a stale snapshot can still be used, its lines are dropped
        crate::info!(logger: &snapshot, &LogContext::new(), "stale");
        drop(snapshot);

        let old_lines = old_sink.lines();
        assert!(old_lines.iter().any(|l| l.ends_with("||before the swap")));
        assert!(!old_lines.iter().any(|l| l.ends_with("||stale")));
        assert_eq!(old_sink.close_count(), 1);

        slot.current().flush().unwrap();
        let new_lines = new_sink.lines();
        assert!(new_lines.iter().any(|l| l.ends_with("||after the swap")));
        // lines of threads that still held the old snapshot after closing are dropped
        assert!(old_lines.len() + new_lines.len() <= 4 * 1000 + 2);
        assert_eq!(new_sink.close_count(), 0);
    }
}
