use std::{
    io::{self, Stderr, Stdout, Write},
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
};

/// A blocking output for finished log lines.
///
/// Sinks are driven by exactly one [`AsyncWriter`](super::AsyncWriter) thread,
/// or by the callers of a [`DirectWriter`](super::DirectWriter) one at a time,
/// so they need to be `Send`, but not `Sync`.
pub trait Sink: Send {
    /// Writes out a complete log line.
    ///
    /// # Errors
    ///
    /// If the underlying output fails.
    fn write_all(&mut self, line: &[u8]) -> io::Result<()>;

    /// Flushes buffered output, if any.
    ///
    /// # Errors
    ///
    /// If the underlying output fails.
    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }

    /// Releases the output; no further calls follow.
    ///
    /// # Errors
    ///
    /// If the underlying output fails.
    fn close(&mut self) -> io::Result<()> {
        self.flush()
    }
}

/// Abstraction over stdout and stderr.
pub enum StdStream {
    /// Writes to stdout.
    Out(Stdout),
    /// Writes to stderr.
    Err(Stderr),
}
impl StdStream {
    /// Writes to stdout.
    #[must_use]
    pub fn stdout() -> Self {
        Self::Out(io::stdout())
    }

    /// Writes to stderr.
    #[must_use]
    pub fn stderr() -> Self {
        Self::Err(io::stderr())
    }

    fn deref_mut(&mut self) -> &mut dyn Write {
        match self {
            StdStream::Out(ref mut s) => s as &mut dyn Write,
            StdStream::Err(ref mut s) => s as &mut dyn Write,
        }
    }
}
impl Sink for StdStream {
    fn write_all(&mut self, line: &[u8]) -> io::Result<()> {
        self.deref_mut().write_all(line)
    }
    fn flush(&mut self) -> io::Result<()> {
        self.deref_mut().flush()
    }
}

/// Collects all output in a shared memory buffer.
///
/// Clones share the buffer, so you can keep one clone to inspect what
/// the writer that owns the other clone has written.
#[derive(Clone, Default)]
pub struct MemorySink {
    buffer: Arc<Mutex<Vec<u8>>>,
    close_count: Arc<AtomicUsize>,
}
impl MemorySink {
    /// Creates an empty buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A copy of everything that was written so far.
    #[must_use]
    pub fn contents(&self) -> Vec<u8> {
        self.buffer.lock().map(|b| b.clone()).unwrap_or_default()
    }

    /// Everything that was written so far, split into lines.
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        String::from_utf8_lossy(&self.contents())
            .lines()
            .map(ToString::to_string)
            .collect()
    }

    /// How often the sink was closed.
    #[must_use]
    pub fn close_count(&self) -> usize {
        self.close_count.load(Ordering::SeqCst)
    }
}
impl Sink for MemorySink {
    fn write_all(&mut self, line: &[u8]) -> io::Result<()> {
        self.buffer
            .lock()
            .map_err(|_| io::Error::other("memory sink is poisoned"))?
            .extend_from_slice(line);
        Ok(())
    }
    fn close(&mut self) -> io::Result<()> {
        self.close_count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
