use super::Sink;
use crate::KvLogError;
use std::sync::{Mutex, MutexGuard};

/// Writes each line to its [`Sink`] in the calling thread.
///
/// Nothing is queued, so nothing can be lost when the program ends without closing,
/// and nothing is dropped under load; callers block on the sink instead.
/// The process-wide logger uses it for stdout until [`init`](crate::init) is called.
pub struct DirectWriter {
    // None once closed
    mo_sink: Mutex<Option<Box<dyn Sink>>>,
}

impl DirectWriter {
    /// Wraps the given sink.
    #[must_use]
    pub fn new<S: Sink + 'static>(sink: S) -> Self {
        Self {
            mo_sink: Mutex::new(Some(Box::new(sink))),
        }
    }

    /// Writes the line and returns when the sink has taken it.
    ///
    /// Empty lines are ignored.
    ///
    /// # Errors
    ///
    /// [`KvLogError::WriterClosed`] if the writer is closed,
    /// [`KvLogError::Io`] if the sink fails,
    /// [`KvLogError::Poison`] if a writing thread had panicked.
    pub fn write(&self, line: &[u8]) -> Result<(), KvLogError> {
        if line.is_empty() {
            return Ok(());
        }
        let mut o_sink = self.lock()?;
        let sink = o_sink.as_mut().ok_or(KvLogError::WriterClosed)?;
        Ok(sink.write_all(line)?)
    }

    /// Flushes the sink.
    ///
    /// # Errors
    ///
    /// [`KvLogError::WriterClosed`] if the writer is closed,
    /// [`KvLogError::Io`] if the sink fails.
    pub fn flush(&self) -> Result<(), KvLogError> {
        let mut o_sink = self.lock()?;
        let sink = o_sink.as_mut().ok_or(KvLogError::WriterClosed)?;
        Ok(sink.flush()?)
    }

    /// Closes the sink. Closing again does nothing.
    ///
    /// # Errors
    ///
    /// [`KvLogError::Io`] if the sink fails.
    pub fn close(&self) -> Result<(), KvLogError> {
        match self.lock()?.take() {
            Some(mut sink) => Ok(sink.close()?),
            None => Ok(()),
        }
    }

    /// Returns true once the writer is closed.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.lock().map_or(true, |o_sink| o_sink.is_none())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Option<Box<dyn Sink>>>, KvLogError> {
        self.mo_sink.lock().map_err(|_| KvLogError::Poison)
    }
}

impl std::fmt::Debug for DirectWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> Result<(), std::fmt::Error> {
        f.debug_struct("DirectWriter")
            .field("closed", &self.is_closed())
            .finish()
    }
}
