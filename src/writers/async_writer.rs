use super::Sink;
use crate::{
    util::{eprint_err, ErrorCode},
    KvLogError,
};
use crossbeam_channel::{self, select, Receiver, Sender, TrySendError};
use crossbeam_queue::ArrayQueue;
use std::{
    io,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex,
    },
    thread::{Builder as ThreadBuilder, JoinHandle},
};

const ASYNC_WRITER: &str = "kvlog-async_writer";

/// Size of the pool of reusable line buffers.
pub const DEFAULT_POOL_CAPA: usize = 50;

// Buffers that grew larger than this are not returned to the pool.
const MAX_POOLED_MESSAGE_CAPA: usize = 2 * crate::MAX_LINE_LENGTH;

enum Message {
    Line(Vec<u8>),
    // Acknowledged by the consumer once all earlier lines are written.
    Flush(Sender<io::Result<()>>),
}

/// Decouples the producers of log lines from the blocking I/O of a [`Sink`].
///
/// Lines are queued into a bounded queue and written by a dedicated thread
/// in the order in which they were queued.
///
/// * [`AsyncWriter::write`] never blocks: if the queue is full, the line is dropped
///   and [`KvLogError::WriterFull`] is returned.
/// * [`AsyncWriter::flush`] blocks until all lines that were queued before have been
///   handed to the sink.
/// * [`AsyncWriter::close`] blocks until the queue is drained and the sink is closed;
///   nothing that was accepted before is dropped.
///
/// Dropping the writer closes it.
pub struct AsyncWriter {
    sender: Sender<Message>,
    closing: Sender<()>,
    // disconnected when the output thread ends
    done: Receiver<()>,
    closed: Arc<AtomicBool>,
    close_requested: AtomicBool,
    mo_thread_handle: Mutex<Option<JoinHandle<io::Result<()>>>>,
    pool: Arc<ArrayQueue<Vec<u8>>>,
}

impl AsyncWriter {
    /// Starts the output thread for the given sink, with a queue for `capacity` lines.
    ///
    /// # Errors
    ///
    /// [`KvLogError::Io`] if the thread cannot be spawned.
    pub fn new<S: Sink + 'static>(sink: S, capacity: usize) -> Result<Self, KvLogError> {
        let (sender, receiver) = crossbeam_channel::bounded::<Message>(capacity.max(1));
        let (closing, closing_receiver) = crossbeam_channel::bounded::<()>(1);
        let (done_sender, done) = crossbeam_channel::bounded::<()>(0);
        let closed = Arc::new(AtomicBool::new(false));
        let pool = Arc::new(ArrayQueue::new(DEFAULT_POOL_CAPA));

        let output = Output {
            sink,
            receiver,
            closing: closing_receiver,
            closed: Arc::clone(&closed),
            pool: Arc::clone(&pool),
            o_first_err: None,
            _done: done_sender,
        };
        let thread_handle = ThreadBuilder::new()
            .name(ASYNC_WRITER.to_string())
            .spawn(move || output.run())?;

        Ok(Self {
            sender,
            closing,
            done,
            closed,
            close_requested: AtomicBool::new(false),
            mo_thread_handle: Mutex::new(Some(thread_handle)),
            pool,
        })
    }

    /// Queues a line; never blocks.
    ///
    /// Empty lines are ignored.
    ///
    /// # Errors
    ///
    /// [`KvLogError::WriterClosed`] if the writer is closed,
    /// [`KvLogError::WriterFull`] if the queue is full; the line is dropped then.
    pub fn write(&self, line: Vec<u8>) -> Result<(), KvLogError> {
        if line.is_empty() {
            return Ok(());
        }
        if self.is_closed() {
            self.recycle(line);
            return Err(KvLogError::WriterClosed);
        }
        match self.sender.try_send(Message::Line(line)) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(message)) => {
                if let Message::Line(line) = message {
                    self.recycle(line);
                }
                Err(KvLogError::WriterFull)
            }
            Err(TrySendError::Disconnected(_)) => Err(KvLogError::WriterClosed),
        }
    }

    /// Copies the given bytes into a pooled buffer and queues it, see [`AsyncWriter::write`].
    ///
    /// # Errors
    ///
    /// See [`AsyncWriter::write`].
    pub fn write_bytes(&self, data: &[u8]) -> Result<(), KvLogError> {
        if data.is_empty() {
            return Ok(());
        }
        let mut buffer = self.buffer();
        buffer.extend_from_slice(data);
        self.write(buffer)
    }

    /// Blocks until all lines that were queued before were handed to the sink.
    ///
    /// Returns early, and successfully, if the writer is closed meanwhile,
    /// because closing writes out everything.
    ///
    /// # Errors
    ///
    /// [`KvLogError::WriterClosed`] if the writer was already closed,
    /// [`KvLogError::Io`] with the first write error since the previous flush,
    /// or with the error of flushing the sink.
    pub fn flush(&self) -> Result<(), KvLogError> {
        if self.is_closed() {
            return Err(KvLogError::WriterClosed);
        }

        let (ack_sender, ack_receiver) = crossbeam_channel::bounded::<io::Result<()>>(1);
        select! {
            send(self.sender, Message::Flush(ack_sender)) -> res => {
                if res.is_err() {
                    return Err(KvLogError::WriterClosed);
                }
            },
            recv(self.done) -> _ => return Err(KvLogError::WriterClosed),
        }

        if self.is_closed() {
            return Ok(());
        }

        select! {
            recv(ack_receiver) -> ack => match ack {
                Ok(result) => result.map_err(KvLogError::Io),
                // the marker was discarded while draining
                Err(_) => Ok(()),
            },
            recv(self.done) -> _ => Ok(()),
        }
    }

    /// Writes out all queued lines, closes the sink, and stops the output thread.
    ///
    /// Only the first call does the work; further calls, also concurrent ones,
    /// return immediately with `Ok(())`.
    ///
    /// # Errors
    ///
    /// [`KvLogError::Io`] with the first write error since the last flush,
    /// or with the error of closing the sink,
    /// [`KvLogError::Thread`] if the output thread had panicked,
    /// [`KvLogError::Poison`] if the thread handle is poisoned.
    pub fn close(&self) -> Result<(), KvLogError> {
        if self.is_closed() || self.close_requested.swap(true, Ordering::SeqCst) {
            return Ok(());
        }

        select! {
            send(self.closing, ()) -> _ => {},
            recv(self.done) -> _ => {},
        }

        let o_thread_handle = self
            .mo_thread_handle
            .lock()
            .map_err(|_| KvLogError::Poison)?
            .take();
        match o_thread_handle {
            Some(thread_handle) => match thread_handle.join() {
                Ok(result) => result.map_err(KvLogError::Io),
                Err(_) => Err(KvLogError::Thread),
            },
            None => Ok(()),
        }
    }

    /// Returns true once the writer accepts no more lines.
    ///
    /// The output thread may still be writing out the queued lines then;
    /// [`AsyncWriter::close`] waits for it.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Provides an empty buffer, preferably a recycled one.
    #[must_use]
    pub fn buffer(&self) -> Vec<u8> {
        self.pool
            .pop()
            .unwrap_or_else(|| Vec::with_capacity(crate::formats::MAX_LINE_LENGTH / 16))
    }

    fn recycle(&self, buffer: Vec<u8>) {
        recycle(&self.pool, buffer);
    }
}

impl Drop for AsyncWriter {
    fn drop(&mut self) {
        self.close().unwrap_or_else(|e| {
            eprint_err(ErrorCode::Close, "closing the async writer failed", &e);
        });
    }
}

impl std::fmt::Debug for AsyncWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> Result<(), std::fmt::Error> {
        f.debug_struct("AsyncWriter")
            .field("queued", &self.sender.len())
            .field("capacity", &self.sender.capacity())
            .field("closed", &self.is_closed())
            .finish_non_exhaustive()
    }
}

fn recycle(pool: &ArrayQueue<Vec<u8>>, mut buffer: Vec<u8>) {
    if buffer.capacity() <= MAX_POOLED_MESSAGE_CAPA {
        buffer.clear();
        pool.push(buffer).ok();
    }
}

// The consuming side, owned by the output thread.
struct Output<S: Sink> {
    sink: S,
    receiver: Receiver<Message>,
    closing: Receiver<()>,
    closed: Arc<AtomicBool>,
    pool: Arc<ArrayQueue<Vec<u8>>>,
    o_first_err: Option<io::Error>,
    _done: Sender<()>,
}

impl<S: Sink> Output<S> {
    fn run(mut self) -> io::Result<()> {
        loop {
            select! {
                recv(self.receiver) -> message => match message {
                    Ok(Message::Line(line)) => self.write(line),
                    Ok(Message::Flush(ack_sender)) => {
                        let result = match self.o_first_err.take() {
                            Some(e) => Err(e),
                            None => self.sink.flush(),
                        };
                        ack_sender.send(result).ok();
                    }
                    Err(_) => break,
                },
                // also reached if the writer vanished without closing
                recv(self.closing) -> _ => break,
            }
        }

        // new lines are rejected from now on
        self.closed.store(true, Ordering::SeqCst);
        while let Ok(message) = self.receiver.try_recv() {
            // flush markers are dropped, which releases their waiters
            if let Message::Line(line) = message {
                self.write(line);
            }
        }

        let close_result = self.sink.close();
        match self.o_first_err.take() {
            Some(e) => Err(e),
            None => close_result,
        }
    }

    fn write(&mut self, line: Vec<u8>) {
        if let Err(e) = self.sink.write_all(&line) {
            if self.o_first_err.is_none() {
                eprint_err(ErrorCode::Write, "writing log line failed", &e);
                self.o_first_err = Some(e);
            }
        }
        recycle(&self.pool, line);
    }
}
