use crate::{
    call_site::{CallSiteCache, Origin},
    config::{Config, ResolvedConfig},
    formats::{render, LogRecord},
    writers::{AsyncWriter, DirectWriter, RotatingFile, StdStream},
    Clock, Fatal, KvLogError, LogContext, Severity,
};
use std::{
    fmt,
    io::{self, IsTerminal, Write},
};

/// Formats log records and routes them to the primary and the error log.
///
/// A record is written if its severity passes the configured level.
/// Records that are at least as severe as the error level go to both logs,
/// all others only to the primary log. `Print` records are always written,
/// and only to the primary log.
///
/// Usually you configure the process-wide logger with [`init`](crate::init)
/// and use the macros like [`info!`](crate::info). You can also create and use
/// `Logger` instances directly:
///
/// ```rust
/// use kvlog::{Config, LogContext, Logger};
///
/// let logger = Logger::builder(Config::default().log_level("debug"))
///     .build()
///     .unwrap();
/// kvlog::debug!(logger: &logger, &LogContext::new(), "{} + {} = {}", 1, 1, 2);
/// logger.close().unwrap();
/// ```
pub struct Logger {
    max_level: Severity,
    error_level: Severity,
    primary: LineWriter,
    // None if the error log shares the primary log's output
    o_error: Option<LineWriter>,
    files: Vec<RotatingFile>,
    call_sites: CallSiteCache,
    clock: Clock,
    mirror: Mirror,
}

#[derive(Copy, Clone, Debug, Default)]
struct Mirror {
    stdout: bool,
    stderr: bool,
}
impl Mirror {
    fn detect() -> Self {
        Self {
            stdout: io::stdout().is_terminal(),
            stderr: io::stderr().is_terminal(),
        }
    }
}

// Either queues lines for an output thread, or writes them in the calling thread.
#[derive(Debug)]
enum LineWriter {
    Async(AsyncWriter),
    Direct(DirectWriter),
}
impl LineWriter {
    fn buffer(&self) -> Vec<u8> {
        match self {
            Self::Async(w) => w.buffer(),
            Self::Direct(_) => Vec::with_capacity(crate::MAX_LINE_LENGTH / 16),
        }
    }

    fn write(&self, line: Vec<u8>) -> Result<(), KvLogError> {
        match self {
            Self::Async(w) => w.write(line),
            Self::Direct(w) => w.write(&line),
        }
    }

    fn write_bytes(&self, line: &[u8]) -> Result<(), KvLogError> {
        match self {
            Self::Async(w) => w.write_bytes(line),
            Self::Direct(w) => w.write(line),
        }
    }

    fn flush(&self) -> Result<(), KvLogError> {
        match self {
            Self::Async(w) => w.flush(),
            Self::Direct(w) => w.flush(),
        }
    }

    fn close(&self) -> Result<(), KvLogError> {
        match self {
            Self::Async(w) => w.close(),
            Self::Direct(w) => w.close(),
        }
    }

    fn is_closed(&self) -> bool {
        match self {
            Self::Async(w) => w.is_closed(),
            Self::Direct(w) => w.is_closed(),
        }
    }
}

enum Outputs {
    Files,
    Writers(AsyncWriter, Option<AsyncWriter>),
}

/// Builder for a [`Logger`].
///
/// Is created with [`Logger::builder`] or [`Logger::with_writers`].
pub struct LoggerBuilder {
    config: ResolvedConfig,
    outputs: Outputs,
    clock: Clock,
    o_mirror: Option<bool>,
}

impl LoggerBuilder {
    /// Overrides the configured level of the primary log.
    #[must_use]
    pub fn max_level(mut self, max_level: Severity) -> Self {
        self.config.max_level = max_level;
        self
    }

    /// Overrides the configured level from which on records go to the error log.
    #[must_use]
    pub fn error_level(mut self, error_level: Severity) -> Self {
        self.config.error_level = error_level;
        self
    }

    /// Overrides the configured prefix that is stripped from function names.
    #[must_use]
    pub fn package_prefix(mut self, prefix: &str) -> Self {
        self.config.package_prefix = crate::call_site::normalize_prefix(prefix);
        self
    }

    /// Uses the given clock for the timestamps; by default the system clock is used.
    #[must_use]
    pub fn clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Decides whether lines are also written to stdout or stderr.
    ///
    /// By default, they are mirrored if the respective stream is a terminal.
    #[must_use]
    pub fn mirror_to_terminal(mut self, mirror: bool) -> Self {
        self.o_mirror = Some(mirror);
        self
    }

    /// Opens the outputs and starts the writer threads.
    ///
    /// # Errors
    ///
    /// [`KvLogError::Io`] if a log file cannot be opened or a thread cannot be spawned.
    pub fn build(self) -> Result<Logger, KvLogError> {
        let config = self.config;
        let mut files = Vec::new();

        let (primary, o_error) = match self.outputs {
            Outputs::Writers(primary, o_error) => (
                LineWriter::Async(primary),
                o_error.map(LineWriter::Async),
            ),
            Outputs::Files => {
                let all_file = RotatingFile::open(&config.log_path)?;
                files.push(all_file.clone());
                let primary =
                    LineWriter::Async(AsyncWriter::new(all_file, config.buffered_lines)?);

                let o_error = if config.error_log_path == config.log_path {
                    None
                } else {
                    let error_file = RotatingFile::open(&config.error_log_path)?;
                    files.push(error_file.clone());
                    Some(LineWriter::Async(AsyncWriter::new(
                        error_file,
                        config.buffered_lines,
                    )?))
                };
                (primary, o_error)
            }
        };

        let mirror = match self.o_mirror {
            None => Mirror::detect(),
            Some(true) => Mirror {
                stdout: true,
                stderr: true,
            },
            Some(false) => Mirror::default(),
        };

        Ok(Logger {
            max_level: config.max_level,
            error_level: config.error_level,
            primary,
            o_error,
            files,
            call_sites: CallSiteCache::new(config.package_prefix),
            clock: self.clock,
            mirror,
        })
    }
}

impl Logger {
    /// Starts building a logger that writes into the files named in the configuration.
    #[must_use]
    pub fn builder(config: Config) -> LoggerBuilder {
        LoggerBuilder {
            config: config.resolve(),
            outputs: Outputs::Files,
            clock: Clock::default(),
            o_mirror: None,
        }
    }

    /// Starts building a logger that writes into the given writers.
    ///
    /// Without an error writer, the lines for the error log go only into the primary writer.
    /// Levels and prefix are taken from the default [`Config`] and can be changed on the builder.
    #[must_use]
    pub fn with_writers(primary: AsyncWriter, o_error: Option<AsyncWriter>) -> LoggerBuilder {
        LoggerBuilder {
            config: Config::default().resolve(),
            outputs: Outputs::Writers(primary, o_error),
            clock: Clock::default(),
            o_mirror: None,
        }
    }

    // Writes everything synchronously to stdout, nothing is mirrored.
    pub(crate) fn fallback() -> Self {
        Self {
            max_level: Severity::Debug,
            error_level: Severity::Print,
            primary: LineWriter::Direct(DirectWriter::new(StdStream::stdout())),
            o_error: None,
            files: Vec::new(),
            call_sites: CallSiteCache::new(None),
            clock: Clock::default(),
            mirror: Mirror::default(),
        }
    }

    /// Writes a record, if its severity passes the level of this logger.
    ///
    /// Lines that cannot be queued, because a writer is saturated or closed, are dropped.
    ///
    /// # Errors
    ///
    /// [`Fatal`] after a record with severity `Fatal` was written and all outputs were flushed;
    /// the caller is expected to end the program.
    pub fn log(
        &self,
        severity: Severity,
        context: &LogContext,
        origin: &Origin,
        args: fmt::Arguments,
    ) -> Result<(), Fatal> {
        if !severity.is_enabled_for(self.max_level) {
            return Ok(());
        }

        let o_call_site = if severity == Severity::Print {
            None
        } else {
            Some(self.call_sites.resolve(origin))
        };

        let mut line = self.primary.buffer();
        render(
            &mut line,
            &LogRecord {
                severity,
                timestamp: self.clock.now(),
                call_site: o_call_site.as_deref(),
                context,
                args,
            },
        );

        if self.is_for_error_log(severity) {
            if self.mirror.stderr {
                io::stderr().write_all(&line).ok();
            }
            if let Some(ref error) = self.o_error {
                // dropped lines are tolerated
                error.write_bytes(&line).ok();
            }
        } else if self.mirror.stdout {
            io::stdout().write_all(&line).ok();
        }
        self.primary.write(line).ok();

        if severity == Severity::Fatal {
            self.flush().ok();
            let payload = o_call_site
                .as_deref()
                .map_or_else(String::new, |site| site.fatal_payload().to_string());
            return Err(Fatal::new(payload));
        }
        Ok(())
    }

    fn is_for_error_log(&self, severity: Severity) -> bool {
        severity != Severity::Print && severity <= self.error_level
    }

    /// The most verbose severity that is written.
    #[must_use]
    pub fn max_level(&self) -> Severity {
        self.max_level
    }

    /// The least severe severity that is also written to the error log.
    #[must_use]
    pub fn error_level(&self) -> Severity {
        self.error_level
    }

    /// Blocks until all lines that were written before are handed to the outputs.
    ///
    /// # Errors
    ///
    /// The first error of any writer, see [`AsyncWriter::flush`] and [`DirectWriter::flush`].
    pub fn flush(&self) -> Result<(), KvLogError> {
        first_error(self.writers().map(LineWriter::flush))
    }

    /// Rotates all log files.
    ///
    /// # Errors
    ///
    /// [`KvLogError::Io`] with the first error that occurred; all files are tried nevertheless.
    pub fn rotate(&self) -> Result<(), KvLogError> {
        first_error(
            self.files
                .iter()
                .map(|f| f.rotate().map_err(KvLogError::from)),
        )
    }

    /// Writes out all queued lines and closes all outputs.
    ///
    /// Further records are dropped. Closing again does nothing.
    ///
    /// # Errors
    ///
    /// The first error of any writer, see [`AsyncWriter::close`] and [`DirectWriter::close`].
    pub fn close(&self) -> Result<(), KvLogError> {
        first_error(self.writers().map(LineWriter::close))
    }

    /// Returns true once the logger rejects new records.
    ///
    /// The write-out of the lines that were accepted before can still be in progress then;
    /// [`Logger::close`] returns only after it is done.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.writers().all(LineWriter::is_closed)
    }

    fn writers(&self) -> impl Iterator<Item = &LineWriter> + '_ {
        std::iter::once(&self.primary).chain(self.o_error.iter())
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        f.debug_struct("Logger")
            .field("max_level", &self.max_level)
            .field("error_level", &self.error_level)
            .field("primary", &self.primary)
            .field("o_error", &self.o_error)
            .field("files", &self.files)
            .field("clock", &self.clock)
            .field("mirror", &self.mirror)
            .finish_non_exhaustive()
    }
}

// runs all operations, but reports only the first failure
fn first_error<I>(results: I) -> Result<(), KvLogError>
where
    I: Iterator<Item = Result<(), KvLogError>>,
{
    results.fold(Ok(()), |acc, r| acc.and(r))
}
