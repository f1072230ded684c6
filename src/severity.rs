use std::fmt;

/// The severity of a log record.
///
/// The variants are ordered from most to least severe, so that `Severity::Fatal < Severity::Debug`.
/// `Print` sorts before everything else: it is never filtered away and never
/// routed to the error log.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    /// Unconditional output without any line prefix.
    Print,
    /// Terminates the program after the line was written and flushed.
    Fatal,
    /// A serious failure.
    Error,
    /// An unexpected situation that deserves human attention.
    Warn,
    /// Structured output, typically written by frameworks for later collection.
    Trace,
    /// Regular business output.
    Info,
    /// Verbose output for debugging.
    Debug,
}

impl Severity {
    /// Parses a level name, ignoring case.
    ///
    /// Unknown or empty names yield `Debug`, the most verbose severity,
    /// so that a misconfigured level loses no output.
    /// `Print` cannot be configured as threshold and is not recognized.
    #[must_use]
    pub fn parse(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "fatal" => Self::Fatal,
            "error" => Self::Error,
            "warn" | "warning" => Self::Warn,
            "trace" => Self::Trace,
            "info" => Self::Info,
            _ => Self::Debug,
        }
    }

    /// Returns true if a record with severity `self` passes the threshold.
    ///
    /// `Fatal` passes every threshold, `Print` is not subject to any threshold.
    #[must_use]
    pub fn is_enabled_for(self, threshold: Severity) -> bool {
        self == Self::Print || self <= threshold.max(Self::Fatal)
    }

    /// The name that is used in the log lines.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Print => "PRINT",
            Self::Fatal => "FATAL",
            Self::Error => "ERROR",
            Self::Warn => "WARN",
            Self::Trace => "TRACE",
            Self::Info => "INFO",
            Self::Debug => "DEBUG",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<log::Level> for Severity {
    fn from(level: log::Level) -> Self {
        match level {
            log::Level::Error => Self::Error,
            log::Level::Warn => Self::Warn,
            log::Level::Info => Self::Info,
            log::Level::Debug | log::Level::Trace => Self::Debug,
        }
    }
}
