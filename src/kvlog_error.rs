use thiserror::Error;

/// Describes errors in the initialization and the operation of `kvlog`.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum KvLogError {
    /// The asynchronous writer was already closed; the line was not accepted.
    #[error("async writer is closed")]
    WriterClosed,

    /// The queue of the asynchronous writer is saturated; the line was dropped.
    #[error("async writer is full")]
    WriterFull,

    /// Writing to, flushing, rotating or closing an output file failed.
    #[error("i/o error in log output")]
    Io(#[from] std::io::Error),

    /// The configuration file cannot be parsed.
    #[cfg_attr(docsrs, doc(cfg(feature = "config_file")))]
    #[cfg(feature = "config_file")]
    #[error("parsing the configuration file failed")]
    Toml(#[from] toml::de::Error),

    /// Registering the bridge for the `log` facade failed.
    #[error("registering the log bridge failed")]
    Log(#[from] log::SetLoggerError),

    /// Some synchronization object is poisoned.
    #[error("some synchronization object is poisoned")]
    Poison,

    /// A background thread could not be started, or it panicked.
    #[error("background thread of the writer is gone")]
    Thread,
}
