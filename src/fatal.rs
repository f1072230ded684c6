use thiserror::Error;

/// Exit code of a program that is terminated by [`Fatal::exit`].
pub const FATAL_EXIT_CODE: i32 = 1;

/// Signals that a record with severity `Fatal` was written.
///
/// The record is already written and all outputs are flushed.
/// The program is expected to end now: either call [`Fatal::exit`],
/// or propagate the value to a place that does.
/// The global [`fatal!`](crate::fatal) macro calls `exit` itself.
#[derive(Debug, Error)]
#[error("{payload}")]
#[must_use = "a fatal log record must end the program, see Fatal::exit"]
pub struct Fatal {
    payload: String,
}

impl Fatal {
    pub(crate) fn new(payload: String) -> Self {
        Self { payload }
    }

    /// Describes where the fatal record was issued, like
    /// `kvlog: fatal! at main.rs:28@app::start`.
    #[must_use]
    pub fn payload(&self) -> &str {
        &self.payload
    }

    /// Prints the payload to stderr and terminates the process with [`FATAL_EXIT_CODE`].
    pub fn exit(self) -> ! {
        eprintln!("{}", self.payload);
        std::process::exit(FATAL_EXIT_CODE)
    }
}
