use std::io::Write;

#[derive(Copy, Clone, Debug)]
pub(crate) enum ErrorCode {
    Write,
    Flush,
    Close,
    LogFile,
}
impl ErrorCode {
    fn as_index(self) -> &'static str {
        match self {
            Self::Write => "write",
            Self::Flush => "flush",
            Self::Close => "close",
            Self::LogFile => "logfile",
        }
    }
}

// Reports failures that cannot be returned to any caller.
pub(crate) fn eprint_err(error_code: ErrorCode, msg: &str, err: &dyn std::error::Error) {
    let s = format!(
        "[kvlog][ERRCODE::{code:?}] {msg}, caused by {err:?}\n    \
         See https://docs.rs/kvlog/latest/kvlog/error_info/index.html#{code_lc}",
        code = error_code,
        msg = msg,
        err = err,
        code_lc = error_code.as_index(),
    );
    try_to_write(&s);
}

fn try_to_write(s: &str) {
    // never panic on a closed stderr
    let mut stderr = std::io::stderr();
    writeln!(stderr, "{s}").ok();
}

pub(crate) fn io_err(s: &'static str) -> std::io::Error {
    std::io::Error::other(s)
}
