// The logging macros.
//
// Each macro comes in three forms:
//
//   info!("{} items", n)                        global logger, empty context
//   info!(&ctx, "{} items", n)                  global logger
//   info!(logger: &logger, &ctx, "{} items", n) the given logger
//
// The first two forms of `fatal!` end the program; the third returns the
// `Result<(), Fatal>` of `Logger::log`.

/// Captures the current source location and enclosing function as [`Origin`](crate::Origin).
#[macro_export]
macro_rules! origin {
    () => {
        $crate::Origin::new(file!(), line!(), column!(), $crate::__function_name!())
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __function_name {
    () => {{
        fn __kvlog_f() {}
        fn __kvlog_type_name_of<T>(_: T) -> &'static str {
            ::std::any::type_name::<T>()
        }
        let name = __kvlog_type_name_of(__kvlog_f);
        name.strip_suffix("::__kvlog_f").unwrap_or(name)
    }};
}

#[doc(hidden)]
#[macro_export]
macro_rules! __log {
    (logger: $logger:expr, $severity:expr, $ctx:expr, $($arg:tt)+) => {
        $logger.log($severity, $ctx, &$crate::origin!(), format_args!($($arg)+))
    };
    ($severity:expr, $ctx:expr, $($arg:tt)+) => {
        $crate::__log_to_current($severity, $ctx, &$crate::origin!(), format_args!($($arg)+))
    };
}

/// Writes a record with severity [`Debug`](crate::Severity::Debug).
#[macro_export]
macro_rules! debug {
    (logger: $logger:expr, $ctx:expr, $($arg:tt)+) => {{
        let _ = $crate::__log!(logger: $logger, $crate::Severity::Debug, $ctx, $($arg)+);
    }};
    ($fmt:literal $($arg:tt)*) => {{
        let _ = $crate::__log!($crate::Severity::Debug, &$crate::LogContext::new(), $fmt $($arg)*);
    }};
    ($ctx:expr, $($arg:tt)+) => {{
        let _ = $crate::__log!($crate::Severity::Debug, $ctx, $($arg)+);
    }};
}

/// Writes a record with severity [`Info`](crate::Severity::Info).
#[macro_export]
macro_rules! info {
    (logger: $logger:expr, $ctx:expr, $($arg:tt)+) => {{
        let _ = $crate::__log!(logger: $logger, $crate::Severity::Info, $ctx, $($arg)+);
    }};
    ($fmt:literal $($arg:tt)*) => {{
        let _ = $crate::__log!($crate::Severity::Info, &$crate::LogContext::new(), $fmt $($arg)*);
    }};
    ($ctx:expr, $($arg:tt)+) => {{
        let _ = $crate::__log!($crate::Severity::Info, $ctx, $($arg)+);
    }};
}

/// Writes a record with severity [`Trace`](crate::Severity::Trace).
///
/// Note that `Trace` is more severe than `Info` in `kvlog`; it is meant for
/// structured output of frameworks.
#[macro_export]
macro_rules! trace {
    (logger: $logger:expr, $ctx:expr, $($arg:tt)+) => {{
        let _ = $crate::__log!(logger: $logger, $crate::Severity::Trace, $ctx, $($arg)+);
    }};
    ($fmt:literal $($arg:tt)*) => {{
        let _ = $crate::__log!($crate::Severity::Trace, &$crate::LogContext::new(), $fmt $($arg)*);
    }};
    ($ctx:expr, $($arg:tt)+) => {{
        let _ = $crate::__log!($crate::Severity::Trace, $ctx, $($arg)+);
    }};
}

/// Writes a record with severity [`Warn`](crate::Severity::Warn).
#[macro_export]
macro_rules! warn {
    (logger: $logger:expr, $ctx:expr, $($arg:tt)+) => {{
        let _ = $crate::__log!(logger: $logger, $crate::Severity::Warn, $ctx, $($arg)+);
    }};
    ($fmt:literal $($arg:tt)*) => {{
        let _ = $crate::__log!($crate::Severity::Warn, &$crate::LogContext::new(), $fmt $($arg)*);
    }};
    ($ctx:expr, $($arg:tt)+) => {{
        let _ = $crate::__log!($crate::Severity::Warn, $ctx, $($arg)+);
    }};
}

/// Writes a record with severity [`Error`](crate::Severity::Error).
#[macro_export]
macro_rules! error {
    (logger: $logger:expr, $ctx:expr, $($arg:tt)+) => {{
        let _ = $crate::__log!(logger: $logger, $crate::Severity::Error, $ctx, $($arg)+);
    }};
    ($fmt:literal $($arg:tt)*) => {{
        let _ = $crate::__log!($crate::Severity::Error, &$crate::LogContext::new(), $fmt $($arg)*);
    }};
    ($ctx:expr, $($arg:tt)+) => {{
        let _ = $crate::__log!($crate::Severity::Error, $ctx, $($arg)+);
    }};
}

/// Writes a record with severity [`Fatal`](crate::Severity::Fatal), flushes all outputs,
/// and ends the program.
///
/// With an explicit logger, the macro returns `Result<(), Fatal>` instead,
/// and the caller has to end the program.
#[macro_export]
macro_rules! fatal {
    (logger: $logger:expr, $ctx:expr, $($arg:tt)+) => {
        $crate::__log!(logger: $logger, $crate::Severity::Fatal, $ctx, $($arg)+)
    };
    ($fmt:literal $($arg:tt)*) => {
        if let Err(fatal) =
            $crate::__log!($crate::Severity::Fatal, &$crate::LogContext::new(), $fmt $($arg)*)
        {
            fatal.exit()
        }
    };
    ($ctx:expr, $($arg:tt)+) => {
        if let Err(fatal) = $crate::__log!($crate::Severity::Fatal, $ctx, $($arg)+) {
            fatal.exit()
        }
    };
}

/// Writes the message without any prefix, regardless of the configured level,
/// and only to the primary log.
#[macro_export]
macro_rules! print {
    (logger: $logger:expr, $ctx:expr, $($arg:tt)+) => {{
        let _ = $crate::__log!(logger: $logger, $crate::Severity::Print, $ctx, $($arg)+);
    }};
    ($fmt:literal $($arg:tt)*) => {{
        let _ = $crate::__log!($crate::Severity::Print, &$crate::LogContext::new(), $fmt $($arg)*);
    }};
    ($ctx:expr, $($arg:tt)+) => {{
        let _ = $crate::__log!($crate::Severity::Print, $ctx, $($arg)+);
    }};
}
