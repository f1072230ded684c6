use crate::{
    call_site::CallSite, clock::write_timestamp, context::LogContext, severity::Severity,
};
use chrono::{DateTime, FixedOffset};
use std::{fmt, io::Write};

/// Maximum length of a log line in bytes, including the line ending.
///
/// Longer lines are cut at exactly this length, which can split a multi-byte character
/// and drop the line ending.
pub const MAX_LINE_LENGTH: usize = 4096;

/// Tag that is written if the context has none.
pub const UNTAGGED: &str = "*";

const SEPARATOR: &[u8] = b"||";

/// A single log call, ready for formatting.
pub(crate) struct LogRecord<'a> {
    pub(crate) severity: Severity,
    pub(crate) timestamp: DateTime<FixedOffset>,
    pub(crate) call_site: Option<&'a CallSite>,
    pub(crate) context: &'a LogContext,
    pub(crate) args: fmt::Arguments<'a>,
}

/// Renders a record into `buf`.
///
/// Produces lines like
///
/// ```text
/// [INFO][2019-07-03T12:34:56.789+08:00][main.rs:16@app::run] *||key1=123||key2=value2||started
/// ```
///
/// Records with severity `Print` consist only of the message.
pub(crate) fn render(buf: &mut Vec<u8>, record: &LogRecord) {
    if record.severity != Severity::Print {
        buf.push(b'[');
        buf.extend_from_slice(record.severity.as_str().as_bytes());
        buf.extend_from_slice(b"][");
        write_timestamp(buf, &record.timestamp);
        buf.push(b']');

        if let Some(site) = record.call_site {
            buf.extend_from_slice(site.rendered());
        }

        buf.push(b' ');
        match record.context.tag() {
            Some(tag) if !tag.is_empty() => buf.extend_from_slice(tag.as_bytes()),
            _ => buf.extend_from_slice(UNTAGGED.as_bytes()),
        }
        buf.extend_from_slice(SEPARATOR);

        for kv in record.context.kvs() {
            buf.extend_from_slice(kv.key().as_bytes());
            buf.push(b'=');
            buf.extend_from_slice(kv.value().as_bytes());
            buf.extend_from_slice(SEPARATOR);
        }
    }

    // writing into a Vec only fails if a Display impl reports an error
    buf.write_fmt(record.args).ok();
    buf.push(b'\n');
    buf.truncate(MAX_LINE_LENGTH);
}

#[cfg(test)]
mod test {
    use super::{render, LogRecord, MAX_LINE_LENGTH};
    use crate::{
        call_site::{CallSiteCache, Origin},
        LogContext, Severity,
    };
    use chrono::DateTime;

    fn line(severity: Severity, ctx: &LogContext, args: std::fmt::Arguments) -> String {
        let cache = CallSiteCache::new(None);
        let site = cache.resolve(&Origin::new("tests/logger_test.rs", 15, 5, "app::do_log"));
        let record = LogRecord {
            severity,
            timestamp: DateTime::parse_from_rfc3339("2019-07-03T12:34:56.789+08:00").unwrap(),
            call_site: Some(&site),
            context: ctx,
            args,
        };
        let mut buf = Vec::new();
        render(&mut buf, &record);
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn untagged_line() {
        assert_eq!(
            line(
                Severity::Debug,
                &LogContext::new(),
                format_args!("debug 1+1={} 2+2={}", 2, 4)
            ),
            "[DEBUG][2019-07-03T12:34:56.789+08:00][logger_test.rs:15@app::do_log] *||debug 1+1=2 2+2=4\n"
        );
    }

    #[test]
    fn tag_and_kvs() {
        let ctx = LogContext::new()
            .with_tag("trace")
            .with_kv("key1", 123)
            .with_kv("key2", "value2");
        assert_eq!(
            line(Severity::Trace, &ctx, format_args!("hello")),
            "[TRACE][2019-07-03T12:34:56.789+08:00][logger_test.rs:15@app::do_log] \
             trace||key1=123||key2=value2||hello\n"
        );
    }

    #[test]
    fn print_has_no_prefix() {
        let ctx = LogContext::new().with_tag("ignored").with_kv("k", "v");
        assert_eq!(
            line(Severity::Print, &ctx, format_args!("print {}", 42)),
            "print 42\n"
        );
    }

    #[test]
    fn long_lines_are_truncated() {
        let mut buf = Vec::new();
        let ctx = LogContext::new();
        let message = "x".repeat(4999);
        let record = LogRecord {
            severity: Severity::Print,
            timestamp: DateTime::parse_from_rfc3339("2019-07-03T12:34:56+08:00").unwrap(),
            call_site: None,
            context: &ctx,
            args: format_args!("{message}"),
        };
        render(&mut buf, &record);
        assert_eq!(buf.len(), MAX_LINE_LENGTH);
        assert_eq!(buf, message.as_bytes()[..MAX_LINE_LENGTH].to_vec());
    }
}
