use chrono::{DateTime, FixedOffset, Local, Timelike};
use std::fmt::Write;

/// Source of the timestamps that are written into the log lines.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Clock {
    /// Local wall-clock time, with the local offset.
    #[default]
    System,
    /// Always the given point in time; handy for tests that compare complete log lines.
    Fixed(DateTime<FixedOffset>),
}

impl Clock {
    /// Retrieve the timestamp.
    #[must_use]
    pub fn now(&self) -> DateTime<FixedOffset> {
        match self {
            Self::System => Local::now().into(),
            Self::Fixed(ts) => *ts,
        }
    }
}

// Renders like `2019-07-03T12:34:56.789+08:00`.
//
// The fraction has at most three digits, trailing zeros are stripped,
// and the dot is omitted if nothing remains.
pub(crate) fn write_timestamp(buf: &mut Vec<u8>, ts: &DateTime<FixedOffset>) {
    let mut s = String::with_capacity(29);
    write!(s, "{}", ts.format("%Y-%m-%dT%H:%M:%S")).ok();

    let millis = (ts.nanosecond() % 1_000_000_000) / 1_000_000;
    if millis != 0 {
        let fraction = format!("{millis:03}");
        s.push('.');
        s.push_str(fraction.trim_end_matches('0'));
    }

    write!(s, "{}", ts.format("%:z")).ok();
    buf.extend_from_slice(s.as_bytes());
}

#[cfg(test)]
mod test {
    use super::{write_timestamp, Clock};
    use chrono::DateTime;

    fn render(s: &str) -> String {
        let ts = DateTime::parse_from_rfc3339(s).unwrap();
        let mut buf = Vec::new();
        write_timestamp(&mut buf, &ts);
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn fraction_is_trimmed() {
        assert_eq!(
            render("2019-07-03T12:34:56.789+08:00"),
            "2019-07-03T12:34:56.789+08:00"
        );
        assert_eq!(
            render("2019-07-03T12:34:56.780+08:00"),
            "2019-07-03T12:34:56.78+08:00"
        );
        assert_eq!(
            render("2019-07-03T12:34:56.100-05:30"),
            "2019-07-03T12:34:56.1-05:30"
        );
        assert_eq!(
            render("2019-07-03T12:34:56.000+00:00"),
            "2019-07-03T12:34:56+00:00"
        );
        assert_eq!(
            render("2019-07-03T12:34:56.0009+00:00"),
            "2019-07-03T12:34:56+00:00"
        );
    }

    #[test]
    fn fixed_clock_does_not_move() {
        let ts = DateTime::parse_from_rfc3339("2019-07-03T12:34:56.789+08:00").unwrap();
        let clock = Clock::Fixed(ts);
        let first = clock.now();
        std::thread::sleep(std::time::Duration::from_millis(20));
        assert_eq!(first, clock.now());
    }
}
