#![allow(dead_code)]

use chrono::{DateTime, FixedOffset};
use std::path::{Path, PathBuf};

const CTRL_INDEX: &str = "CTRL_INDEX";
const CTRL_DIR: &str = "CTRL_DIR";

pub const TS: &str = "2019-07-03T12:34:56.789+08:00";

pub fn fixed_time() -> DateTime<FixedOffset> {
    DateTime::parse_from_rfc3339(TS).unwrap()
}

// returns the index and the directory that the dispatcher passed to this child process,
// or None if this is not a child process
pub fn child() -> Option<(u8, PathBuf)> {
    let value = std::env::var(CTRL_INDEX).ok()?;
    println!("executor {value}");
    Some((
        value.parse().unwrap(),
        PathBuf::from(std::env::var(CTRL_DIR).unwrap()),
    ))
}

// launches child processes from the same executable with additional environment variables;
// the children must end with the given exit code
pub fn dispatch(count: u8, dir: &Path, expected_code: i32) {
    println!("dispatcher");
    let progname = std::env::args().next().unwrap();
    let nocapture = std::env::args().any(|a| a == "--nocapture");
    for value in 0..count {
        let mut command = std::process::Command::new(&progname);
        if nocapture {
            command.arg("--nocapture");
        }
        let status = command
            .env(CTRL_INDEX, value.to_string())
            .env(CTRL_DIR, dir)
            .status()
            .expect("Command failed to start");
        assert_eq!(status.code(), Some(expected_code));
    }
}

// launches one child process like `dispatch`, and returns what it wrote to stdout
pub fn dispatch_for_stdout(dir: &Path, expected_code: i32) -> String {
    println!("dispatcher");
    let progname = std::env::args().next().unwrap();
    let output = std::process::Command::new(progname)
        .env(CTRL_INDEX, "0")
        .env(CTRL_DIR, dir)
        .output()
        .expect("Command failed to start");
    assert_eq!(output.status.code(), Some(expected_code));
    String::from_utf8_lossy(&output.stdout).to_string()
}

pub fn read_lines(path: &Path) -> Vec<String> {
    std::fs::read_to_string(path)
        .unwrap_or_else(|e| panic!("cannot read {}: {e}", path.display()))
        .lines()
        .map(ToString::to_string)
        .collect()
}
