mod test_utils;

use kvlog::{Config, LogContext};
use std::{path::Path, thread::JoinHandle};

const NO_OF_THREADS: usize = 4;
const NO_OF_LOGLINES_PER_THREAD: usize = 5_000;

fn config(dir: &Path) -> Config {
    Config::default()
        .log_path(dir.join("all.log"))
        .error_log_path(dir.join("error.log"))
        .log_level("debug")
}

#[test]
fn reconfigure_while_logging() {
    let first = temp_dir::TempDir::new().unwrap();
    let second = temp_dir::TempDir::new().unwrap();

    kvlog::init(config(first.path())).unwrap();
    kvlog::info!("before the swap");
    let old = kvlog::current();

    let workers = start_worker_threads();
    let retirer = kvlog::init(config(second.path()).log_level("info")).unwrap();
    kvlog::info!("after the swap");
    assert_eq!(kvlog::current().max_level(), kvlog::Severity::Info);

    for w in workers {
        w.join().unwrap();
    }

    // the replaced logger is closed in the background
    retirer.join().unwrap().unwrap();
    assert!(old.is_closed());
    drop(old);
    kvlog::close().unwrap();

    let old_lines = test_utils::read_lines(&first.path().join("all.log"));
    let new_lines = test_utils::read_lines(&second.path().join("all.log"));
    assert!(old_lines[0].ends_with("*||before the swap"));
    assert!(new_lines.iter().any(|l| l.ends_with("*||after the swap")));
    assert!(!old_lines.iter().any(|l| l.ends_with("*||after the swap")));

    // no line is written twice, and each thread's lines keep their order in each file
    for lines in [&old_lines, &new_lines] {
        let mut last = vec![None; NO_OF_THREADS];
        for line in lines.iter().filter(|l| l.contains("||thread=")) {
            let (thread, idx) = parse_worker_line(line);
            assert!(last[thread] < Some(idx), "{line}");
            last[thread] = Some(idx);
        }
    }
    let worker_lines = old_lines
        .iter()
        .chain(new_lines.iter())
        .filter(|l| l.contains("||thread="))
        .count();
    assert!(worker_lines <= NO_OF_THREADS * NO_OF_LOGLINES_PER_THREAD);
}

fn start_worker_threads() -> Vec<JoinHandle<()>> {
    (0..NO_OF_THREADS)
        .map(|thread| {
            std::thread::Builder::new()
                .name(format!("worker-{thread}"))
                .spawn(move || {
                    let ctx = LogContext::new().with_kv("thread", thread);
                    for idx in 0..NO_OF_LOGLINES_PER_THREAD {
                        kvlog::info!(&ctx, "{idx}");
                    }
                })
                .unwrap()
        })
        .collect()
}

// "...||thread=2||17" -> (2, 17)
fn parse_worker_line(line: &str) -> (usize, usize) {
    let mut parts = line.rsplit("||");
    let idx = parts.next().unwrap().parse().unwrap();
    let thread = parts
        .next()
        .unwrap()
        .strip_prefix("thread=")
        .unwrap()
        .parse()
        .unwrap();
    (thread, idx)
}
