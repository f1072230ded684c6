use super::Sink;
use crate::util::{eprint_err, io_err, ErrorCode};
use chrono::Local;
use std::{
    fs::{self, File, OpenOptions},
    io::{self, Write},
    path::{Path, PathBuf},
    sync::{Arc, Mutex, MutexGuard},
};

/// Files are rotated automatically before they would grow beyond this size (4 GiB).
///
/// This is only a safety cap against unbounded files; rotation is normally
/// triggered explicitly with [`RotatingFile::rotate`].
pub const DEFAULT_MAX_FILE_SIZE: u64 = 1 << 32;

const ROTATED_INFIX_FORMAT: &str = "-%Y-%m-%dT%H-%M-%S%.3f";

/// Appends log lines to a file, and moves the file aside on request.
///
/// Rotation renames the current file to a name with a timestamp infix,
/// e.g. `all.log` to `all-2019-07-03T12-34-56.789.log`,
/// and continues writing into a fresh file with the original name.
///
/// A `RotatingFile` is a handle: clones share the same file, so one clone
/// can be owned by an [`AsyncWriter`](super::AsyncWriter) while another is used
/// to trigger the rotation.
#[derive(Clone, Debug)]
pub struct RotatingFile {
    am_state: Arc<Mutex<State>>,
}

#[derive(Debug)]
struct State {
    path: PathBuf,
    max_size: u64,
    o_file: Option<File>,
    current_size: u64,
}

impl RotatingFile {
    /// Opens (or creates) the file for appending, creating missing parent folders.
    ///
    /// # Errors
    ///
    /// If the folder or the file cannot be created.
    pub fn open<P: Into<PathBuf>>(path: P) -> io::Result<Self> {
        Self::with_max_size(path, DEFAULT_MAX_FILE_SIZE)
    }

    /// Like [`RotatingFile::open`], with an explicit maximum file size in bytes.
    ///
    /// # Errors
    ///
    /// If the folder or the file cannot be created.
    pub fn with_max_size<P: Into<PathBuf>>(path: P, max_size: u64) -> io::Result<Self> {
        let path = path.into();
        let (file, current_size) = open_log_file(&path)?;
        Ok(Self {
            am_state: Arc::new(Mutex::new(State {
                path,
                max_size: max_size.max(1),
                o_file: Some(file),
                current_size,
            })),
        })
    }

    /// The path of the file that is currently written.
    #[must_use]
    pub fn path(&self) -> PathBuf {
        self.lock_state()
            .map(|state| state.path.clone())
            .unwrap_or_default()
    }

    /// Moves the current file aside and continues with a fresh one.
    ///
    /// Does nothing if the file was already closed.
    ///
    /// # Errors
    ///
    /// If renaming or reopening fails.
    pub fn rotate(&self) -> io::Result<()> {
        self.lock_state()?.rotate()
    }

    fn lock_state(&self) -> io::Result<MutexGuard<'_, State>> {
        self.am_state
            .lock()
            .map_err(|_| io_err("rotating file is poisoned"))
    }
}

impl State {
    fn rotate(&mut self) -> io::Result<()> {
        let Some(file) = self.o_file.take() else {
            return Ok(());
        };
        drop(file);

        let rotated = collision_free_path_for_rotated_file(&self.path);
        match fs::rename(&self.path, &rotated) {
            Ok(()) => {}
            // someone else moved the file, we just continue with a new one
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => {
                // keep writing to the old file rather than losing output
                let (file, size) = open_log_file(&self.path)?;
                self.o_file = Some(file);
                self.current_size = size;
                return Err(e);
            }
        }

        let (file, size) = open_log_file(&self.path)?;
        self.o_file = Some(file);
        self.current_size = size;
        Ok(())
    }

    fn file(&mut self) -> io::Result<&mut File> {
        self.o_file
            .as_mut()
            .ok_or_else(|| io_err("log file is already closed"))
    }
}

impl Sink for RotatingFile {
    fn write_all(&mut self, line: &[u8]) -> io::Result<()> {
        let mut state = self.lock_state()?;
        let len = line.len() as u64;
        if state.current_size > 0 && state.current_size + len > state.max_size {
            state.rotate().unwrap_or_else(|e| {
                eprint_err(ErrorCode::LogFile, "rotation of the log file failed", &e);
            });
        }
        state.file()?.write_all(line)?;
        state.current_size += len;
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        let mut state = self.lock_state()?;
        match state.o_file.as_mut() {
            Some(file) => file.flush(),
            None => Ok(()),
        }
    }

    fn close(&mut self) -> io::Result<()> {
        let mut state = self.lock_state()?;
        match state.o_file.take() {
            Some(file) => file.sync_all(),
            None => Ok(()),
        }
    }
}

fn open_log_file(path: &Path) -> io::Result<(File, u64)> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let size = file.metadata()?.len();
    Ok((file, size))
}

// all.log -> all-2019-07-03T12-34-56.789.log, or all-2019-07-03T12-34-56.789.1.log etc.
fn collision_free_path_for_rotated_file(path: &Path) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    let o_ext = path.extension().map(|e| e.to_string_lossy().to_string());
    let infix = Local::now().format(ROTATED_INFIX_FORMAT).to_string();

    let mut n = 0_u32;
    loop {
        let mut name = format!("{stem}{infix}");
        if n > 0 {
            name.push_str(&format!(".{n}"));
        }
        if let Some(ref ext) = o_ext {
            name.push('.');
            name.push_str(ext);
        }
        let candidate = path.with_file_name(name);
        if !candidate.exists() {
            return candidate;
        }
        n += 1;
    }
}

#[cfg(test)]
mod test {
    use super::{RotatingFile, Sink};

    fn log_files(dir: &std::path::Path) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn creates_missing_folders_and_appends() {
        let dir = temp_dir::TempDir::new().unwrap();
        let path = dir.path().join("log").join("all.log");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, b"earlier\n").unwrap();

        let mut file = RotatingFile::open(&path).unwrap();
        file.write_all(b"later\n").unwrap();
        file.close().unwrap();

        assert_eq!(std::fs::read(&path).unwrap(), b"earlier\nlater\n");

        let nested = dir.path().join("a").join("b").join("c.log");
        RotatingFile::open(&nested).unwrap();
        assert!(nested.exists());
    }

    #[test]
    fn rotate_moves_file_aside() {
        let dir = temp_dir::TempDir::new().unwrap();
        let path = dir.path().join("all.log");
        let mut file = RotatingFile::open(&path).unwrap();
        let trigger = file.clone();

        file.write_all(b"first\n").unwrap();
        trigger.rotate().unwrap();
        file.write_all(b"second\n").unwrap();
        trigger.rotate().unwrap();
        file.write_all(b"third\n").unwrap();
        file.close().unwrap();

        let names = log_files(dir.path());
        assert_eq!(names.len(), 3, "{names:?}");
        assert!(names.iter().all(|n| n.starts_with("all") && n.ends_with(".log")));
        assert_eq!(std::fs::read(&path).unwrap(), b"third\n");
    }

    #[test]
    fn rotates_when_too_large() {
        let dir = temp_dir::TempDir::new().unwrap();
        let path = dir.path().join("small.log");
        let mut file = RotatingFile::with_max_size(&path, 10).unwrap();
        file.write_all(b"123456\n").unwrap();
        file.write_all(b"abcdef\n").unwrap();
        file.close().unwrap();

        assert_eq!(log_files(dir.path()).len(), 2);
        assert_eq!(std::fs::read(&path).unwrap(), b"abcdef\n");
    }

    #[test]
    fn writing_after_close_fails() {
        let dir = temp_dir::TempDir::new().unwrap();
        let mut file = RotatingFile::open(dir.path().join("x.log")).unwrap();
        file.close().unwrap();
        assert!(file.write_all(b"late\n").is_err());
        assert!(file.rotate().is_ok());
    }
}
