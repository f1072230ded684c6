use crate::{call_site::normalize_prefix, Severity};
use std::path::PathBuf;

#[cfg(feature = "config_file")]
use {crate::KvLogError, std::path::Path};

/// Default path of the primary log file.
pub const DEFAULT_LOG_PATH: &str = "./log/all.log";

/// Default level of the primary log.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Default path of the error log file.
pub const DEFAULT_ERROR_LOG_PATH: &str = "./log/error.log";

/// Default level from which on lines are also written to the error log.
pub const DEFAULT_ERROR_LOG_LEVEL: &str = "warn";

/// Default number of lines that each writer can hold in its queue.
pub const DEFAULT_BUFFERED_LINES: usize = 1 << 18;

/// Configuration of a [`Logger`](crate::Logger).
///
/// All options are optional; unset or empty values are replaced with the defaults.
///
/// With feature `config_file` (on by default), a `Config` can also be read from TOML:
///
/// ```toml
/// log_path = "/var/log/app/all.log"
/// log_level = "debug"
/// error_log_path = "/var/log/app/error.log"
/// error_log_level = "error"
/// buffered_lines = 65536
/// package_prefix = "app::server"
/// ```
///
/// If `log_path` and `error_log_path` are equal, both logs share one file,
/// and lines for the error log are not duplicated.
///
/// Unknown keys and tables are ignored, so these options can live in the
/// configuration file of the application.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "config_file", derive(serde_derive::Deserialize))]
#[cfg_attr(feature = "config_file", serde(default))]
pub struct Config {
    /// File for all lines, default [`DEFAULT_LOG_PATH`].
    pub log_path: Option<PathBuf>,
    /// Most verbose severity that is written at all, default [`DEFAULT_LOG_LEVEL`].
    ///
    /// Unknown names are treated as `debug`.
    pub log_level: Option<String>,
    /// File for severe lines, default [`DEFAULT_ERROR_LOG_PATH`].
    pub error_log_path: Option<PathBuf>,
    /// Least severe severity that is also written to the error log,
    /// default [`DEFAULT_ERROR_LOG_LEVEL`].
    pub error_log_level: Option<String>,
    /// Queue capacity of each writer, default [`DEFAULT_BUFFERED_LINES`].
    pub buffered_lines: Option<usize>,
    /// Module path prefix that is stripped from the function names in the log lines.
    ///
    /// Everything up to and including the last `::` is stripped, so `app::server::http`
    /// turns `app::server::http::handle` into `http::handle`.
    /// A single crate name like `app` strips `app::`.
    pub package_prefix: Option<String>,
}

impl Config {
    /// Sets the path of the primary log file.
    #[must_use]
    pub fn log_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.log_path = Some(path.into());
        self
    }

    /// Sets the level of the primary log.
    #[must_use]
    pub fn log_level<S: Into<String>>(mut self, level: S) -> Self {
        self.log_level = Some(level.into());
        self
    }

    /// Sets the path of the error log file.
    #[must_use]
    pub fn error_log_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.error_log_path = Some(path.into());
        self
    }

    /// Sets the level from which on lines are also written to the error log.
    #[must_use]
    pub fn error_log_level<S: Into<String>>(mut self, level: S) -> Self {
        self.error_log_level = Some(level.into());
        self
    }

    /// Sets the queue capacity of the writers.
    #[must_use]
    pub fn buffered_lines(mut self, lines: usize) -> Self {
        self.buffered_lines = Some(lines);
        self
    }

    /// Sets the prefix that is stripped from function names.
    #[must_use]
    pub fn package_prefix<S: Into<String>>(mut self, prefix: S) -> Self {
        self.package_prefix = Some(prefix.into());
        self
    }

    /// Parses a configuration in TOML format.
    ///
    /// # Errors
    ///
    /// [`KvLogError::Toml`] if the input is malformed or a known key has a wrong type.
    #[cfg_attr(docsrs, doc(cfg(feature = "config_file")))]
    #[cfg(feature = "config_file")]
    pub fn from_toml(s: &str) -> Result<Self, KvLogError> {
        Ok(toml::from_str(s)?)
    }

    /// Reads a configuration file in TOML format.
    ///
    /// # Errors
    ///
    /// [`KvLogError::Io`] if the file cannot be read,
    /// [`KvLogError::Toml`] if its content is malformed.
    #[cfg_attr(docsrs, doc(cfg(feature = "config_file")))]
    #[cfg(feature = "config_file")]
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self, KvLogError> {
        Self::from_toml(&std::fs::read_to_string(path)?)
    }

    pub(crate) fn resolve(&self) -> ResolvedConfig {
        fn path_or(o_path: Option<&PathBuf>, default: &str) -> PathBuf {
            o_path
                .filter(|p| !p.as_os_str().is_empty())
                .cloned()
                .unwrap_or_else(|| PathBuf::from(default))
        }
        fn level_or(o_level: Option<&String>, default: &str) -> Severity {
            Severity::parse(
                o_level
                    .map(String::as_str)
                    .filter(|s| !s.trim().is_empty())
                    .unwrap_or(default),
            )
        }

        ResolvedConfig {
            log_path: path_or(self.log_path.as_ref(), DEFAULT_LOG_PATH),
            max_level: level_or(self.log_level.as_ref(), DEFAULT_LOG_LEVEL),
            error_log_path: path_or(self.error_log_path.as_ref(), DEFAULT_ERROR_LOG_PATH),
            error_level: level_or(self.error_log_level.as_ref(), DEFAULT_ERROR_LOG_LEVEL),
            buffered_lines: self
                .buffered_lines
                .filter(|n| *n > 0)
                .unwrap_or(DEFAULT_BUFFERED_LINES),
            package_prefix: self.package_prefix.as_deref().and_then(normalize_prefix),
        }
    }
}

// Config with all defaults applied.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct ResolvedConfig {
    pub(crate) log_path: PathBuf,
    pub(crate) max_level: Severity,
    pub(crate) error_log_path: PathBuf,
    pub(crate) error_level: Severity,
    pub(crate) buffered_lines: usize,
    pub(crate) package_prefix: Option<String>,
}

#[cfg(test)]
mod test {
    use super::{Config, DEFAULT_BUFFERED_LINES};
    use crate::Severity;
    use std::path::PathBuf;

    #[test]
    fn defaults() {
        let resolved = Config::default().resolve();
        assert_eq!(resolved.log_path, PathBuf::from("./log/all.log"));
        assert_eq!(resolved.max_level, Severity::Info);
        assert_eq!(resolved.error_log_path, PathBuf::from("./log/error.log"));
        assert_eq!(resolved.error_level, Severity::Warn);
        assert_eq!(resolved.buffered_lines, DEFAULT_BUFFERED_LINES);
        assert_eq!(resolved.package_prefix, None);
    }

    #[test]
    fn empty_values_fall_back_to_defaults() {
        let resolved = Config::default()
            .log_path("")
            .log_level("")
            .error_log_level(" ")
            .buffered_lines(0)
            .package_prefix("")
            .resolve();
        assert_eq!(resolved, Config::default().resolve());
    }

    #[test]
    fn explicit_values() {
        let resolved = Config::default()
            .log_path("/tmp/a.log")
            .log_level("Debug")
            .error_log_path("/tmp/a.log")
            .error_log_level("error")
            .buffered_lines(16)
            .package_prefix("app::server::http")
            .resolve();
        assert_eq!(resolved.log_path, resolved.error_log_path);
        assert_eq!(resolved.max_level, Severity::Debug);
        assert_eq!(resolved.error_level, Severity::Error);
        assert_eq!(resolved.buffered_lines, 16);
        assert_eq!(resolved.package_prefix.as_deref(), Some("app::server::"));
    }

    #[test]
    fn misspelled_level_is_most_verbose() {
        let resolved = Config::default().log_level("infoo").resolve();
        assert_eq!(resolved.max_level, Severity::Debug);
    }

    #[cfg(feature = "config_file")]
    #[test]
    fn from_toml() {
        let config = Config::from_toml(
            r#"
            log_path = "logs/all.log"
            log_level = "trace"
            buffered_lines = 1024
            "#,
        )
        .unwrap();
        assert_eq!(config.log_path, Some(PathBuf::from("logs/all.log")));
        assert_eq!(config.log_level.as_deref(), Some("trace"));
        assert_eq!(config.error_log_path, None);
        assert_eq!(config.buffered_lines, Some(1024));

        assert!(Config::from_toml("log_level = 5").is_err());

        let config = Config::from_toml(
            r#"
            log_pth = "x"
            log_level = "warn"
            [server]
            port = 8080
            "#,
        )
        .unwrap();
        assert_eq!(config, Config::default().log_level("warn"));
    }
}
