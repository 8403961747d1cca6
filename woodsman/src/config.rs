//! Consumed configuration surface.
//!
//! The engine does not own flag or environment parsing; an external
//! collaborator fills in an [`Options`] value and hands it to
//! [`Logger::new`](crate::Logger::new). Every field can also be changed at
//! runtime through the setters on `Logger`. The parse functions here are
//! plain value-or-error: nothing is deferred, a malformed setting is
//! reported to whoever tried to apply it.

use std::path::PathBuf;

use crate::backtrace::TraceLocation;
use crate::severity::Severity;
use crate::vmodule::Level;

/// Default maximum bytes per log file before rotation, 1.8GB.
pub const DEFAULT_MAX_SIZE: u64 = 1024 * 1024 * 1800;

/// Error from parsing one of the runtime-settable values.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("unknown severity name: {0:?}")]
    UnknownSeverity(String),
    #[error("invalid verbosity level: {0:?}")]
    InvalidLevel(String),
    #[error("malformed vmodule entry {0:?}: expected pattern=N")]
    MalformedFilter(String),
    #[error("invalid vmodule pattern {pattern:?}: {source}")]
    InvalidPattern {
        pattern: String,
        source: glob::PatternError,
    },
    #[error("malformed backtrace location {0:?}: expected file:line")]
    MalformedTraceLocation(String),
}

/// Startup configuration for a [`Logger`](crate::Logger).
#[derive(Debug, Clone)]
pub struct Options {
    /// Write every record to stderr instead of files.
    pub to_stderr: bool,
    /// Write records to per-severity rotated files.
    pub to_file: bool,
    /// Mirror every record to the system log daemon.
    pub to_syslog: bool,
    /// Directory for rotated files; the system temp dir when `None`.
    pub log_dir: Option<PathBuf>,
    /// Global verbosity threshold for `v()` logging.
    pub verbosity: Level,
    /// Override pattern list, `pattern=N,pattern=N,...`. Parsed when the
    /// logger is built; malformed entries reject construction.
    pub vmodule: String,
    /// Severities at or above this are mirrored to stderr regardless of
    /// the file configuration.
    pub stderr_threshold: Severity,
    /// Initial backtrace trap location, normally unset.
    pub backtrace_at: Option<TraceLocation>,
    /// Maximum bytes written to one file before rotation.
    pub max_size: u64,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            to_stderr: false,
            to_file: true,
            to_syslog: false,
            log_dir: None,
            verbosity: Level(0),
            vmodule: String::new(),
            stderr_threshold: Severity::Error,
            backtrace_at: None,
            max_size: DEFAULT_MAX_SIZE,
        }
    }
}

impl Options {
    /// Reads the boolean switches from the `WOODSMAN_LOGTOSTDERR`,
    /// `WOODSMAN_LOGTOFILE` and `WOODSMAN_LOGTOSYSLOG` environment
    /// variables (value `TRUE` enables), leaving the rest at defaults.
    pub fn from_env() -> Self {
        let is_true = |key: &str| std::env::var(key).map(|v| v == "TRUE").unwrap_or(false);

        let mut opts = Options::default();
        if is_true("WOODSMAN_LOGTOSTDERR") {
            opts.to_stderr = true;
        }
        if std::env::var("WOODSMAN_LOGTOFILE").map(|v| v == "FALSE").unwrap_or(false) {
            opts.to_file = false;
        }
        if is_true("WOODSMAN_LOGTOSYSLOG") {
            opts.to_syslog = true;
        }
        opts
    }
}

/// True when a log directory is configured but file logging is off, in
/// which case the directory setting is ignored and the caller should warn.
pub fn log_dir_warning(to_file: bool, log_dir: &str) -> bool {
    !log_dir.is_empty() && !to_file
}
