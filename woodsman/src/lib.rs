//! Leveled, severity-cascading logging with dynamic per-module filtering.
//!
//! # Usage
//!
//! `woodsman` logs through four severity entry points plus verbose logging
//! gated on a per-call-site level. Records at a given severity cascade into
//! the sinks of every lower severity, so the `INFO` file sees everything.
//! The global logger initializes itself on first use; [`init!`] applies
//! explicit [`Options`] instead.
//!
//! ## Example
//!
//! ```rust no_run
//! use woodsman::{fatal, info, init, warning, Level, Options};
//!
//! # fn main() {
//! init!(Options::default());
//!
//! info!("service starting, pid {}", std::process::id());
//! warning!("configuration value {} deprecated", "old_knob");
//!
//! // verbose logging: the gate is evaluated once per call site and the
//! // returned guard is a no-op when the site is disabled
//! woodsman::logger().v(Level(2)).info(format_args!("detailed state dump"));
//!
//! // writes, flushes and syncs every sink, then runs the exit hook
//! fatal!("unrecoverable: {}", "example");
//! # }
//! ```
//!
//! # Log line format
//!
//! Every record is one line (plus an optional appended stack trace):
//!
//! ```text
//! <L><MMDD> <HH:MM:SS.uuuuuu> <pid> <shortfile>:<line>] <message>
//! ```
//!
//! The prefix widths are a compatibility contract with external parsers:
//! no space between the severity letter and the date, always six digits of
//! microseconds, pid right-justified in seven columns.
//!
//! # Verbose logging
//!
//! [`Logger::v`] compares the requested level against a process-wide
//! threshold. With no overrides configured this costs one atomic load and
//! a compare. [`Logger::set_vmodule`] installs `pattern=N` overrides
//! matched as globs against the call site's module name (short,
//! extension-stripped file name); resolutions are cached per call site and
//! the cache is wiped whenever the override list changes.
//!
//! # Fatal records
//!
//! After a `FATAL` record reaches its sinks, every sink is flushed and
//! synced and the exit hook runs exactly once, receiving `None` or the
//! first I/O error from the write path. The default hook terminates the
//! process with status 255; tests install their own hook to observe
//! fatal-path failures without dying.

/// Macros for logging through the global logger.
mod macros;

/// Conditional stack traces at a trapped file:line.
pub mod backtrace;
/// Reusable formatting buffers behind their own lock.
mod buffer;
/// The consumed configuration surface and its parse errors.
pub mod config;
/// Fixed-width header rendering.
mod fmt;
/// Size-triggered file rotation and file naming.
pub mod rotate;
/// Severity routing, cascade and the fatal path.
mod router;
/// Severities and their codes.
pub mod severity;
/// Verbosity levels, call sites and override patterns.
pub mod vmodule;

use std::io::Write;
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::sync::{Mutex, OnceLock};

use chrono::{DateTime, Local};
use crossbeam_utils::CachePadded;

use crate::buffer::BufferPool;
use crate::router::Core;

pub use crate::backtrace::TraceLocation;
pub use crate::config::{log_dir_warning, Options, ParseError};
pub use crate::router::ExitHook;
pub use crate::severity::{Severity, NUM_SEVERITY};
pub use crate::vmodule::{CallSite, Level};

pub use woodsman_sink::{LogSink, NoopSink, StderrSink};
#[cfg(unix)]
pub use woodsman_sink::SyslogSink;

/// The process-wide logger, created on first use.
static LOGGER: OnceLock<Logger> = OnceLock::new();

/// Returns the global [`Logger`], initializing it from the environment if
/// no explicit [`init!`] happened first.
#[inline]
pub fn logger() -> &'static Logger {
    LOGGER.get_or_init(|| {
        // from_env only fills in booleans, so this cannot actually fail
        Logger::new(Options::from_env()).expect("invalid logging options from environment")
    })
}

/// Installs the global logger with explicit options. Returns `false` when
/// the global logger already exists (first initialization wins, matching
/// the init-once lifecycle); a malformed vmodule spec in the options is
/// an error.
pub fn try_init(opts: Options) -> Result<bool, ParseError> {
    Ok(LOGGER.set(Logger::new(opts)?).is_ok())
}

/// A logging context: sinks, filters, buffer pool and hot-path state.
///
/// The process normally uses one [`logger()`] for its whole lifetime, but
/// the type is an ordinary value so tests construct isolated instances
/// with their own sinks, clocks and exit hooks.
pub struct Logger {
    /// Global verbosity threshold; read lock-free on every `v()` call.
    verbosity: CachePadded<AtomicU32>,
    /// Number of active override patterns; non-zero routes `v()` onto the
    /// slow path. Modified only under the main lock.
    filter_count: CachePadded<AtomicUsize>,
    /// Free list of formatting buffers, locked separately from `core` so
    /// formatting never contends with sink selection or rotation.
    pool: BufferPool,
    /// Main logging lock: sinks, rotation, overrides, cache, trap, hook.
    core: Mutex<Core>,
    /// Wall clock, swappable in tests.
    now: fn() -> DateTime<Local>,
    pid: u32,
}

impl Logger {
    /// Builds a logger from the consumed configuration surface. The only
    /// fallible part is the vmodule override spec carried in the options.
    pub fn new(opts: Options) -> Result<Logger, ParseError> {
        let logger = Logger {
            verbosity: CachePadded::new(AtomicU32::new(opts.verbosity.0)),
            filter_count: CachePadded::new(AtomicUsize::new(0)),
            pool: BufferPool::new(),
            core: Mutex::new(Core::new(&opts)),
            now: Local::now,
            pid: std::process::id(),
        };
        if !opts.vmodule.is_empty() {
            logger.set_vmodule(&opts.vmodule)?;
        }
        Ok(logger)
    }

    /// Logs at `INFO` severity from the caller's location.
    #[track_caller]
    pub fn info(&self, args: std::fmt::Arguments) {
        self.print_at(Severity::Info, CallSite::from_caller(), args);
    }

    /// Logs at `WARNING` severity from the caller's location.
    #[track_caller]
    pub fn warning(&self, args: std::fmt::Arguments) {
        self.print_at(Severity::Warning, CallSite::from_caller(), args);
    }

    /// Logs at `ERROR` severity from the caller's location.
    #[track_caller]
    pub fn error(&self, args: std::fmt::Arguments) {
        self.print_at(Severity::Error, CallSite::from_caller(), args);
    }

    /// Logs at `FATAL` severity, then flushes and syncs every sink and
    /// invokes the exit hook; by default that terminates the process.
    #[track_caller]
    pub fn fatal(&self, args: std::fmt::Arguments) {
        self.print_at(Severity::Fatal, CallSite::from_caller(), args);
    }

    /// Evaluates the verbosity gate once for the caller's call site and
    /// returns a guard whose logging methods are no-ops when the gate is
    /// closed.
    ///
    /// With no overrides configured this is one relaxed atomic load and a
    /// compare.
    #[track_caller]
    pub fn v(&self, level: Level) -> Verbose<'_> {
        self.v_at(level, CallSite::from_caller())
    }

    /// Whether verbose logging at `level` is enabled for `site`.
    pub fn enabled(&self, level: Level, site: CallSite) -> bool {
        if self.filter_count.load(Ordering::Relaxed) == 0 {
            return level.0 <= self.verbosity.load(Ordering::Relaxed);
        }
        let global = Level(self.verbosity.load(Ordering::Relaxed));
        let mut core = self.lock_core();
        level <= core.resolve_level(site, global)
    }

    /// Sets the global verbosity threshold.
    pub fn set_verbosity(&self, level: Level) {
        self.verbosity.store(level.0, Ordering::Relaxed);
    }

    /// Replaces the override pattern list from a `pattern=N,...` spec.
    /// Clears the per-call-site cache so earlier resolutions are
    /// re-evaluated against the new list. A malformed spec is rejected
    /// whole and leaves the previous list in place.
    pub fn set_vmodule(&self, spec: &str) -> Result<(), ParseError> {
        let filters = vmodule::parse_filter(spec)?;
        let mut core = self.lock_core();
        let count = core.set_filters(filters);
        self.filter_count.store(count, Ordering::Relaxed);
        Ok(())
    }

    /// Arms (or, with `None`, disarms) the backtrace trap; a record issued
    /// from exactly that file and line gets the current stack appended.
    pub fn set_backtrace_at(&self, location: Option<TraceLocation>) {
        self.lock_core().trace_location = location;
    }

    /// Severities at or above this are mirrored to stderr.
    pub fn set_stderr_threshold(&self, severity: Severity) {
        self.lock_core().set_stderr_threshold(severity);
    }

    /// Flushes and syncs every sink. Errors are best-effort here; the
    /// fatal path reports them through the exit hook instead.
    pub fn flush_all(&self) {
        let _ = self.lock_core().flush_all();
    }

    /// Replaces the exit hook run at the end of every Fatal write.
    pub fn set_exit_hook(&self, hook: ExitHook) {
        self.lock_core().exit_hook = hook;
    }

    /// Replaces the wall clock used for record timestamps. Test support.
    pub fn set_time_source(&mut self, now: fn() -> DateTime<Local>) {
        self.now = now;
    }

    /// Swaps the per-severity sink slots, returning the old ones. Test
    /// support; production sinks are configured through [`Options`].
    pub fn swap_sinks(
        &self,
        new: [Option<Box<dyn LogSink + Send>>; NUM_SEVERITY],
    ) -> [Option<Box<dyn LogSink + Send>>; NUM_SEVERITY] {
        self.lock_core().swap_sinks(new)
    }

    /// Formats and routes one record. Public for macro expansion only.
    #[doc(hidden)]
    pub fn print_at(&self, severity: Severity, site: CallSite, args: std::fmt::Arguments) {
        let mut buf = self.pool.get(severity, (self.now)());
        fmt::write_header(&mut buf, self.pid, site);
        let _ = buf.write_fmt(args);
        buf.finish_line();

        let mut core = self.lock_core();
        // Trap hits are rare; appending the trace under the lock keeps the
        // check and the write in one critical section.
        if core
            .trace_location
            .as_ref()
            .is_some_and(|trap| trap.matches(site))
        {
            backtrace::append_backtrace(&mut buf, site);
        }
        let write_err = core.output(severity, buf.bytes());
        if severity == Severity::Fatal {
            let flush_err = core.flush_all();
            (core.exit_hook)(write_err.or(flush_err));
        }
        drop(core);

        self.pool.put(buf);
    }

    /// Gate evaluation plus guard construction. Public for macro expansion
    /// only.
    #[doc(hidden)]
    pub fn v_at(&self, level: Level, site: CallSite) -> Verbose<'_> {
        Verbose {
            logger: self,
            enabled: self.enabled(level, site),
        }
    }

    fn lock_core(&self) -> std::sync::MutexGuard<'_, Core> {
        self.core.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl CallSite {
    /// Call site of the immediate caller, via `#[track_caller]`.
    #[inline]
    #[track_caller]
    pub fn from_caller() -> CallSite {
        let loc = std::panic::Location::caller();
        CallSite::new(loc.file(), loc.line())
    }
}

/// Conditionally-active logger returned by [`Logger::v`]. The gate
/// decision was made when the guard was built; each method here only
/// checks the stored flag.
pub struct Verbose<'a> {
    logger: &'a Logger,
    enabled: bool,
}

impl Verbose<'_> {
    /// Whether the gate was open for this call site and level.
    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Logs at `INFO` severity when the gate was open.
    #[track_caller]
    pub fn info(&self, args: std::fmt::Arguments) {
        if self.enabled {
            self.logger
                .print_at(Severity::Info, CallSite::from_caller(), args);
        }
    }
}
