//! Severity routing.
//!
//! [`Core`] is everything guarded by the main logging lock: the per
//! severity sink slots, the stderr and syslog mirrors, the override
//! pattern list with its per-call-site cache, the backtrace trap and the
//! exit hook. A record written at severity S cascades into the sink of
//! every severity at or below S, byte-identical in each; rotation is the
//! sink's own business (see [`RotatingFile`]). The lock is held across one
//! write-and-possible-rotate sequence, never across record formatting.

use std::collections::HashMap;
use std::io;
use std::path::PathBuf;

use woodsman_sink::{LogSink, StderrSink};

use crate::backtrace::TraceLocation;
use crate::config::Options;
use crate::rotate::RotatingFile;
use crate::severity::{Severity, NUM_SEVERITY};
use crate::vmodule::{self, CallSite, CallSiteId, Level, VModulePattern};

/// Callback observing the end of a Fatal write: `None` when every sink
/// accepted the record, `Some(err)` with the first failure otherwise.
/// Called exactly once per Fatal record; the production default reports
/// the error and terminates the process.
pub type ExitHook = Box<dyn FnMut(Option<io::Error>) + Send>;

pub(crate) fn default_exit_hook() -> ExitHook {
    Box::new(|err| {
        if let Some(err) = err {
            eprintln!("log: exiting because of error: {err}");
        }
        std::process::exit(255);
    })
}

/// State guarded by the main logging lock.
pub(crate) struct Core {
    sinks: [Option<Box<dyn LogSink + Send>>; NUM_SEVERITY],
    stderr: StderrSink,
    #[cfg(unix)]
    syslog: Option<woodsman_sink::SyslogSink>,
    to_stderr: bool,
    to_file: bool,
    to_syslog: bool,
    log_dir: PathBuf,
    max_size: u64,
    stderr_threshold: Severity,
    pub(crate) trace_location: Option<TraceLocation>,
    filters: Vec<VModulePattern>,
    /// Resolved level per call site; wiped whenever the filter list
    /// changes state.
    vmap: HashMap<CallSiteId, Level>,
    pub(crate) exit_hook: ExitHook,
}

impl Core {
    pub(crate) fn new(opts: &Options) -> Core {
        Core {
            sinks: [None, None, None, None],
            stderr: StderrSink::new(),
            #[cfg(unix)]
            syslog: opts.to_syslog.then(woodsman_sink::SyslogSink::new),
            to_stderr: opts.to_stderr,
            to_file: opts.to_file,
            to_syslog: opts.to_syslog,
            log_dir: opts
                .log_dir
                .clone()
                .unwrap_or_else(std::env::temp_dir),
            max_size: opts.max_size,
            stderr_threshold: opts.stderr_threshold,
            trace_location: opts.backtrace_at.clone(),
            filters: Vec::new(),
            vmap: HashMap::new(),
            exit_hook: default_exit_hook(),
        }
    }

    /// Routes one formatted record. Returns the first I/O error met while
    /// mirroring, rotating or writing; non-fatal callers drop it, the
    /// Fatal path forwards it to the exit hook.
    pub(crate) fn output(&mut self, severity: Severity, record: &[u8]) -> Option<io::Error> {
        let mut first_err: Option<io::Error> = None;
        let mut note = |res: io::Result<usize>, first_err: &mut Option<io::Error>| {
            if let Err(e) = res {
                first_err.get_or_insert(e);
            }
        };

        if self.to_stderr {
            note(self.stderr.write(record), &mut first_err);
        } else if severity >= self.stderr_threshold {
            note(self.stderr.write(record), &mut first_err);
        }

        #[cfg(unix)]
        if self.to_syslog {
            if let Some(syslog) = self.syslog.as_mut() {
                note(syslog.write(record), &mut first_err);
            }
        }

        if self.to_file || self.has_swapped_sinks() {
            for target in severity.cascade() {
                match self.sink_for(target) {
                    Ok(sink) => note(sink.write(record), &mut first_err),
                    Err(e) => note(Err(e), &mut first_err),
                }
            }
        }

        first_err
    }

    /// Swapped-in sinks (tests) are served even when file logging is off.
    fn has_swapped_sinks(&self) -> bool {
        self.sinks.iter().any(|s| s.is_some())
    }

    /// The sink slot for one severity, created lazily for file logging.
    fn sink_for(&mut self, severity: Severity) -> io::Result<&mut (dyn LogSink + Send)> {
        if self.sinks[severity as usize].is_none() {
            if !self.to_file {
                return Err(io::Error::new(
                    io::ErrorKind::NotFound,
                    "no sink configured for severity",
                ));
            }
            self.sinks[severity as usize] = Some(Box::new(RotatingFile::new(
                self.log_dir.clone(),
                severity,
                self.max_size,
            )));
        }
        match self.sinks[severity as usize].as_deref_mut() {
            Some(sink) => Ok(sink),
            None => Err(io::Error::new(
                io::ErrorKind::NotFound,
                "no sink configured for severity",
            )),
        }
    }

    /// Flushes and syncs every open sink, most severe first so the rarer
    /// sinks are durable before the busy Info one.
    pub(crate) fn flush_all(&mut self) -> Option<io::Error> {
        let mut first_err: Option<io::Error> = None;
        for slot in self.sinks.iter_mut().rev() {
            if let Some(sink) = slot.as_mut() {
                if let Err(e) = sink.flush().and_then(|_| sink.sync()) {
                    first_err.get_or_insert(e);
                }
            }
        }
        if let Err(e) = self.stderr.flush() {
            first_err.get_or_insert(e);
        }
        first_err
    }

    /// Resolved verbosity level for a call site, consulting and filling
    /// the cache. `global` is the process-wide threshold fallback.
    pub(crate) fn resolve_level(&mut self, site: CallSite, global: Level) -> Level {
        let id = site.id();
        if let Some(&level) = self.vmap.get(&id) {
            return level;
        }
        let level = vmodule::resolve(&self.filters, site.module()).unwrap_or(global);
        self.vmap.insert(id, level);
        level
    }

    /// Installs a new override list, wiping the cache. Returns the number
    /// of active patterns for the hot-path count.
    pub(crate) fn set_filters(&mut self, filters: Vec<VModulePattern>) -> usize {
        self.vmap.clear();
        self.filters = filters;
        self.filters.len()
    }

    pub(crate) fn swap_sinks(
        &mut self,
        new: [Option<Box<dyn LogSink + Send>>; NUM_SEVERITY],
    ) -> [Option<Box<dyn LogSink + Send>>; NUM_SEVERITY] {
        std::mem::replace(&mut self.sinks, new)
    }

    pub(crate) fn set_stderr_threshold(&mut self, severity: Severity) {
        self.stderr_threshold = severity;
    }
}
