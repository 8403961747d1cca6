//! ## `LogSink` trait
//!
//! Narrow write-with-flush-and-sync contract that lets the logging engine
//! treat file, console and syslog destinations interchangeably. The engine
//! assumes nothing about a destination beyond this trait.
//!
//! ## Example usage of `LogSink`
//!
//! ```rust
//! use woodsman_sink::LogSink;
//! # use woodsman_sink::stderr_sink::StderrSink;
//! struct Router {
//!     sink: Box<dyn LogSink + Send>,
//! }
//!
//! impl Router {
//!     fn emit(&mut self, record: &[u8]) {
//!         // best effort; the sink decides what write/flush/sync mean
//!         let _ = self.sink.write(record);
//!     }
//! }
//! # let mut router = Router { sink: Box::new(StderrSink::new()) };
//! # router.emit(b"I0102 15:04:05.678901    1234 main.rs:1] hello\n");
//! ```

use std::io;

/// Does nothing, i.e. simply discards log records.
pub mod noop_sink;
/// Writes to stderr.
pub mod stderr_sink;
/// Forwards records to the system log daemon (unix only).
#[cfg(unix)]
pub mod syslog_sink;

pub use noop_sink::NoopSink;
pub use stderr_sink::StderrSink;
#[cfg(unix)]
pub use syslog_sink::SyslogSink;

/// A single log destination.
///
/// `write` hands the destination one fully formatted record; `flush` pushes
/// any internal buffering towards the destination, and `sync` asks the
/// destination to make previous writes durable, where that means anything.
pub trait LogSink {
    /// Writes one formatted record. Partial writes are the implementor's
    /// problem; callers treat any `Ok(_)` as accepted.
    fn write(&mut self, record: &[u8]) -> io::Result<usize>;

    /// Flushes internal buffers towards the destination.
    fn flush(&mut self) -> io::Result<()>;

    /// Makes previously written records durable, if the destination can.
    fn sync(&mut self) -> io::Result<()>;
}
