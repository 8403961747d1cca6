use std::io::{self, Write};

use crate::LogSink;

/// Writes records to stderr.
pub struct StderrSink;

impl StderrSink {
    pub fn new() -> StderrSink {
        StderrSink {}
    }
}

impl Default for StderrSink {
    fn default() -> Self {
        Self::new()
    }
}

impl LogSink for StderrSink {
    fn write(&mut self, record: &[u8]) -> io::Result<usize> {
        let mut err = io::stderr().lock();
        err.write_all(record)?;
        Ok(record.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stderr().lock().flush()
    }

    fn sync(&mut self) -> io::Result<()> {
        // stderr is unbuffered once flushed; nothing further to do
        Ok(())
    }
}
