use std::io;

use crate::LogSink;

/// Does nothing, i.e. simply discards log records.
pub struct NoopSink;

impl NoopSink {
    pub fn new() -> NoopSink {
        NoopSink {}
    }
}

impl Default for NoopSink {
    fn default() -> Self {
        Self::new()
    }
}

impl LogSink for NoopSink {
    fn write(&mut self, record: &[u8]) -> io::Result<usize> {
        Ok(record.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }

    fn sync(&mut self) -> io::Result<()> {
        Ok(())
    }
}
