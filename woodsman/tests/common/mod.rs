// Not every test file uses every helper
#![allow(dead_code)]

use std::io;
use std::sync::{Arc, Mutex};

use woodsman::{Logger, LogSink, Options, Severity, NUM_SEVERITY};

/// Sink writing into a shared byte buffer so tests can read back records.
pub struct CaptureSink {
    buf: Arc<Mutex<Vec<u8>>>,
}

impl CaptureSink {
    pub fn new(buf: Arc<Mutex<Vec<u8>>>) -> CaptureSink {
        CaptureSink { buf }
    }
}

impl LogSink for CaptureSink {
    fn write(&mut self, record: &[u8]) -> io::Result<usize> {
        self.buf.lock().unwrap().extend_from_slice(record);
        Ok(record.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }

    fn sync(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Sink that rejects every write, for exercising the fatal error path.
pub struct BrokenSink;

impl LogSink for BrokenSink {
    fn write(&mut self, _record: &[u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::Other, "sink is broken"))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }

    fn sync(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Options used by most tests: capture sinks stand in for files, and the
/// stderr mirror only fires for fatal records to keep test output quiet.
pub fn test_options() -> Options {
    Options {
        to_stderr: false,
        to_file: true,
        stderr_threshold: Severity::Fatal,
        ..Options::default()
    }
}

/// A logger whose four sink slots capture into shared buffers, returned
/// alongside the read handles, indexed by severity.
pub fn capture_logger() -> (Logger, [Arc<Mutex<Vec<u8>>>; NUM_SEVERITY]) {
    let logger = Logger::new(test_options()).unwrap();
    let bufs: [Arc<Mutex<Vec<u8>>>; NUM_SEVERITY] = Default::default();
    logger.swap_sinks([
        Some(Box::new(CaptureSink::new(bufs[0].clone()))),
        Some(Box::new(CaptureSink::new(bufs[1].clone()))),
        Some(Box::new(CaptureSink::new(bufs[2].clone()))),
        Some(Box::new(CaptureSink::new(bufs[3].clone()))),
    ]);
    (logger, bufs)
}

/// Captured log text for one severity sink.
pub fn contents(bufs: &[Arc<Mutex<Vec<u8>>>; NUM_SEVERITY], severity: Severity) -> String {
    String::from_utf8_lossy(&bufs[severity as usize].lock().unwrap()).into_owned()
}
