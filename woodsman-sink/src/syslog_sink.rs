use std::ffi::CString;
use std::io;

use crate::LogSink;

/// Forwards records to the system log daemon through `syslog(3)`.
///
/// Records arrive already formatted by the engine, so the daemon's own
/// header simply wraps the engine's line. Everything is submitted at
/// `LOG_INFO` priority; severity is carried in the record text itself.
pub struct SyslogSink;

impl SyslogSink {
    pub fn new() -> SyslogSink {
        unsafe {
            // NULL ident makes syslog fall back to the program name
            libc::openlog(std::ptr::null(), libc::LOG_PID, libc::LOG_USER);
        }
        SyslogSink {}
    }
}

impl Default for SyslogSink {
    fn default() -> Self {
        Self::new()
    }
}

impl LogSink for SyslogSink {
    fn write(&mut self, record: &[u8]) -> io::Result<usize> {
        let text = String::from_utf8_lossy(record);
        let msg = CString::new(text.trim_end_matches('\n').replace('\0', ""))
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        unsafe {
            libc::syslog(
                libc::LOG_INFO,
                b"%s\0".as_ptr() as *const libc::c_char,
                msg.as_ptr(),
            );
        }
        Ok(record.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }

    fn sync(&mut self) -> io::Result<()> {
        Ok(())
    }
}
