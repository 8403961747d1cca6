//! Size-triggered log file rotation.
//!
//! One [`RotatingFile`] backs each file-backed severity sink. Files are
//! opened lazily on first write and replaced once the configured maximum
//! size would be reached; each file gets a unique name embedding program,
//! host, user, severity, a second-resolution timestamp and the pid, plus a
//! `program.SEVERITY` symlink pointing at the current file. Two rotations
//! within the same wall-clock second produce the same name; that is a
//! known, accepted limitation of the naming scheme.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use chrono::{DateTime, Datelike, Local, Timelike};
use woodsman_sink::LogSink;

use crate::severity::Severity;

const FILE_BUFFER_SIZE: usize = 256 * 1024;

/// File-backed sink for one severity.
pub struct RotatingFile {
    dir: PathBuf,
    severity: Severity,
    max_size: u64,
    file: Option<BufWriter<File>>,
    /// Bytes written to the current file since it was created, header
    /// block included. Invariant: stays below `max_size`; a write that
    /// would reach it rotates first.
    nbytes: u64,
    /// Name of the current file, for tests and the symlink.
    current_name: Option<String>,
}

impl RotatingFile {
    pub fn new(dir: PathBuf, severity: Severity, max_size: u64) -> RotatingFile {
        RotatingFile {
            dir,
            severity,
            max_size,
            file: None,
            nbytes: 0,
            current_name: None,
        }
    }

    /// Name of the file currently being written, if one is open.
    pub fn current_name(&self) -> Option<&str> {
        self.current_name.as_deref()
    }

    /// Bytes written to the current file since the last rotation.
    pub fn bytes_since_rotation(&self) -> u64 {
        self.nbytes
    }

    /// `program.host.user.log.SEVERITY.YYYYMMDD-HHMMSS.pid`
    fn file_name(&self, t: DateTime<Local>) -> String {
        format!(
            "{}.{}.{}.log.{}.{:04}{:02}{:02}-{:02}{:02}{:02}.{}",
            program_name(),
            short_hostname(&hostname()),
            user_name(),
            self.severity.name(),
            t.year(),
            t.month(),
            t.day(),
            t.hour(),
            t.minute(),
            t.second(),
            std::process::id(),
        )
    }

    /// Closes the current file and opens a freshly named one, writing the
    /// creation header block before any record.
    fn rotate(&mut self, now: DateTime<Local>) -> io::Result<()> {
        if let Some(mut old) = self.file.take() {
            let _ = old.flush();
        }

        let name = self.file_name(now);
        let path = self.dir.join(&name);
        let file = File::create(&path)?;
        let mut writer = BufWriter::with_capacity(FILE_BUFFER_SIZE, file);

        let mut header = Vec::with_capacity(256);
        let _ = writeln!(
            header,
            "Log file created at: {:04}/{:02}/{:02} {:02}:{:02}:{:02}",
            now.year(),
            now.month(),
            now.day(),
            now.hour(),
            now.minute(),
            now.second(),
        );
        let _ = writeln!(header, "Running on machine: {}", hostname());
        let _ = writeln!(
            header,
            "Binary: {} (pid {})",
            program_name(),
            std::process::id()
        );
        let _ = writeln!(
            header,
            "Log line format: [IWEF]mmdd hh:mm:ss.uuuuuu pid file:line] msg"
        );
        writer.write_all(&header)?;

        self.nbytes = header.len() as u64;
        self.file = Some(writer);

        // best-effort current-file alias; failure must not break logging
        #[cfg(unix)]
        {
            let link = self
                .dir
                .join(format!("{}.{}", program_name(), self.severity.name()));
            let _ = std::fs::remove_file(&link);
            let _ = std::os::unix::fs::symlink(&name, &link);
        }

        self.current_name = Some(name);
        Ok(())
    }
}

impl LogSink for RotatingFile {
    fn write(&mut self, record: &[u8]) -> io::Result<usize> {
        if self.file.is_none() || self.nbytes + record.len() as u64 >= self.max_size {
            self.rotate(Local::now())?;
        }
        // rotate either opened a file or returned the error above
        let writer = self
            .file
            .as_mut()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "log file not open"))?;
        writer.write_all(record)?;
        self.nbytes += record.len() as u64;
        Ok(record.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.file.as_mut() {
            Some(writer) => writer.flush(),
            None => Ok(()),
        }
    }

    fn sync(&mut self) -> io::Result<()> {
        match self.file.as_mut() {
            Some(writer) => {
                writer.flush()?;
                writer.get_ref().sync_all()
            }
            None => Ok(()),
        }
    }
}

/// Short name of the running binary, for file naming.
pub fn program_name() -> String {
    std::env::current_exe()
        .ok()
        .and_then(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
        .unwrap_or_else(|| "unknown".to_string())
}

/// Hostname reported by the OS, empty when unavailable.
#[cfg(unix)]
pub fn hostname() -> String {
    let mut buf = [0u8; 256];
    let rc = unsafe { libc::gethostname(buf.as_mut_ptr() as *mut libc::c_char, buf.len()) };
    if rc != 0 {
        return String::new();
    }
    let end = buf.iter().position(|&b| b == 0).unwrap_or(buf.len());
    String::from_utf8_lossy(&buf[..end]).into_owned()
}

/// Hostname reported by the OS, empty when unavailable.
#[cfg(not(unix))]
pub fn hostname() -> String {
    std::env::var("COMPUTERNAME").unwrap_or_default()
}

/// Truncates a hostname at its first dot.
pub fn short_hostname(hostname: &str) -> &str {
    hostname.split('.').next().unwrap_or(hostname)
}

/// Name of the user running the process, for file naming.
pub fn user_name() -> String {
    std::env::var("USER")
        .or_else(|_| std::env::var("LOGNAME"))
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_else(|_| "unknown".to_string())
}
