//! Reusable formatting buffers.
//!
//! Every log call formats its record into a [`Buffer`] taken from the
//! [`BufferPool`] free list and returns it once the record has been handed
//! to the router. The free list has its own lock, separate from the main
//! logging lock, so formatting work under high fan-out never contends with
//! sink selection or rotation. The pool is unbounded and buffers are never
//! shrunk.

use std::io::Write;
use std::sync::Mutex;

use chrono::{DateTime, Local};

use crate::severity::Severity;

/// An owned, reusable byte container plus the metadata captured when
/// formatting of the current record started. Between [`BufferPool::get`]
/// and [`BufferPool::put`] the buffer is exclusively owned by the caller;
/// giving it back is a move, so it cannot be read afterwards.
pub struct Buffer {
    bytes: Vec<u8>,
    /// Severity of the record currently being formatted.
    pub severity: Severity,
    /// Wall-clock time captured at formatting start.
    pub at: DateTime<Local>,
}

impl Buffer {
    fn new() -> Buffer {
        Buffer {
            bytes: Vec::with_capacity(256),
            severity: Severity::Info,
            at: chrono::DateTime::<chrono::Utc>::MIN_UTC.into(),
        }
    }

    /// Formatted record so far.
    #[inline]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Appends a newline unless the record already ends with one. The line
    /// format contract guarantees exactly one trailing newline per record.
    pub fn finish_line(&mut self) {
        if self.bytes.last() != Some(&b'\n') {
            self.bytes.push(b'\n');
        }
    }
}

// Formatting goes through io::Write; writes into a Vec are infallible.
impl Write for Buffer {
    #[inline]
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.bytes.write(buf)
    }

    #[inline]
    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// Free list of [`Buffer`]s, maintained under its own lock.
pub struct BufferPool {
    free: Mutex<Vec<Buffer>>,
}

impl BufferPool {
    pub fn new() -> BufferPool {
        BufferPool {
            free: Mutex::new(Vec::new()),
        }
    }

    /// Takes a buffer off the free list, allocating a fresh one when the
    /// list is empty. The returned buffer is empty and stamped with the
    /// given severity and timestamp.
    pub fn get(&self, severity: Severity, at: DateTime<Local>) -> Buffer {
        let mut buf = {
            let mut free = self.free.lock().unwrap_or_else(|e| e.into_inner());
            free.pop().unwrap_or_else(Buffer::new)
        };
        buf.bytes.clear();
        buf.severity = severity;
        buf.at = at;
        buf
    }

    /// Returns a buffer to the free list for reuse.
    pub fn put(&self, buf: Buffer) {
        let mut free = self.free.lock().unwrap_or_else(|e| e.into_inner());
        free.push(buf);
    }
}

impl Default for BufferPool {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Local;
    use std::io::Write;

    #[test]
    fn get_resets_write_position() {
        let pool = BufferPool::new();
        let mut buf = pool.get(Severity::Info, Local::now());
        buf.write_all(b"leftover").unwrap();
        pool.put(buf);

        let buf = pool.get(Severity::Warning, Local::now());
        assert!(buf.bytes().is_empty());
        assert_eq!(buf.severity, Severity::Warning);
    }

    #[test]
    fn finish_line_appends_once() {
        let pool = BufferPool::new();
        let mut buf = pool.get(Severity::Info, Local::now());
        buf.write_all(b"message").unwrap();
        buf.finish_line();
        buf.finish_line();
        assert_eq!(buf.bytes(), b"message\n");
    }

    #[test]
    fn pool_reuses_released_buffers() {
        let pool = BufferPool::new();
        let mut buf = pool.get(Severity::Info, Local::now());
        buf.write_all(&vec![b'x'; 4096]).unwrap();
        let cap = {
            pool.put(buf);
            let free = pool.free.lock().unwrap();
            free[0].bytes.capacity()
        };
        // capacity survives the round trip; buffers are never shrunk
        let buf = pool.get(Severity::Info, Local::now());
        assert!(buf.bytes.capacity() >= cap);
    }
}
