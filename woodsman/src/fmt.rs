//! Fixed-width log line header.
//!
//! Every record starts with
//!
//! ```text
//! <L><MMDD> <HH:MM:SS.uuuuuu> <pid> <shortfile>:<line>]
//! ```
//!
//! where `L` is the severity letter, microseconds are always six digits and
//! the pid is right-justified in seven columns. This prefix is a binary
//! contract: external tools parse log text by these exact widths and
//! separators, so nothing here may vary with locale, platform or message.

use std::io::Write;

use chrono::{Datelike, Timelike};

use crate::buffer::Buffer;
use crate::vmodule::CallSite;

/// Renders the header for the record the buffer was stamped with. The
/// year is deliberately absent from the line format, matching the
/// documented contract.
pub fn write_header(buf: &mut Buffer, pid: u32, site: CallSite) {
    let t = buf.at;
    // writes into a Buffer cannot fail
    let _ = write!(
        buf,
        "{}{:02}{:02} {:02}:{:02}:{:02}.{:06} {:>7} {}:{}] ",
        buf.severity.code() as char,
        t.month(),
        t.day(),
        t.hour(),
        t.minute(),
        t.second(),
        t.timestamp_subsec_micros(),
        pid,
        site.short_file(),
        site.line,
    );
}
