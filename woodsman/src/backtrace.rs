//! Conditional stack traces.
//!
//! A single trap location can be armed at runtime. When a record is issued
//! from exactly that file and line, the current stack is captured as text
//! and appended to the record body, inside the same record. The trace
//! block opens with a line naming the matched `file:line`, so the token
//! from the header reappears in the body and downstream tooling can pair
//! the two.

use std::backtrace::Backtrace;
use std::io::Write;
use std::str::FromStr;

use crate::buffer::Buffer;
use crate::config::ParseError;
use crate::vmodule::CallSite;

/// An armed `file:line` trap. Matching is exact: the line must be equal
/// and the configured file must equal the call site's path or a trailing
/// path of it (whole components, so `test.rs` does not match
/// `my_test.rs`).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TraceLocation {
    file: String,
    line: u32,
}

impl TraceLocation {
    pub fn matches(&self, site: CallSite) -> bool {
        if site.line != self.line {
            return false;
        }
        if site.file == self.file || site.short_file() == self.file {
            return true;
        }
        site.file
            .strip_suffix(self.file.as_str())
            .map(|rest| rest.ends_with(['/', '\\']))
            .unwrap_or(false)
    }
}

impl FromStr for TraceLocation {
    type Err = ParseError;

    /// Parses `file:line`. The line must be a positive integer; an unset
    /// trap is represented by `None` at the caller, not by a sentinel.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || ParseError::MalformedTraceLocation(s.to_string());

        let (file, line) = s.rsplit_once(':').ok_or_else(malformed)?;
        if file.is_empty() {
            return Err(malformed());
        }
        let line = line.parse::<u32>().map_err(|_| malformed())?;
        if line == 0 {
            return Err(malformed());
        }

        Ok(TraceLocation {
            file: file.to_string(),
            line,
        })
    }
}

/// Appends the trace block for a matched trap to the record being built.
pub fn append_backtrace(buf: &mut Buffer, site: CallSite) {
    buf.finish_line();
    let _ = writeln!(
        buf,
        "Stack trace requested at {}:{}:",
        site.short_file(),
        site.line
    );
    let _ = write!(buf, "{}", Backtrace::force_capture());
    buf.finish_line();
}
