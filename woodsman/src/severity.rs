//! Severities available for logging.
//!
//! Consists of 4 severities in total, in increasing order:
//!
//! * [`Info`]
//! * [`Warning`]
//! * [`Error`]
//! * [`Fatal`]
//!
//! A record written at some severity cascades into the sink of every lower
//! severity, so the Info sink sees everything and the Fatal sink only sees
//! fatal records. Each severity owns exactly one single-letter code, which
//! is the first byte of every log line, and one fixed sink slot.
//!
//! [`Info`]: crate::severity::Severity::Info
//! [`Warning`]: crate::severity::Severity::Warning
//! [`Error`]: crate::severity::Severity::Error
//! [`Fatal`]: crate::severity::Severity::Fatal

use std::fmt::Display;
use std::str::FromStr;

use crate::config::ParseError;

/// Number of severities, and the size of the sink slot array.
pub const NUM_SEVERITY: usize = 4;

const SEVERITY_NAMES: [&str; NUM_SEVERITY] = ["INFO", "WARNING", "ERROR", "FATAL"];
const SEVERITY_CODES: [u8; NUM_SEVERITY] = [b'I', b'W', b'E', b'F'];

#[repr(usize)]
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum Severity {
    /// Designates useful information
    Info = 0,
    /// Designates potentially hazardous situations
    Warning = 1,
    /// Designates serious errors
    Error = 2,
    /// Designates unrecoverable errors; triggers the exit hook
    Fatal = 3,
}

impl Severity {
    /// Single-letter code used as the first byte of the log line header.
    #[inline]
    pub fn code(self) -> u8 {
        SEVERITY_CODES[self as usize]
    }

    /// Upper-case name, as embedded in rotated file names.
    pub fn name(self) -> &'static str {
        SEVERITY_NAMES[self as usize]
    }

    /// All severities, in cascade order.
    pub fn all() -> [Severity; NUM_SEVERITY] {
        [
            Severity::Info,
            Severity::Warning,
            Severity::Error,
            Severity::Fatal,
        ]
    }

    fn from_index(i: usize) -> Severity {
        match i {
            0 => Severity::Info,
            1 => Severity::Warning,
            2 => Severity::Error,
            3 => Severity::Fatal,
            _ => unreachable!("severity index out of range"),
        }
    }

    /// The severities whose sinks receive a record written at `self`:
    /// `self` itself and everything strictly less severe, most severe
    /// first.
    pub fn cascade(self) -> impl Iterator<Item = Severity> {
        (0..=self as usize).rev().map(Severity::from_index)
    }
}

impl Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Severity {
    type Err = ParseError;

    /// Accepts a severity name (any case) or its numeric index, the same
    /// forms the threshold flag accepts.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.to_ascii_uppercase();
        if let Some(i) = SEVERITY_NAMES.iter().position(|name| *name == upper) {
            return Ok(Severity::from_index(i));
        }
        match s.parse::<usize>() {
            Ok(i) if i < NUM_SEVERITY => Ok(Severity::from_index(i)),
            _ => Err(ParseError::UnknownSeverity(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Cascade must run from the written severity down to `Info`, so a
    /// record is visible in every sink at or below its own severity.
    #[test]
    fn cascade_order() {
        let targets: Vec<Severity> = Severity::Error.cascade().collect();
        assert_eq!(
            targets,
            vec![Severity::Error, Severity::Warning, Severity::Info]
        );

        let targets: Vec<Severity> = Severity::Info.cascade().collect();
        assert_eq!(targets, vec![Severity::Info]);
    }

    #[test]
    fn parse_names_and_indices() {
        assert_eq!("INFO".parse::<Severity>().unwrap(), Severity::Info);
        assert_eq!("warning".parse::<Severity>().unwrap(), Severity::Warning);
        assert_eq!("Error".parse::<Severity>().unwrap(), Severity::Error);
        assert_eq!("3".parse::<Severity>().unwrap(), Severity::Fatal);
        assert!("verbose".parse::<Severity>().is_err());
        assert!("4".parse::<Severity>().is_err());
    }

    #[test]
    fn codes_match_names() {
        for s in Severity::all() {
            assert_eq!(s.code(), s.name().as_bytes()[0]);
        }
    }
}
