//! Per-module verbosity overrides.
//!
//! A filter string is a comma-separated list of `pattern=N` entries, where
//! `pattern` is a glob over a *module name* and `N` a verbosity level. The
//! module name of a call site is the short, extension-stripped name of its
//! source file, so the call sites in `src/vmodule.rs` all belong to module
//! `vmodule`. Patterns use full glob semantics over the whole module name:
//! `*` matches any run of characters, `?` exactly one, `[...]` a class.
//!
//! Resolution per call site is cached by the engine; parsing and matching
//! live here.

use std::fmt::Display;
use std::str::FromStr;

use crate::config::ParseError;

/// A verbosity level. Records logged through `v(level)` are emitted when
/// `level` is at or below the resolved threshold for the call site.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Ord, PartialOrd)]
pub struct Level(pub u32);

impl Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Level {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<u32>()
            .map(Level)
            .map_err(|_| ParseError::InvalidLevel(s.to_string()))
    }
}

/// The static location of a logging call expression. Cheap to construct
/// (two words from `file!()`/`line!()` or `Location::caller()`) and stable
/// for the process lifetime, which makes it usable as a cache key.
#[derive(Clone, Copy, Debug)]
pub struct CallSite {
    pub file: &'static str,
    pub line: u32,
}

/// Cache key for a [`CallSite`]. `file` lives in static storage, so its
/// address identifies the source file; two sites with equal (address, line)
/// necessarily resolve to the same level.
pub type CallSiteId = (usize, u32);

impl CallSite {
    #[inline]
    pub fn new(file: &'static str, line: u32) -> CallSite {
        CallSite { file, line }
    }

    /// Identity of the call expression, used purely as a cache key.
    #[inline]
    pub fn id(&self) -> CallSiteId {
        (self.file.as_ptr() as usize, self.line)
    }

    /// File name with directories stripped.
    pub fn short_file(&self) -> &'static str {
        short_file_name(self.file)
    }

    /// Module name: the short file name with its extension stripped.
    pub fn module(&self) -> &'static str {
        let short = self.short_file();
        match short.rfind('.') {
            Some(dot) if dot > 0 => &short[..dot],
            _ => short,
        }
    }
}

/// Strips leading directories from a source path. Handles both separators
/// since `file!()` paths are build-host dependent.
pub(crate) fn short_file_name(file: &'static str) -> &'static str {
    file.rsplit(['/', '\\']).next().unwrap_or(file)
}

/// One `pattern=N` override.
pub struct VModulePattern {
    pattern: glob::Pattern,
    level: Level,
}

impl VModulePattern {
    /// The level this pattern assigns, when it matches the whole module
    /// name.
    pub fn matches(&self, module: &str) -> Option<Level> {
        self.pattern.matches(module).then_some(self.level)
    }
}

impl FromStr for VModulePattern {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut split = s.split('=');

        let (pattern, level) = match (split.next(), split.next(), split.next()) {
            (Some(pattern), Some(level), None) if !pattern.is_empty() => (pattern, level),
            _ => return Err(ParseError::MalformedFilter(s.to_string())),
        };

        let pattern = glob::Pattern::new(pattern).map_err(|source| ParseError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })?;
        let level = level.parse::<Level>()?;

        Ok(VModulePattern { pattern, level })
    }
}

/// Parses a full `pattern=N,pattern=N,...` filter string. Unlike a lenient
/// environment filter, every entry must parse; the engine rejects the whole
/// string otherwise so a typo cannot silently drop overrides.
pub fn parse_filter(spec: &str) -> Result<Vec<VModulePattern>, ParseError> {
    spec.split(',')
        .filter(|entry| !entry.is_empty())
        .map(|entry| entry.trim().parse::<VModulePattern>())
        .collect()
}

/// Resolves a module name against an ordered override list. First match
/// wins; `None` means fall back to the global threshold.
pub fn resolve(filters: &[VModulePattern], module: &str) -> Option<Level> {
    filters.iter().find_map(|f| f.matches(module))
}
