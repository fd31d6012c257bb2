//! Line grammar of a results report.
//!
//! ```text
//! Searching 12 files for "foo"
//!
//! /a/b.txt:
//!     3: foo bar
//!     4  context line
//!
//! 1 match in 1 file @ 2024-05-01 10:00:00.000000
//! ```

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Header anywhere in a multi-line text.
pub(crate) static HEADER_ML: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?m)Searching [0-9]+ files for ".*""#).expect("header regex"));

/// Header at the start of a single line.
static HEADER_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"^Searching [0-9]+ files for ".*""#).expect("header line regex"));

const FOOTER: &str =
    r"1 match in 1 file|[0-9]+ matches in 1 file|[0-9]+ matches across [0-9]+ files";

/// Footer anywhere in a multi-line text.
pub(crate) static FOOTER_ML: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!("(?m){FOOTER}")).expect("footer regex"));

/// Footer at the start of a single line (a stamp may follow).
static FOOTER_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!("^(?:{FOOTER})")).expect("footer line regex"));

/// Result row: optional indent, line number, `": "` (match) or two spaces (context), text.
static ROW: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*([0-9]+)(?::\s|\s\s)(.*)$").expect("row regex"));

static POSIX_PATH_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(/[^:]*):$").expect("posix path regex"));
static POSIX_PATH_ML: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^(/[^:\r\n]*):\r?$").expect("posix path ml regex"));
static WINDOWS_PATH_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([a-zA-Z]:[^:]*):$").expect("windows path regex"));
static WINDOWS_PATH_ML: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^([a-zA-Z]:[^:\r\n]*):\r?$").expect("windows path ml regex")
});

/// Which absolute-path shape introduces a file section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PathStyle {
    /// `/abs/path:`
    Posix,
    /// `C:\abs\path:`
    Windows,
}

impl Default for PathStyle {
    fn default() -> Self {
        Self::native()
    }
}

impl PathStyle {
    pub const fn native() -> Self {
        if cfg!(windows) {
            PathStyle::Windows
        } else {
            PathStyle::Posix
        }
    }

    /// Captured path when `line` is a file section line.
    pub fn match_path_line(self, line: &str) -> Option<&str> {
        let re = match self {
            PathStyle::Posix => &*POSIX_PATH_LINE,
            PathStyle::Windows => &*WINDOWS_PATH_LINE,
        };
        re.captures(line)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str())
    }

    pub(crate) fn path_multiline(self) -> &'static Regex {
        match self {
            PathStyle::Posix => &*POSIX_PATH_ML,
            PathStyle::Windows => &*WINDOWS_PATH_ML,
        }
    }
}

/// True when `line` starts with a `Searching <N> files for "<query>"` header.
pub fn is_header_line(line: &str) -> bool {
    HEADER_LINE.is_match(line)
}

/// True when `line` starts with a footer, stamped or not.
pub fn is_footer_line(line: &str) -> bool {
    FOOTER_LINE.is_match(line)
}

/// Split a result row into its displayed (1-based) number and literal text.
pub fn match_row(line: &str) -> Option<(&str, &str)> {
    let caps = ROW.captures(line)?;
    Some((caps.get(1)?.as_str(), caps.get(2)?.as_str()))
}
