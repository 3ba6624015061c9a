//! Ticket reference extraction
//!
//! A ticket reference is a known project prefix, an optional single
//! non-alphanumeric separator, and a number without a leading zero. This makes
//! `MVC 3801`, `MVC-3801`, `mvc_3801` and `MVC3801` all name the same ticket,
//! which is normalised to `MVC-3801`.

use anyhow::{Result, bail};
use regex::Regex;
use std::fmt;

/// Project prefixes recognised when no project configuration overrides them
pub const DEFAULT_PROJECT_PREFIXES: &[&str] =
    &["FR", "MVC", "REV", "WL", "OPS", "MVO", "ELO", "SRE", "HAWK"];

/// Canonical `PROJECT-NUMBER` identifier of an issue-tracker ticket
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TicketKey(String);

impl TicketKey {
    /// Builds a key from a matched prefix and number, normalising case and
    /// the separator.
    pub fn from_parts(prefix: &str, number: &str) -> Self {
        Self(format!("{prefix}-{number}").to_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TicketKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single ticket reference as it appeared in the scanned text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TicketRef<'a> {
    pub prefix: &'a str,
    pub number: &'a str,
}

impl TicketRef<'_> {
    pub fn key(&self) -> TicketKey {
        TicketKey::from_parts(self.prefix, self.number)
    }
}

/// Compiled ticket pattern for a fixed set of project prefixes.
///
/// Every call scans its input from the start; the matcher holds no position
/// state and can be shared freely.
#[derive(Debug, Clone)]
pub struct TicketMatcher {
    pattern: Regex,
    strip_pattern: Regex,
}

impl TicketMatcher {
    /// Compiles a matcher for the given project prefixes
    pub fn new<S: AsRef<str>>(prefixes: &[S]) -> Result<Self> {
        let alternation = prefixes
            .iter()
            .map(|prefix| prefix.as_ref().trim())
            .filter(|prefix| !prefix.is_empty())
            .map(regex::escape)
            .collect::<Vec<_>>()
            .join("|");

        if alternation.is_empty() {
            bail!("At least one ticket project prefix is required");
        }

        let pattern = Regex::new(&format!(r"(?i)({alternation})[^0-9A-Za-z]?([1-9][0-9]*)"))?;
        let strip_pattern =
            Regex::new(&format!(r"(?i)\s*(?:{alternation})[^0-9A-Za-z]?[1-9][0-9]*"))?;

        Ok(Self {
            pattern,
            strip_pattern,
        })
    }

    /// All ticket references in `text`, in scanning order
    pub fn references<'a>(&'a self, text: &'a str) -> impl Iterator<Item = TicketRef<'a>> + 'a {
        self.pattern.captures_iter(text).filter_map(|caps| {
            Some(TicketRef {
                prefix: caps.get(1)?.as_str(),
                number: caps.get(2)?.as_str(),
            })
        })
    }

    /// All normalised ticket keys in `text`, in scanning order
    pub fn keys<'a>(&'a self, text: &'a str) -> impl Iterator<Item = TicketKey> + 'a {
        self.references(text).map(|reference| reference.key())
    }

    /// The first ticket mentioned in `text`, if any
    pub fn first_key(&self, text: &str) -> Option<TicketKey> {
        self.keys(text).next()
    }

    /// Removes every ticket reference (and the whitespace directly in front
    /// of it) from `line`, then trims the result.
    pub fn strip(&self, line: &str) -> String {
        self.strip_pattern.replace_all(line, "").trim().to_string()
    }
}

impl Default for TicketMatcher {
    fn default() -> Self {
        Self::new(DEFAULT_PROJECT_PREFIXES).expect("default ticket prefixes form a valid pattern")
    }
}
