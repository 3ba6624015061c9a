use super::ticket::TicketKey;
use std::collections::HashMap;
use std::fmt;

/// Key used for commits that do not mention any ticket
pub const OTHER_KEY: &str = "other";

/// Summary given to the bucket of commits without a ticket
pub const OTHER_SUMMARY: &str = "Miscellaneous Changes";

/// Status given to the bucket of commits without a ticket
pub const OTHER_STATUS: &str = "Unknown";

/// A single commit from the pull request history
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commit {
    pub message: String,
}

impl Commit {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Identifies the bucket a commit is counted against
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ChangeKey {
    Ticket(TicketKey),
    Other,
}

impl ChangeKey {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Ticket(key) => key.as_str(),
            Self::Other => OTHER_KEY,
        }
    }

    pub const fn is_other(&self) -> bool {
        matches!(self, Self::Other)
    }
}

impl fmt::Display for ChangeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<TicketKey> for ChangeKey {
    fn from(key: TicketKey) -> Self {
        Self::Ticket(key)
    }
}

/// Everything known about one ticket (or the "other" bucket) in a release
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Change {
    pub ticket: ChangeKey,
    /// Ticket title from the issue tracker, empty until enriched
    pub summary: String,
    /// Ticket workflow status from the issue tracker, empty until enriched
    pub status: String,
    /// Number of commits whose first ticket reference is this ticket
    pub commits: usize,
    /// Cleaned description lines, taken from the first commit for this ticket
    pub message: Vec<String>,
    /// Pull request numbers found in merge commit messages
    pub prs: Vec<String>,
}

impl Change {
    pub fn new(ticket: ChangeKey) -> Self {
        Self {
            ticket,
            summary: String::new(),
            status: String::new(),
            commits: 0,
            message: Vec::new(),
            prs: Vec::new(),
        }
    }
}

/// Changes keyed by the ticket they belong to
pub type ChangeMap = HashMap<ChangeKey, Change>;
