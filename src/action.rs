//! The announcements the bot can make

use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// A release pull request was opened: post the changelog
    NewRelease,
    /// The release pull request is being deployed
    DeployStart,
    /// The deployment has finished
    DeployComplete,
}

impl Action {
    pub const ALL: &'static [Action] = &[Self::NewRelease, Self::DeployStart, Self::DeployComplete];

    /// Name as passed on the command line or in the workflow input
    pub const fn name(&self) -> &'static str {
        match self {
            Self::NewRelease => "new-release",
            Self::DeployStart => "deploy-start",
            Self::DeployComplete => "deploy-complete",
        }
    }
}

impl FromStr for Action {
    type Err = ActionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim();
        Self::ALL
            .iter()
            .find(|action| action.name() == normalized)
            .copied()
            .ok_or_else(|| ActionError::Unknown(s.to_string()))
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ActionError {
    #[error("Invalid action {0}")]
    Unknown(String),
    #[error("Cannot read a pull request number from ref '{0}'")]
    InvalidRef(String),
}

/// Extracts the pull request number from a ref such as `refs/pull/42/merge`
pub fn pr_number_from_ref(git_ref: &str) -> Result<u64, ActionError> {
    git_ref
        .split('/')
        .nth(2)
        .and_then(|segment| segment.parse().ok())
        .ok_or_else(|| ActionError::InvalidRef(git_ref.to_string()))
}
