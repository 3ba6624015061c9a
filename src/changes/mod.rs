//! Commit history to changelog reduction
//!
//! Commits are grouped by the ticket they reference, enriched with tracker
//! metadata, ordered, and rendered for the pull request body and the release
//! announcement.

mod aggregate;
mod changelog;
mod classifier;
mod models;
mod ticket;

pub use aggregate::{TicketDetails, TicketSource, add_ticket_details, sort_changes_by_size};
pub use changelog::{generate_changelog, unique_in_order};
pub use classifier::{CommitDetails, extract_details, group_history_as_changes};
pub use models::{
    Change, ChangeKey, ChangeMap, Commit, OTHER_KEY, OTHER_STATUS, OTHER_SUMMARY,
};
pub use ticket::{DEFAULT_PROJECT_PREFIXES, TicketKey, TicketMatcher, TicketRef};
