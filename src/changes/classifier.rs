//! Groups a pull request's commit history by ticket
//!
//! Each commit is counted against the first ticket its message mentions, or
//! against the "other" bucket when it mentions none. The first commit seen for
//! a ticket also provides that ticket's description lines, cleaned of ticket
//! keys, merge boilerplate and GitHub's truncated subject lines.

use super::models::{Change, ChangeKey, ChangeMap, Commit};
use super::ticket::TicketMatcher;
use crate::log_debug;
use regex::Regex;
use std::sync::LazyLock;

static PR_MERGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^Merge pull request #([1-9][0-9]*)").expect("Failed to compile PR merge regex")
});

static BRANCH_MERGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^Merge branch '[^' ]+' into").expect("Failed to compile branch merge regex")
});

/// Marker GitHub appends when it shortens a commit subject
const TRUNCATION_MARKER: char = '…';

/// Bullets removed from a truncated line before looking up its full form
const TRUNCATED_BULLETS: &[char] = &['#', '-', '*'];

/// Bullets removed from the start of a new description line
const LINE_BULLETS: &[char] = &['#', '-', '*', ':'];

/// Description lines and pull request numbers taken from one commit message
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommitDetails {
    pub lines: Vec<String>,
    pub prs: Vec<String>,
}

/// Folds the commit history into one [`Change`] per ticket.
///
/// Commits must be supplied in history order; line repair and "first commit
/// wins" both depend on it.
pub fn group_history_as_changes<'a, I>(history: I, matcher: &TicketMatcher) -> ChangeMap
where
    I: IntoIterator<Item = &'a Commit>,
{
    let mut changes = ChangeMap::new();

    for commit in history {
        let key = matcher
            .first_key(&commit.message)
            .map_or(ChangeKey::Other, ChangeKey::Ticket);
        process_commit(&mut changes, key, &commit.message, matcher);
    }

    log_debug!("Grouped commit history into {} changes", changes.len());
    changes
}

fn process_commit(changes: &mut ChangeMap, key: ChangeKey, message: &str, matcher: &TicketMatcher) {
    let is_new = !changes.contains_key(&key);
    let change = changes
        .entry(key)
        .or_insert_with_key(|key| Change::new(key.clone()));

    change.commits += 1;

    if !is_new {
        return;
    }

    let details = extract_details(message, matcher, &change.message);
    change.message.extend(details.lines);

    // Merge commits without a ticket are noise; their PR numbers are dropped
    if !change.ticket.is_other() {
        change.prs.extend(details.prs);
    }
}

/// Cleans a commit message into description lines.
///
/// `existing` holds lines already recorded for the ticket; they are used,
/// together with lines emitted earlier in this message, to restore subjects
/// that GitHub truncated with an ellipsis.
pub fn extract_details(message: &str, matcher: &TicketMatcher, existing: &[String]) -> CommitDetails {
    let mut details = CommitDetails::default();
    let mut continuable = false;

    for raw_line in message.lines() {
        let mut line = matcher.strip(raw_line);

        // A blank line ends any paragraph that could otherwise be continued
        if line.is_empty() {
            continuable = false;
            continue;
        }

        if let Some(caps) = PR_MERGE_RE.captures(&line) {
            details.prs.push(caps[1].to_string());
            continue;
        }

        if BRANCH_MERGE_RE.is_match(&line) {
            continue;
        }

        if let Some(full_line) = repair_truncated(&line, existing, &details.lines) {
            line = full_line;
        }

        if continuable
            && starts_with_alphanumeric(&line)
            && let Some(previous) = details.lines.last_mut()
        {
            previous.push(' ');
            previous.push_str(&line);
            continue;
        }

        details.lines.push(strip_bullet(&line, LINE_BULLETS).trim().to_string());
        continuable = true;
    }

    details
}

/// Finds the full form of a line ending in the truncation marker
fn repair_truncated(line: &str, existing: &[String], emitted: &[String]) -> Option<String> {
    let truncated = line.strip_suffix(TRUNCATION_MARKER)?;
    let prefix = strip_bullet(truncated, TRUNCATED_BULLETS).trim();

    existing
        .iter()
        .chain(emitted)
        .find(|candidate| candidate.starts_with(prefix))
        .cloned()
}

fn strip_bullet<'a>(line: &'a str, bullets: &[char]) -> &'a str {
    line.strip_prefix(|c: char| bullets.contains(&c))
        .unwrap_or(line)
}

fn starts_with_alphanumeric(line: &str) -> bool {
    line.chars().next().is_some_and(|c| c.is_ascii_alphanumeric())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::changes::ticket::TicketKey;

    fn details(message: &str) -> CommitDetails {
        extract_details(message, &TicketMatcher::default(), &[])
    }

    fn ticket(key: &str) -> ChangeKey {
        let (prefix, number) = key.split_once('-').expect("test keys contain a hyphen");
        ChangeKey::Ticket(TicketKey::from_parts(prefix, number))
    }

    #[test]
    fn test_strips_ticket_references_and_joins_continuations() {
        let result = details("Fixes FR-12: Button broken\nFR-12 now works");
        assert_eq!(result.lines, vec!["Fixes: Button broken now works"]);
        assert!(result.prs.is_empty());
    }

    #[test]
    fn test_blank_line_prevents_continuation() {
        let result = details("Add login form\n\nvalidate email addresses");
        assert_eq!(result.lines, vec!["Add login form", "validate email addresses"]);
    }

    #[test]
    fn test_bulleted_lines_start_new_entries() {
        let result = details("Tidy up\n- remove dead code\n* rename module\n: colon bullet");
        assert_eq!(
            result.lines,
            vec!["Tidy up", "remove dead code", "rename module", "colon bullet"]
        );
    }

    #[test]
    fn test_merge_boilerplate_is_discarded() {
        let result = details(
            "Merge pull request #42 from org/WL-5-feature\n\nMerge branch 'main' into feature\n\nWL-5 Add caching",
        );
        assert_eq!(result.prs, vec!["42"]);
        assert_eq!(result.lines, vec!["Add caching"]);
    }

    #[test]
    fn test_truncated_line_is_repaired_from_earlier_line() {
        let result = details("Improve search ranking for long queries\n\n- Improve search ranking…");
        assert_eq!(
            result.lines,
            vec![
                "Improve search ranking for long queries",
                "Improve search ranking for long queries"
            ]
        );
    }

    #[test]
    fn test_truncated_line_is_repaired_from_existing_lines() {
        let existing = vec!["Rework the checkout flow entirely".to_string()];
        let result = extract_details(
            "# Rework the checkout…",
            &TicketMatcher::default(),
            &existing,
        );
        assert_eq!(result.lines, vec!["Rework the checkout flow entirely"]);
    }

    #[test]
    fn test_unmatched_truncated_line_is_kept() {
        let result = details("Something else…");
        assert_eq!(result.lines, vec!["Something else…"]);
    }

    #[test]
    fn test_every_commit_is_counted_once() {
        let history = vec![
            Commit::new("FR-1 first"),
            Commit::new("FR-1 second, see also WL-2"),
            Commit::new("WL-2 third"),
            Commit::new("no ticket"),
            Commit::new("also no ticket"),
        ];
        let changes = group_history_as_changes(&history, &TicketMatcher::default());

        let total: usize = changes.values().map(|change| change.commits).sum();
        assert_eq!(total, history.len());
        assert_eq!(changes[&ticket("FR-1")].commits, 2);
        assert_eq!(changes[&ticket("WL-2")].commits, 1);
        assert_eq!(changes[&ChangeKey::Other].commits, 2);
    }

    #[test]
    fn test_first_commit_wins_description() {
        let history = vec![
            Commit::new("REV-7 fix thing"),
            Commit::new("REV-7 follow-up tweak"),
        ];
        let changes = group_history_as_changes(&history, &TicketMatcher::default());
        let change = &changes[&ticket("REV-7")];
        assert_eq!(change.commits, 2);
        assert_eq!(change.message, vec!["fix thing"]);
    }

    #[test]
    fn test_merge_without_ticket_lands_in_other_without_detail() {
        let history = vec![
            Commit::new("Merge pull request #42 from x"),
            Commit::new("REV-7 fix thing"),
        ];
        let changes = group_history_as_changes(&history, &TicketMatcher::default());

        let other = &changes[&ChangeKey::Other];
        assert_eq!(other.commits, 1);
        assert!(other.message.is_empty());
        assert!(other.prs.is_empty());

        let rev = &changes[&ticket("REV-7")];
        assert_eq!(rev.message, vec!["fix thing"]);
        assert!(rev.prs.is_empty());
    }

    #[test]
    fn test_pr_numbers_recorded_for_ticket_merges() {
        let history = vec![Commit::new(
            "Merge pull request #108 from org/MVC-3801-menu\n\nMVC-3801 New menu",
        )];
        let changes = group_history_as_changes(&history, &TicketMatcher::default());
        let change = &changes[&ticket("MVC-3801")];
        assert_eq!(change.prs, vec!["108"]);
        assert_eq!(change.message, vec!["New menu"]);
    }

    #[test]
    fn test_empty_history_produces_no_changes() {
        let changes = group_history_as_changes(&Vec::<Commit>::new(), &TicketMatcher::default());
        assert!(changes.is_empty());
    }
}
