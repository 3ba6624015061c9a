//! Plain-text changelog written to the pull request body

use super::models::Change;
use std::collections::HashSet;
use std::fmt::Write;
use std::hash::Hash;

/// Removes repeated items, keeping the first occurrence of each
pub fn unique_in_order<T, I>(items: I) -> Vec<T>
where
    I: IntoIterator<Item = T>,
    T: Eq + Hash + Clone,
{
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.clone()))
        .collect()
}

/// Renders ordered changes as the changelog body.
///
/// Each ticket gets a header line with its summary and references, followed
/// by its description lines. Lines from commits without a ticket are listed
/// as plain bullets.
pub fn generate_changelog(changes: &[Change]) -> String {
    let mut changelog = String::new();

    for change in changes {
        let lines = unique_in_order(change.message.iter().map(String::as_str));

        if change.ticket.is_other() {
            for line in lines {
                let _ = writeln!(changelog, "* {line}");
            }
            continue;
        }

        let references = std::iter::once(change.ticket.as_str())
            .chain(change.prs.iter().map(String::as_str))
            .map(|reference| format!("PR#{reference}"))
            .collect::<Vec<_>>()
            .join(" ");

        let _ = writeln!(changelog, "* {}: [{}]", change.summary, references);
        for line in lines {
            let _ = writeln!(changelog, "  - {line}");
        }
        changelog.push('\n');
    }

    changelog.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::changes::models::ChangeKey;
    use crate::changes::ticket::TicketKey;

    fn ticket_change(prefix: &str, number: &str, summary: &str, lines: &[&str], prs: &[&str]) -> Change {
        let mut change = Change::new(ChangeKey::Ticket(TicketKey::from_parts(prefix, number)));
        change.commits = 1;
        change.summary = summary.to_string();
        change.message = lines.iter().map(ToString::to_string).collect();
        change.prs = prs.iter().map(ToString::to_string).collect();
        change
    }

    #[test]
    fn test_unique_in_order_keeps_first_occurrence() {
        assert_eq!(unique_in_order(["b", "a", "b", "c", "a"]), vec!["b", "a", "c"]);
        assert!(unique_in_order(Vec::<String>::new()).is_empty());
    }

    #[test]
    fn test_renders_ticket_blocks_and_other_bullets() {
        let mut other = Change::new(ChangeKey::Other);
        other.commits = 2;
        other.message = vec!["Bump dependencies".to_string(), "Fix typo".to_string()];

        let changes = vec![
            ticket_change("FR", "12", "Checkout button", &["Fix button", "Add test"], &["42", "43"]),
            ticket_change("WL", "5", "", &["Cache results"], &[]),
            other,
        ];

        let expected = "\
* Checkout button: [PR#FR-12 PR#42 PR#43]
  - Fix button
  - Add test

* : [PR#WL-5]
  - Cache results

* Bump dependencies
* Fix typo";

        assert_eq!(generate_changelog(&changes), expected);
    }

    #[test]
    fn test_repeated_lines_render_once() {
        let changes = vec![ticket_change(
            "REV",
            "7",
            "Search",
            &["Improve ranking", "Add index", "Improve ranking"],
            &[],
        )];
        assert_eq!(
            generate_changelog(&changes),
            "* Search: [PR#REV-7]\n  - Improve ranking\n  - Add index"
        );
    }

    #[test]
    fn test_rendering_does_not_modify_changes() {
        let changes = vec![ticket_change("OPS", "3", "Deploys", &["Retry"], &["9"])];
        let before = changes.clone();
        let first = generate_changelog(&changes);
        let second = generate_changelog(&changes);
        assert_eq!(first, second);
        assert_eq!(changes, before);
    }

    #[test]
    fn test_empty_changes_render_empty_changelog() {
        assert_eq!(generate_changelog(&[]), "");
    }
}
