//! Enrichment and ordering of grouped changes

use super::models::{Change, ChangeKey, ChangeMap, OTHER_STATUS, OTHER_SUMMARY};
use super::ticket::TicketKey;
use crate::{log_debug, log_warn};
use anyhow::Result;
use async_trait::async_trait;
use futures::future::join_all;
use std::cmp::Ordering;

/// Ticket metadata shown next to a change
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TicketDetails {
    pub summary: String,
    pub status: String,
}

/// Source of live ticket metadata, normally the issue tracker
#[async_trait]
pub trait TicketSource: Send + Sync {
    /// Looks up a ticket; `Ok(None)` means the tracker has no data for it
    async fn fetch_ticket(&self, key: &TicketKey) -> Result<Option<TicketDetails>>;
}

/// Fills in summary and status for every change.
///
/// Lookups run in batches of `batch_size` concurrent requests. A failed lookup
/// leaves that change with empty metadata and never affects the others.
/// Returns the number of lookups that failed.
pub async fn add_ticket_details(
    changes: &mut ChangeMap,
    source: &dyn TicketSource,
    batch_size: usize,
) -> usize {
    let mut keys = Vec::new();
    let mut failed = 0;

    for change in changes.values_mut() {
        match &change.ticket {
            ChangeKey::Other => {
                change.summary = OTHER_SUMMARY.to_string();
                change.status = OTHER_STATUS.to_string();
            }
            ChangeKey::Ticket(key) => keys.push(key.clone()),
        }
    }

    keys.sort();
    log_debug!("Looking up {} tickets", keys.len());

    for chunk in keys.chunks(batch_size.max(1)) {
        let lookups = chunk
            .iter()
            .map(|key| async move { (key, source.fetch_ticket(key).await) });

        for (key, result) in join_all(lookups).await {
            match result {
                Ok(Some(details)) => {
                    if let Some(change) = changes.get_mut(&ChangeKey::Ticket(key.clone())) {
                        change.summary = details.summary;
                        change.status = details.status;
                    }
                }
                Ok(None) => log_debug!("No ticket data available for {}", key),
                Err(e) => {
                    log_warn!("Failed to look up ticket {}: {:#}", key, e);
                    failed += 1;
                }
            }
        }
    }

    failed
}

/// Orders changes for presentation.
///
/// Changes with more description lines come first, equal counts are ordered
/// by ticket key, and the "other" bucket always comes last.
pub fn sort_changes_by_size(changes: ChangeMap) -> Vec<Change> {
    let mut changes: Vec<Change> = changes.into_values().collect();
    changes.sort_by(compare_for_presentation);
    changes
}

fn compare_for_presentation(a: &Change, b: &Change) -> Ordering {
    a.ticket
        .is_other()
        .cmp(&b.ticket.is_other())
        .then_with(|| b.message.len().cmp(&a.message.len()))
        .then_with(|| a.ticket.as_str().cmp(b.ticket.as_str()))
}
