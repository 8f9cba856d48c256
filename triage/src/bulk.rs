//! Bulk ticket operations
//!
//! Support staff paste comma-separated ids; anything that is not a plain
//! number is dropped rather than rejected. Every remaining id is attempted
//! independently, so a batch never aborts halfway and is never rolled
//! back.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::store::{SharedTicketStore, StoreError};
use crate::ticket::{ChangeOrigin, LifecycleError, TicketId, TicketLifecycleManager, TicketStatus};

/// Ids parsed from operator input
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedIdentifiers {
    /// Valid ids, de-duplicated and ascending
    pub ids: BTreeSet<TicketId>,
    /// Tokens that were not ids, kept for logging only
    pub discarded: Vec<String>,
}

impl ParsedIdentifiers {
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Parse `"1, 2, x, 3"` into `{1, 2, 3}`.
pub fn parse_identifiers(raw: &str) -> ParsedIdentifiers {
    parse_identifier_tokens(raw.split(','))
}

/// Same as [`parse_identifiers`] over pre-split tokens.
pub fn parse_identifier_tokens<I, S>(tokens: I) -> ParsedIdentifiers
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut parsed = ParsedIdentifiers::default();
    for token in tokens {
        let token = token.as_ref().trim();
        if token.is_empty() {
            continue;
        }
        let id = token
            .bytes()
            .all(|b| b.is_ascii_digit())
            .then(|| token.parse::<TicketId>().ok())
            .flatten();
        match id {
            Some(id) => {
                parsed.ids.insert(id);
            }
            None => parsed.discarded.push(token.to_string()),
        }
    }
    if !parsed.discarded.is_empty() {
        debug!(discarded = ?parsed.discarded, "Ignored malformed ticket ids");
    }
    parsed
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "op", content = "status")]
pub enum BulkOperation {
    UpdateStatus(TicketStatus),
    Delete,
}

impl std::fmt::Display for BulkOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UpdateStatus(status) => write!(f, "update_status({status})"),
            Self::Delete => write!(f, "delete"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkFailure {
    pub ticket_id: TicketId,
    pub error: String,
}

/// Per-item and aggregate result of a batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkOutcome {
    pub operation: BulkOperation,
    /// Distinct ids attempted
    pub requested: usize,
    /// Ids actually changed
    pub affected: Vec<TicketId>,
    /// Ids with no ticket
    pub missing: Vec<TicketId>,
    pub failed: Vec<BulkFailure>,
}

impl BulkOutcome {
    fn new(operation: BulkOperation, requested: usize) -> Self {
        Self {
            operation,
            requested,
            affected: Vec::new(),
            missing: Vec::new(),
            failed: Vec::new(),
        }
    }

    pub fn affected_count(&self) -> usize {
        self.affected.len()
    }

    pub fn is_complete(&self) -> bool {
        self.missing.is_empty() && self.failed.is_empty()
    }

    fn finish(self) -> Self {
        info!(
            operation = %self.operation,
            requested = self.requested,
            affected = self.affected.len(),
            missing = self.missing.len(),
            failed = self.failed.len(),
            "Bulk operation finished"
        );
        self
    }
}

/// Best-effort batch status changes and deletions.
#[derive(Clone)]
pub struct BulkOperationCoordinator {
    store: SharedTicketStore,
    lifecycle: TicketLifecycleManager,
}

impl BulkOperationCoordinator {
    pub fn new(store: SharedTicketStore, lifecycle: TicketLifecycleManager) -> Self {
        Self { store, lifecycle }
    }

    /// Set every listed ticket to `status`. Goes through the lifecycle
    /// manager, so a guarded policy applies per ticket.
    pub fn bulk_update_status(
        &self,
        ids: impl IntoIterator<Item = TicketId>,
        status: TicketStatus,
    ) -> BulkOutcome {
        let ids: BTreeSet<TicketId> = ids.into_iter().collect();
        let mut outcome = BulkOutcome::new(BulkOperation::UpdateStatus(status), ids.len());
        let now = chrono::Utc::now();

        for id in ids {
            match self.lifecycle.apply_status(id, status, ChangeOrigin::Bulk, now) {
                Ok(_) => outcome.affected.push(id),
                Err(LifecycleError::TicketNotFound(id)) => {
                    warn!(ticket_id = id, "Bulk status update skipped missing ticket");
                    outcome.missing.push(id);
                }
                Err(e) => {
                    warn!(ticket_id = id, error = %e, "Bulk status update failed");
                    outcome.failed.push(BulkFailure {
                        ticket_id: id,
                        error: e.to_string(),
                    });
                }
            }
        }
        outcome.finish()
    }

    pub fn bulk_delete(&self, ids: impl IntoIterator<Item = TicketId>) -> BulkOutcome {
        let ids: BTreeSet<TicketId> = ids.into_iter().collect();
        let mut outcome = BulkOutcome::new(BulkOperation::Delete, ids.len());

        for id in ids {
            match self.store.delete_ticket(id) {
                Ok(_) => outcome.affected.push(id),
                Err(StoreError::NotFound(id)) => {
                    warn!(ticket_id = id, "Bulk delete skipped missing ticket");
                    outcome.missing.push(id);
                }
                Err(e) => {
                    warn!(ticket_id = id, error = %e, "Bulk delete failed");
                    outcome.failed.push(BulkFailure {
                        ticket_id: id,
                        error: e.to_string(),
                    });
                }
            }
        }
        outcome.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::Category;
    use crate::store::InMemoryTicketStore;
    use crate::ticket::{NewTicket, Priority, TransitionPolicy};
    use chrono::Utc;

    fn setup(n: usize, policy: TransitionPolicy) -> (SharedTicketStore, BulkOperationCoordinator) {
        let store = InMemoryTicketStore::new().shared();
        for i in 0..n {
            store
                .create_ticket(NewTicket {
                    user_id: "u1".to_string(),
                    user_name: "User".to_string(),
                    title: format!("ticket {i}"),
                    description: "Something is not working".to_string(),
                    category: Category::Miscellaneous,
                    priority: Priority::Standard,
                    created_at: Utc::now(),
                })
                .unwrap();
        }
        let lifecycle = TicketLifecycleManager::new(store.clone(), policy);
        (store.clone(), BulkOperationCoordinator::new(store, lifecycle))
    }

    #[test]
    fn test_parse_mixed_tokens() {
        let parsed = parse_identifier_tokens(["1", "2", "x", "3"]);
        assert_eq!(parsed.ids.into_iter().collect::<Vec<_>>(), vec![1, 2, 3]);
        assert_eq!(parsed.discarded, vec!["x".to_string()]);
    }

    #[test]
    fn test_parse_forgiving() {
        let parsed = parse_identifiers(" 7, 3 ,abc, -4, 3, +5, 1.5, , 99999999999999999999999");
        assert_eq!(parsed.ids.into_iter().collect::<Vec<_>>(), vec![3, 7]);
        assert_eq!(parsed.discarded.len(), 5);
    }

    #[test]
    fn test_parse_empty() {
        assert!(parse_identifiers("").is_empty());
        assert!(parse_identifiers(" , ,").is_empty());
    }

    #[test]
    fn test_bulk_status_counts_only_affected() {
        let (store, bulk) = setup(3, TransitionPolicy::Override);
        let outcome = bulk.bulk_update_status([1, 3, 42], TicketStatus::Resolved);
        assert_eq!(outcome.requested, 3);
        assert_eq!(outcome.affected, vec![1, 3]);
        assert_eq!(outcome.affected_count(), 2);
        assert_eq!(outcome.missing, vec![42]);
        assert!(outcome.failed.is_empty());
        assert_eq!(store.get_ticket(1).unwrap().status, TicketStatus::Resolved);
        assert_eq!(store.get_ticket(2).unwrap().status, TicketStatus::Open);
    }

    #[test]
    fn test_bulk_status_guarded_failure_does_not_abort() {
        let (store, bulk) = setup(3, TransitionPolicy::Guarded);
        store.update_status(2, TicketStatus::Closed).unwrap();
        let outcome = bulk.bulk_update_status([1, 2, 3], TicketStatus::Open);
        assert_eq!(outcome.affected, vec![1, 3]);
        assert_eq!(outcome.failed.len(), 1);
        assert_eq!(outcome.failed[0].ticket_id, 2);
        assert!(!outcome.is_complete());
    }

    #[test]
    fn test_bulk_delete() {
        let (store, bulk) = setup(2, TransitionPolicy::Override);
        let outcome = bulk.bulk_delete([2, 2, 5]);
        assert_eq!(outcome.requested, 2);
        assert_eq!(outcome.affected, vec![2]);
        assert_eq!(outcome.missing, vec![5]);
        assert_eq!(store.get_tickets(None).unwrap().len(), 1);

        // Deleting again affects nothing.
        let again = bulk.bulk_delete([2]);
        assert_eq!(again.affected_count(), 0);
        assert_eq!(again.missing, vec![2]);
    }
}
