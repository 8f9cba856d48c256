//! Ticket lifecycle manager
//!
//! Owns every status and priority change after a ticket is created, the
//! SLA reading for live tickets, and the auto-close sweep.
//!
//! Auto-close is evaluated from the ticket's current status and age on
//! each sweep. There is no stored timer, so re-opening a Resolved ticket
//! is enough to cancel a pending close.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::sla::{compute_sla_band, SlaReading};
use super::transition::{IllegalTransition, TransitionPolicy};
use super::types::{Priority, Ticket, TicketId, TicketStatus};
use crate::store::{SharedTicketStore, StoreError};

/// Age since creation after which a Resolved ticket is closed.
pub const AUTO_CLOSE_AFTER_HOURS: i64 = 24;

/// Error type for lifecycle operations
#[derive(Debug, thiserror::Error)]
pub enum LifecycleError {
    #[error("Ticket not found: TK{0:06}")]
    TicketNotFound(TicketId),

    #[error(transparent)]
    IllegalTransition(#[from] IllegalTransition),

    #[error("Store error: {0}")]
    Store(StoreError),
}

impl From<StoreError> for LifecycleError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => Self::TicketNotFound(id),
            other => Self::Store(other),
        }
    }
}

/// Result type for lifecycle operations
pub type LifecycleResult<T> = Result<T, LifecycleError>;

/// Who asked for a status change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeOrigin {
    Manual,
    Bulk,
    AutoClose,
}

impl std::fmt::Display for ChangeOrigin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Manual => write!(f, "manual"),
            Self::Bulk => write!(f, "bulk"),
            Self::AutoClose => write!(f, "auto_close"),
        }
    }
}

/// A status change that was applied
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusChange {
    pub ticket_id: TicketId,
    pub from: TicketStatus,
    pub to: TicketStatus,
    pub origin: ChangeOrigin,
    pub at: DateTime<Utc>,
}

/// A priority change that was applied
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriorityChange {
    pub ticket_id: TicketId,
    pub from: Priority,
    pub to: Priority,
    pub at: DateTime<Utc>,
}

/// A ticket the sweep tried and failed to close
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepFailure {
    pub ticket_id: TicketId,
    pub error: String,
}

/// Result of one auto-close sweep
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SweepReport {
    /// Resolved tickets looked at
    pub examined: usize,
    pub closed: Vec<StatusChange>,
    pub failures: Vec<SweepFailure>,
}

impl SweepReport {
    pub fn closed_count(&self) -> usize {
        self.closed.len()
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Status state machine over a shared store.
#[derive(Clone)]
pub struct TicketLifecycleManager {
    store: SharedTicketStore,
    policy: TransitionPolicy,
}

impl TicketLifecycleManager {
    pub fn new(store: SharedTicketStore, policy: TransitionPolicy) -> Self {
        Self { store, policy }
    }

    pub fn policy(&self) -> TransitionPolicy {
        self.policy
    }

    /// Set a ticket's status as support staff.
    pub fn update_status(
        &self,
        id: TicketId,
        status: TicketStatus,
    ) -> LifecycleResult<StatusChange> {
        self.apply_status(id, status, ChangeOrigin::Manual, Utc::now())
    }

    pub(crate) fn apply_status(
        &self,
        id: TicketId,
        status: TicketStatus,
        origin: ChangeOrigin,
        at: DateTime<Utc>,
    ) -> LifecycleResult<StatusChange> {
        if self.policy == TransitionPolicy::Guarded {
            let current = self.store.get_ticket(id)?.status;
            self.policy.check(current, status)?;
        }
        let from = self.store.update_status(id, status)?;
        if from != status {
            info!(ticket_id = id, from = %from, to = %status, origin = %origin, "Ticket status changed");
        }
        Ok(StatusChange {
            ticket_id: id,
            from,
            to: status,
            origin,
            at,
        })
    }

    /// Override a ticket's priority. Independent of status.
    pub fn update_priority(
        &self,
        id: TicketId,
        priority: Priority,
    ) -> LifecycleResult<PriorityChange> {
        let from = self.store.update_priority(id, priority)?;
        if from != priority {
            info!(ticket_id = id, from = %from, to = %priority, "Ticket priority changed");
        }
        Ok(PriorityChange {
            ticket_id: id,
            from,
            to: priority,
            at: Utc::now(),
        })
    }

    pub fn compute_sla_band(created_at: DateTime<Utc>, now: DateTime<Utc>) -> SlaReading {
        compute_sla_band(created_at, now)
    }

    pub fn sla_for(ticket: &Ticket, now: DateTime<Utc>) -> SlaReading {
        compute_sla_band(ticket.created_at, now)
    }

    /// Resolved and at least 24h old, measured from creation.
    pub fn is_due_for_auto_close(ticket: &Ticket, now: DateTime<Utc>) -> bool {
        ticket.status == TicketStatus::Resolved
            && now - ticket.created_at >= Duration::hours(AUTO_CLOSE_AFTER_HOURS)
    }

    /// Close every Resolved ticket that is due.
    ///
    /// Fails only if the ticket list cannot be read. A ticket that cannot
    /// be closed is recorded in the report and the sweep moves on. Running
    /// it again with the same `now` closes nothing.
    pub fn sweep(&self, now: DateTime<Utc>) -> LifecycleResult<SweepReport> {
        let tickets = self.store.get_tickets(None)?;
        let mut report = SweepReport::default();

        for ticket in tickets
            .iter()
            .filter(|t| t.status == TicketStatus::Resolved)
        {
            report.examined += 1;
            if !Self::is_due_for_auto_close(ticket, now) {
                continue;
            }
            match self.apply_status(ticket.id, TicketStatus::Closed, ChangeOrigin::AutoClose, now) {
                Ok(change) => report.closed.push(change),
                Err(e) => {
                    warn!(ticket_id = ticket.id, error = %e, "Auto-close failed");
                    report.failures.push(SweepFailure {
                        ticket_id: ticket.id,
                        error: e.to_string(),
                    });
                }
            }
        }

        if !report.closed.is_empty() || !report.failures.is_empty() {
            info!(
                examined = report.examined,
                closed = report.closed.len(),
                failed = report.failures.len(),
                "Auto-close sweep finished"
            );
        }
        Ok(report)
    }

    pub fn sweep_now(&self) -> LifecycleResult<SweepReport> {
        self.sweep(Utc::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::Category;
    use crate::store::InMemoryTicketStore;
    use crate::ticket::NewTicket;
    use crate::ticket::SlaBand;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 2, 12, 0, 0).unwrap()
    }

    fn create(store: &SharedTicketStore, age: Duration, status: TicketStatus) -> TicketId {
        let t = store
            .create_ticket(NewTicket {
                user_id: "u1".to_string(),
                user_name: "User".to_string(),
                title: "Laptop".to_string(),
                description: "Laptop will not boot".to_string(),
                category: Category::Hardware,
                priority: Priority::Standard,
                created_at: now() - age,
            })
            .unwrap();
        store.update_status(t.id, status).unwrap();
        t.id
    }

    fn manager(policy: TransitionPolicy) -> (SharedTicketStore, TicketLifecycleManager) {
        let store = InMemoryTicketStore::new().shared();
        (store.clone(), TicketLifecycleManager::new(store, policy))
    }

    #[test]
    fn test_override_allows_any_move() {
        let (store, mgr) = manager(TransitionPolicy::Override);
        let id = create(&store, Duration::hours(1), TicketStatus::Closed);
        let change = mgr.update_status(id, TicketStatus::Open).unwrap();
        assert_eq!(change.from, TicketStatus::Closed);
        assert_eq!(change.to, TicketStatus::Open);
        assert_eq!(change.origin, ChangeOrigin::Manual);
        assert_eq!(store.get_ticket(id).unwrap().status, TicketStatus::Open);
    }

    #[test]
    fn test_guarded_rejects_leaving_closed() {
        let (store, mgr) = manager(TransitionPolicy::Guarded);
        let id = create(&store, Duration::hours(1), TicketStatus::Closed);
        let err = mgr.update_status(id, TicketStatus::Open).unwrap_err();
        assert!(matches!(err, LifecycleError::IllegalTransition(_)));
        assert_eq!(store.get_ticket(id).unwrap().status, TicketStatus::Closed);
    }

    #[test]
    fn test_update_missing_ticket() {
        let (_, mgr) = manager(TransitionPolicy::Override);
        assert!(matches!(
            mgr.update_status(5, TicketStatus::Resolved),
            Err(LifecycleError::TicketNotFound(5))
        ));
        assert!(matches!(
            mgr.update_priority(5, Priority::High),
            Err(LifecycleError::TicketNotFound(5))
        ));
    }

    #[test]
    fn test_priority_independent_of_status() {
        let (store, mgr) = manager(TransitionPolicy::Guarded);
        let id = create(&store, Duration::hours(1), TicketStatus::Closed);
        let change = mgr.update_priority(id, Priority::Critical).unwrap();
        assert_eq!(change.from, Priority::Standard);
        let t = store.get_ticket(id).unwrap();
        assert_eq!(t.priority, Priority::Critical);
        assert_eq!(t.status, TicketStatus::Closed);
    }

    #[test]
    fn test_sweep_closes_only_due_resolved() {
        let (store, mgr) = manager(TransitionPolicy::Override);
        let due = create(&store, Duration::hours(25), TicketStatus::Resolved);
        let exact = create(&store, Duration::hours(24), TicketStatus::Resolved);
        let young = create(&store, Duration::hours(23), TicketStatus::Resolved);
        let old_open = create(&store, Duration::hours(48), TicketStatus::Open);
        let old_progress = create(&store, Duration::hours(48), TicketStatus::InProgress);

        let report = mgr.sweep(now()).unwrap();
        assert_eq!(report.examined, 3);
        let closed: Vec<_> = report.closed.iter().map(|c| c.ticket_id).collect();
        assert_eq!(closed, vec![due, exact]);
        assert!(report.closed.iter().all(|c| c.origin == ChangeOrigin::AutoClose));
        assert!(report.is_clean());

        assert_eq!(store.get_ticket(young).unwrap().status, TicketStatus::Resolved);
        assert_eq!(store.get_ticket(old_open).unwrap().status, TicketStatus::Open);
        assert_eq!(
            store.get_ticket(old_progress).unwrap().status,
            TicketStatus::InProgress
        );
    }

    #[test]
    fn test_sweep_is_idempotent() {
        let (store, mgr) = manager(TransitionPolicy::Override);
        create(&store, Duration::hours(30), TicketStatus::Resolved);
        assert_eq!(mgr.sweep(now()).unwrap().closed_count(), 1);
        let second = mgr.sweep(now()).unwrap();
        assert_eq!(second.closed_count(), 0);
        assert_eq!(second.examined, 0);
    }

    #[test]
    fn test_reopen_cancels_auto_close() {
        let (store, mgr) = manager(TransitionPolicy::Guarded);
        let id = create(&store, Duration::hours(30), TicketStatus::Resolved);
        mgr.update_status(id, TicketStatus::InProgress).unwrap();
        assert_eq!(mgr.sweep(now()).unwrap().closed_count(), 0);
        assert_eq!(store.get_ticket(id).unwrap().status, TicketStatus::InProgress);
    }

    #[test]
    fn test_future_created_never_due() {
        let (store, mgr) = manager(TransitionPolicy::Override);
        let id = create(&store, Duration::hours(-5), TicketStatus::Resolved);
        assert_eq!(mgr.sweep(now()).unwrap().closed_count(), 0);
        let ticket = store.get_ticket(id).unwrap();
        let reading = TicketLifecycleManager::sla_for(&ticket, now());
        assert_eq!(reading.band, SlaBand::OnTrack);
        assert_eq!(reading.hours_open, 0.0);
    }

    #[test]
    fn test_sla_ignores_status() {
        let (store, _) = manager(TransitionPolicy::Override);
        let id = create(&store, Duration::hours(7), TicketStatus::Closed);
        let ticket = store.get_ticket(id).unwrap();
        assert_eq!(
            TicketLifecycleManager::sla_for(&ticket, now()).band,
            SlaBand::Breached
        );
    }
}
