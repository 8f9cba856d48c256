//! In-memory ticket store
//!
//! All state lives in one [`StoreSnapshot`] behind a `RwLock`. The snapshot
//! is serializable so file-backed stores can persist it wholesale.

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{SharedTicketStore, StoreError, StoreResult, TicketStore};
use crate::comment::TicketComment;
use crate::feedback::{ExperienceFeedback, FeedbackRecord};
use crate::ticket::{NewTicket, Priority, Ticket, TicketId, TicketStatus};

/// Complete store contents
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreSnapshot {
    /// Id the next created ticket receives; ids are never reused
    pub next_id: TicketId,
    #[serde(default)]
    pub tickets: BTreeMap<TicketId, Ticket>,
    #[serde(default)]
    pub feedback: Vec<FeedbackRecord>,
    #[serde(default)]
    pub comments: Vec<TicketComment>,
    #[serde(default)]
    pub experience: Vec<ExperienceFeedback>,
}

impl Default for StoreSnapshot {
    fn default() -> Self {
        Self {
            next_id: 1,
            tickets: BTreeMap::new(),
            feedback: Vec::new(),
            comments: Vec::new(),
            experience: Vec::new(),
        }
    }
}

#[derive(Debug, Default)]
pub struct InMemoryTicketStore {
    state: RwLock<StoreSnapshot>,
}

impl InMemoryTicketStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restore from a previously taken snapshot.
    pub fn from_snapshot(mut snapshot: StoreSnapshot) -> Self {
        // A hand-edited file may carry a stale counter.
        let floor = snapshot.tickets.keys().next_back().map_or(1, |id| id + 1);
        snapshot.next_id = snapshot.next_id.max(floor);
        Self {
            state: RwLock::new(snapshot),
        }
    }

    pub fn snapshot(&self) -> StoreResult<StoreSnapshot> {
        Ok(self.read()?.clone())
    }

    /// Replace the whole contents, e.g. to undo a mutation that could not
    /// be persisted.
    pub fn restore(&self, snapshot: StoreSnapshot) -> StoreResult<()> {
        *self.write()? = snapshot;
        Ok(())
    }

    pub fn shared(self) -> SharedTicketStore {
        Arc::new(self)
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, StoreSnapshot>> {
        self.state.read().map_err(|_| StoreError::LockPoisoned)
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, StoreSnapshot>> {
        self.state.write().map_err(|_| StoreError::LockPoisoned)
    }
}

impl TicketStore for InMemoryTicketStore {
    fn create_ticket(&self, ticket: NewTicket) -> StoreResult<Ticket> {
        let mut state = self.write()?;
        let id = state.next_id;
        state.next_id += 1;
        let ticket = ticket.into_ticket(id);
        state.tickets.insert(id, ticket.clone());
        debug!(ticket = %ticket.ticket_ref, category = %ticket.category, "Ticket created");
        Ok(ticket)
    }

    fn get_ticket(&self, id: TicketId) -> StoreResult<Ticket> {
        self.read()?
            .tickets
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound(id))
    }

    fn get_tickets(&self, owner: Option<&str>) -> StoreResult<Vec<Ticket>> {
        let state = self.read()?;
        Ok(state
            .tickets
            .values()
            .filter(|t| owner.map_or(true, |o| t.user_id == o))
            .cloned()
            .collect())
    }

    fn update_status(&self, id: TicketId, status: TicketStatus) -> StoreResult<TicketStatus> {
        let mut state = self.write()?;
        let ticket = state.tickets.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        Ok(std::mem::replace(&mut ticket.status, status))
    }

    fn update_priority(&self, id: TicketId, priority: Priority) -> StoreResult<Priority> {
        let mut state = self.write()?;
        let ticket = state.tickets.get_mut(&id).ok_or(StoreError::NotFound(id))?;
        Ok(std::mem::replace(&mut ticket.priority, priority))
    }

    fn delete_ticket(&self, id: TicketId) -> StoreResult<Ticket> {
        let mut state = self.write()?;
        let ticket = state.tickets.remove(&id).ok_or(StoreError::NotFound(id))?;
        state.comments.retain(|c| c.ticket_id != id);
        Ok(ticket)
    }

    fn record_feedback(&self, record: FeedbackRecord) -> StoreResult<()> {
        self.write()?.feedback.push(record);
        Ok(())
    }

    fn list_feedback(&self) -> StoreResult<Vec<FeedbackRecord>> {
        Ok(self.read()?.feedback.clone())
    }

    fn record_experience(&self, feedback: ExperienceFeedback) -> StoreResult<()> {
        self.write()?.experience.push(feedback);
        Ok(())
    }

    fn list_experience(&self) -> StoreResult<Vec<ExperienceFeedback>> {
        Ok(self.read()?.experience.clone())
    }

    fn add_comment(&self, comment: TicketComment) -> StoreResult<()> {
        let mut state = self.write()?;
        if !state.tickets.contains_key(&comment.ticket_id) {
            return Err(StoreError::NotFound(comment.ticket_id));
        }
        state.comments.push(comment);
        Ok(())
    }

    fn list_comments(&self, ticket_id: TicketId) -> StoreResult<Vec<TicketComment>> {
        Ok(self
            .read()?
            .comments
            .iter()
            .filter(|c| c.ticket_id == ticket_id)
            .cloned()
            .collect())
    }
}
