//! Ticket persistence
//!
//! The engine never talks to a database directly. Everything goes through
//! [`TicketStore`], which is synchronous and takes `&self` so one store can
//! be shared behind an `Arc` by the lifecycle manager, the bulk
//! coordinator and the feedback recorder at once.

pub mod memory;

use std::sync::Arc;

use crate::comment::TicketComment;
use crate::feedback::{ExperienceFeedback, FeedbackRecord};
use crate::ticket::{NewTicket, Priority, Ticket, TicketId, TicketStatus};

pub use memory::{InMemoryTicketStore, StoreSnapshot};

/// Error type for store operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Ticket not found: TK{0:06}")]
    NotFound(TicketId),

    #[error("Lock poisoned")]
    LockPoisoned,

    #[error("Store backend error: {0}")]
    Backend(String),
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Shared reference to a ticket store
pub type SharedTicketStore = Arc<dyn TicketStore>;

/// Persistence collaborator for tickets, feedback and comments.
///
/// Lookups by id return [`StoreError::NotFound`] when the ticket does not
/// exist. Mutations are atomic per ticket; there are no multi-ticket
/// transactions.
pub trait TicketStore: Send + Sync {
    /// Insert a ticket and assign it the next id. New tickets are `Open`.
    fn create_ticket(&self, ticket: NewTicket) -> StoreResult<Ticket>;

    fn get_ticket(&self, id: TicketId) -> StoreResult<Ticket>;

    /// All tickets in ascending id order, optionally only one owner's.
    fn get_tickets(&self, owner: Option<&str>) -> StoreResult<Vec<Ticket>>;

    /// Set the status and return the previous one.
    fn update_status(&self, id: TicketId, status: TicketStatus) -> StoreResult<TicketStatus>;

    /// Set the priority and return the previous one.
    fn update_priority(&self, id: TicketId, priority: Priority) -> StoreResult<Priority>;

    /// Remove a ticket and its comments, returning the removed ticket.
    fn delete_ticket(&self, id: TicketId) -> StoreResult<Ticket>;

    fn record_feedback(&self, record: FeedbackRecord) -> StoreResult<()>;

    /// Feedback in insertion order.
    fn list_feedback(&self) -> StoreResult<Vec<FeedbackRecord>>;

    fn record_experience(&self, feedback: ExperienceFeedback) -> StoreResult<()>;

    /// Experience feedback in insertion order.
    fn list_experience(&self) -> StoreResult<Vec<ExperienceFeedback>>;

    fn add_comment(&self, comment: TicketComment) -> StoreResult<()>;

    /// Comments on one ticket, oldest first.
    fn list_comments(&self, ticket_id: TicketId) -> StoreResult<Vec<TicketComment>>;
}
