//! Ticket model and lifecycle
//!
//! - [`types`]: ids, references, status and priority
//! - [`transition`]: override vs guarded status policy
//! - [`sla`]: age-since-creation banding
//! - [`lifecycle`]: status/priority updates and the auto-close sweep
//! - [`query`]: search filters, lookup by reference and dashboard counts

pub mod lifecycle;
pub mod query;
pub mod sla;
pub mod transition;
pub mod types;

pub use lifecycle::{
    ChangeOrigin, LifecycleError, LifecycleResult, PriorityChange, StatusChange, SweepFailure,
    SweepReport, TicketLifecycleManager, AUTO_CLOSE_AFTER_HOURS,
};
pub use query::{TicketLookup, TicketQuery, TicketSummary};
pub use sla::{
    compute_sla_band, hours_open, SlaBand, SlaReading, BREACHED_AFTER_HOURS, WARNING_AFTER_HOURS,
};
pub use transition::{IllegalTransition, TransitionPolicy};
pub use types::{
    parse_ticket_ref, ticket_ref, NewTicket, Priority, Ticket, TicketId, TicketStatus,
    TICKET_REF_PREFIX,
};
