//! Service Desk Triage Library
//!
//! This library provides:
//! - Ensemble triage of free-text incident reports from two classifiers
//! - A ticket lifecycle with SLA banding and auto-close
//! - Best-effort bulk status changes and deletions
//! - An append-only feedback trail for retraining, plus user experience
//!   feedback with rating analytics
//!
//! # Modules
//!
//! ## Triage
//! - [`classifier`]: the provider seam and deterministic mocks
//! - [`ensemble`]: weighted fusion, threshold policy and urgency
//! - [`config`]: category ordering, urgency keywords, KB suggestions
//!
//! ## Tickets
//! - [`ticket`]: status/priority model, lifecycle manager, SLA, search
//! - [`bulk`]: forgiving id parsing and batch operations
//! - [`feedback`], [`comment`]: human corrections, experience feedback and notes
//! - [`store`]: the persistence contract and an in-memory store
//!
//! [`ServiceDesk`] wires them together over one store.
//!
//! # Usage
//!
//! ```
//! use std::sync::Arc;
//! use triage::classifier::StaticClassifier;
//! use triage::{ClassifierPair, InMemoryTicketStore, ServiceDesk, TicketSubmission, TriageConfig};
//!
//! let pair = ClassifierPair::new(
//!     Arc::new(StaticClassifier::one_hot("statistical", 8, 2)),
//!     Arc::new(StaticClassifier::one_hot("semantic", 8, 2)),
//! );
//! let desk = ServiceDesk::new(
//!     TriageConfig::default().shared(),
//!     pair,
//!     InMemoryTicketStore::new().shared(),
//! );
//! let outcome = desk
//!     .submit(TicketSubmission {
//!         user_id: "emp-1".into(),
//!         user_name: "Robin".into(),
//!         title: "Laptop".into(),
//!         description: "Laptop fan is very loud".into(),
//!     })
//!     .unwrap();
//! assert_eq!(outcome.ticket().unwrap().ticket_ref, "TK000001");
//! ```

#![allow(clippy::uninlined_format_args)]

pub mod bulk;
pub mod category;
pub mod classifier;
pub mod comment;
pub mod config;
pub mod desk;
pub mod ensemble;
pub mod feedback;
pub mod store;
pub mod ticket;

pub use bulk::{
    parse_identifier_tokens, parse_identifiers, BulkFailure, BulkOperation,
    BulkOperationCoordinator, BulkOutcome, ParsedIdentifiers,
};
pub use category::{Category, UnknownCategory};
pub use classifier::{
    ClassifierAdapter, ClassifierError, ClassifierResult, ClassifierSlot, ProbabilityVector,
};
pub use comment::TicketComment;
pub use config::{ConfigError, ConfigResult, SharedTriageConfig, TriageConfig};
pub use desk::{
    DeskError, DeskResult, ServiceDesk, SubmissionOutcome, SubmissionRejection, TicketSubmission,
};
pub use ensemble::{
    ClassifierPair, EnsembleDecisionEngine, ProcessingStatus, RejectionReason, TriageDecision,
    TriageError, TriageResult, Urgency,
};
pub use feedback::{
    ExperienceFeedback, ExperienceKind, ExperienceSummary, FeedbackError, FeedbackKind,
    FeedbackRecord, FeedbackRecorder, FeedbackResult, NewExperienceFeedback,
    UnknownExperienceKind, DEFAULT_FEEDBACK_WEIGHT, DEFAULT_RATING, MAX_RATING, MIN_RATING,
};
pub use store::{
    InMemoryTicketStore, SharedTicketStore, StoreError, StoreResult, StoreSnapshot, TicketStore,
};
pub use ticket::{
    LifecycleError, NewTicket, Priority, SlaBand, SlaReading, StatusChange, SweepReport, Ticket,
    TicketId, TicketLifecycleManager, TicketLookup, TicketQuery, TicketStatus, TicketSummary,
    TransitionPolicy,
};
