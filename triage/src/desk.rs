//! Service desk facade
//!
//! Wires the pieces together over one store: classify → decide →
//! acceptance gate → create ticket, plus the lifecycle, bulk, feedback,
//! comment, search and summary operations the console and CLI need.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::bulk::{parse_identifiers, BulkOperationCoordinator, BulkOutcome};
use crate::comment::TicketComment;
use crate::config::SharedTriageConfig;
use crate::ensemble::{
    ClassifierPair, EnsembleDecisionEngine, RejectionReason, TriageDecision, TriageError,
    ACCEPTANCE_FLOOR_PERCENT,
};
use crate::feedback::{FeedbackError, FeedbackRecorder};
use crate::store::{SharedTicketStore, StoreError};
use crate::ticket::{
    LifecycleError, NewTicket, Priority, SweepReport, Ticket, TicketId, TicketLifecycleManager,
    TicketLookup, TicketQuery, TicketStatus, TicketSummary,
};

/// Error type for desk operations
#[derive(Debug, thiserror::Error)]
pub enum DeskError {
    #[error(transparent)]
    Triage(#[from] TriageError),

    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),

    #[error(transparent)]
    Feedback(#[from] FeedbackError),

    #[error("Ticket not found: TK{0:06}")]
    TicketNotFound(TicketId),

    #[error("Not a ticket reference: {0}")]
    InvalidLookup(String),

    #[error("Comment body is empty")]
    EmptyComment,

    #[error("Store error: {0}")]
    Store(StoreError),
}

impl From<StoreError> for DeskError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => Self::TicketNotFound(id),
            other => Self::Store(other),
        }
    }
}

/// Result type for desk operations
pub type DeskResult<T> = Result<T, DeskError>;

/// An incident report as typed by the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TicketSubmission {
    pub user_id: String,
    pub user_name: String,
    pub title: String,
    pub description: String,
}

/// Why a submission did not become a ticket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum SubmissionRejection {
    MissingTitle,
    MissingDescription,
    InvalidInput { reason: RejectionReason },
    BelowAcceptanceFloor { confidence_percent: f64 },
}

impl std::fmt::Display for SubmissionRejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingTitle => write!(f, "Please provide a title for your issue."),
            Self::MissingDescription => write!(f, "Please describe your issue."),
            Self::InvalidInput { reason } => write!(f, "{reason}"),
            Self::BelowAcceptanceFloor { confidence_percent } => write!(
                f,
                "Confidence {confidence_percent:.2}% is below the {ACCEPTANCE_FLOOR_PERCENT}% floor. \
                 Please add more detail so the issue can be categorized."
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "outcome")]
pub enum SubmissionOutcome {
    Logged {
        ticket: Ticket,
        decision: TriageDecision,
        suggestion: String,
    },
    Rejected {
        /// Absent when the submission failed before triage.
        decision: Option<TriageDecision>,
        reason: SubmissionRejection,
    },
}

impl SubmissionOutcome {
    pub fn ticket(&self) -> Option<&Ticket> {
        match self {
            Self::Logged { ticket, .. } => Some(ticket),
            Self::Rejected { .. } => None,
        }
    }
}

pub struct ServiceDesk {
    config: SharedTriageConfig,
    engine: EnsembleDecisionEngine,
    classifiers: ClassifierPair,
    store: SharedTicketStore,
    lifecycle: TicketLifecycleManager,
    bulk: BulkOperationCoordinator,
    feedback: FeedbackRecorder,
}

impl ServiceDesk {
    pub fn new(
        config: SharedTriageConfig,
        classifiers: ClassifierPair,
        store: SharedTicketStore,
    ) -> Self {
        let engine = EnsembleDecisionEngine::new(config.clone());
        let lifecycle = TicketLifecycleManager::new(store.clone(), config.transition_policy);
        let bulk = BulkOperationCoordinator::new(store.clone(), lifecycle.clone());
        let feedback = FeedbackRecorder::new(store.clone());
        Self {
            config,
            engine,
            classifiers,
            store,
            lifecycle,
            bulk,
            feedback,
        }
    }

    pub fn config(&self) -> &SharedTriageConfig {
        &self.config
    }

    pub fn engine(&self) -> &EnsembleDecisionEngine {
        &self.engine
    }

    pub fn store(&self) -> &SharedTicketStore {
        &self.store
    }

    pub fn lifecycle(&self) -> &TicketLifecycleManager {
        &self.lifecycle
    }

    pub fn bulk(&self) -> &BulkOperationCoordinator {
        &self.bulk
    }

    pub fn feedback(&self) -> &FeedbackRecorder {
        &self.feedback
    }

    pub fn submit(&self, submission: TicketSubmission) -> DeskResult<SubmissionOutcome> {
        self.submit_at(submission, Utc::now())
    }

    /// Triage a report and log it as a ticket if the decision is accepted.
    ///
    /// Classifier failures are errors, not rejections: nothing is stored
    /// and the caller decides whether to retry.
    pub fn submit_at(
        &self,
        submission: TicketSubmission,
        now: DateTime<Utc>,
    ) -> DeskResult<SubmissionOutcome> {
        if submission.title.trim().is_empty() {
            return Ok(SubmissionOutcome::Rejected {
                decision: None,
                reason: SubmissionRejection::MissingTitle,
            });
        }
        if submission.description.trim().is_empty() {
            return Ok(SubmissionOutcome::Rejected {
                decision: None,
                reason: SubmissionRejection::MissingDescription,
            });
        }

        let decision = self
            .engine
            .triage(&submission.description, &self.classifiers)?;

        if let Some(reason) = decision.rejection_reason.clone() {
            return Ok(SubmissionOutcome::Rejected {
                decision: Some(decision),
                reason: SubmissionRejection::InvalidInput { reason },
            });
        }
        if !decision.is_accepted() {
            let confidence_percent = decision.confidence_percent();
            info!(confidence_percent, "Submission below acceptance floor");
            return Ok(SubmissionOutcome::Rejected {
                decision: Some(decision),
                reason: SubmissionRejection::BelowAcceptanceFloor { confidence_percent },
            });
        }

        let ticket = self.store.create_ticket(NewTicket {
            user_id: submission.user_id,
            user_name: submission.user_name,
            title: submission.title.trim().to_string(),
            description: submission.description,
            category: decision.category,
            priority: Priority::from(decision.urgency),
            created_at: now,
        })?;
        info!(
            ticket = %ticket.ticket_ref,
            category = %ticket.category,
            priority = %ticket.priority,
            status = %decision.processing_status,
            "Ticket logged"
        );

        let suggestion = self.config.suggestion_for(decision.category).to_string();
        Ok(SubmissionOutcome::Logged {
            ticket,
            decision,
            suggestion,
        })
    }

    pub fn ticket(&self, id: TicketId) -> DeskResult<Ticket> {
        Ok(self.store.get_ticket(id)?)
    }

    /// Find a ticket by `TK000042` or `42`.
    pub fn find(&self, reference: &str) -> DeskResult<Ticket> {
        let lookup = TicketLookup::parse(reference)
            .ok_or_else(|| DeskError::InvalidLookup(reference.to_string()))?;
        self.ticket(lookup.id())
    }

    pub fn tickets(&self, query: &TicketQuery) -> DeskResult<Vec<Ticket>> {
        let tickets = self.store.get_tickets(query.owner.as_deref())?;
        Ok(query.apply(tickets))
    }

    pub fn update_status(&self, id: TicketId, status: TicketStatus) -> DeskResult<()> {
        self.lifecycle.update_status(id, status)?;
        Ok(())
    }

    pub fn update_priority(&self, id: TicketId, priority: Priority) -> DeskResult<()> {
        self.lifecycle.update_priority(id, priority)?;
        Ok(())
    }

    pub fn delete_ticket(&self, id: TicketId) -> DeskResult<Ticket> {
        let ticket = self.store.delete_ticket(id)?;
        info!(ticket = %ticket.ticket_ref, "Ticket deleted");
        Ok(ticket)
    }

    /// Parse operator input and set every listed ticket to `status`.
    pub fn bulk_update_status(&self, raw_ids: &str, status: TicketStatus) -> BulkOutcome {
        let parsed = parse_identifiers(raw_ids);
        self.bulk.bulk_update_status(parsed.ids, status)
    }

    /// Parse operator input and delete every listed ticket.
    pub fn bulk_delete(&self, raw_ids: &str) -> BulkOutcome {
        let parsed = parse_identifiers(raw_ids);
        self.bulk.bulk_delete(parsed.ids)
    }

    pub fn sweep(&self, now: DateTime<Utc>) -> DeskResult<SweepReport> {
        Ok(self.lifecycle.sweep(now)?)
    }

    pub fn add_comment(
        &self,
        ticket_id: TicketId,
        author_id: &str,
        author_name: &str,
        body: &str,
        internal: bool,
    ) -> DeskResult<TicketComment> {
        if body.trim().is_empty() {
            return Err(DeskError::EmptyComment);
        }
        let comment = TicketComment::new(ticket_id, author_id, author_name, body.trim(), internal);
        self.store.add_comment(comment.clone())?;
        info!(ticket_id, internal, "Comment added");
        Ok(comment)
    }

    /// All comments, internal notes included.
    pub fn list_comments(&self, ticket_id: TicketId) -> DeskResult<Vec<TicketComment>> {
        self.store.get_ticket(ticket_id)?;
        Ok(self.store.list_comments(ticket_id)?)
    }

    /// Comments the ticket owner may see.
    pub fn list_public_comments(&self, ticket_id: TicketId) -> DeskResult<Vec<TicketComment>> {
        Ok(TicketComment::visible(self.list_comments(ticket_id)?, false))
    }

    pub fn summary(&self, now: DateTime<Utc>) -> DeskResult<TicketSummary> {
        let tickets = self.store.get_tickets(None)?;
        Ok(TicketSummary::compute(&tickets, now))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::Category;
    use crate::classifier::{FailingClassifier, StaticClassifier};
    use crate::config::TriageConfig;
    use crate::store::InMemoryTicketStore;
    use std::sync::Arc;

    fn desk_with(statistical: Vec<f64>, semantic: Vec<f64>) -> ServiceDesk {
        let pair = ClassifierPair::new(
            Arc::new(StaticClassifier::new("stat", statistical)),
            Arc::new(StaticClassifier::new("sem", semantic)),
        );
        ServiceDesk::new(
            TriageConfig::default().shared(),
            pair,
            InMemoryTicketStore::new().shared(),
        )
    }

    fn hardware_desk() -> ServiceDesk {
        desk_with(
            vec![0.1, 0.1, 0.6, 0.2, 0.0, 0.0, 0.0, 0.0],
            vec![0.05, 0.05, 0.85, 0.05, 0.0, 0.0, 0.0, 0.0],
        )
    }

    fn submission(title: &str, description: &str) -> TicketSubmission {
        TicketSubmission {
            user_id: "emp-1".to_string(),
            user_name: "Robin".to_string(),
            title: title.to_string(),
            description: description.to_string(),
        }
    }

    #[test]
    fn test_submit_logs_ticket() {
        let desk = hardware_desk();
        let outcome = desk
            .submit(submission("Screen", "My screen is flickering constantly"))
            .unwrap();
        let SubmissionOutcome::Logged {
            ticket,
            decision,
            suggestion,
        } = outcome
        else {
            panic!("expected a logged ticket");
        };
        assert_eq!(ticket.category, Category::Hardware);
        assert_eq!(ticket.priority, Priority::High);
        assert_eq!(ticket.status, TicketStatus::Open);
        assert_eq!(ticket.ticket_ref, "TK000001");
        assert!((decision.confidence - 0.75).abs() < 1e-9);
        assert_eq!(suggestion, Category::Hardware.default_suggestion());
    }

    #[test]
    fn test_missing_title_skips_classifiers() {
        let pair = ClassifierPair::new(
            Arc::new(FailingClassifier::timeout("stat")),
            Arc::new(FailingClassifier::timeout("sem")),
        );
        let desk = ServiceDesk::new(
            TriageConfig::default().shared(),
            pair,
            InMemoryTicketStore::new().shared(),
        );
        let outcome = desk
            .submit(submission("  ", "Printer on floor two is jammed"))
            .unwrap();
        assert!(matches!(
            outcome,
            SubmissionOutcome::Rejected {
                decision: None,
                reason: SubmissionRejection::MissingTitle
            }
        ));
    }

    #[test]
    fn test_short_description_rejected() {
        let desk = hardware_desk();
        let outcome = desk.submit(submission("Help", "broken")).unwrap();
        let SubmissionOutcome::Rejected { decision, reason } = outcome else {
            panic!("expected rejection");
        };
        assert!(matches!(reason, SubmissionRejection::InvalidInput { .. }));
        assert_eq!(decision.unwrap().confidence, 0.0);
        assert!(desk.store().get_tickets(None).unwrap().is_empty());
    }

    #[test]
    fn test_below_floor_rejected() {
        let uniform = vec![0.125; 8];
        let desk = desk_with(uniform.clone(), uniform);
        let outcome = desk
            .submit(submission("Odd", "Something strange is happening"))
            .unwrap();
        let SubmissionOutcome::Rejected { reason, .. } = outcome else {
            panic!("expected rejection");
        };
        assert_eq!(
            reason,
            SubmissionRejection::BelowAcceptanceFloor {
                confidence_percent: 12.5
            }
        );
        assert!(desk.store().get_tickets(None).unwrap().is_empty());
    }

    #[test]
    fn test_classifier_failure_is_error() {
        let pair = ClassifierPair::new(
            Arc::new(StaticClassifier::uniform("stat", 8)),
            Arc::new(FailingClassifier::unavailable("sem")),
        );
        let desk = ServiceDesk::new(
            TriageConfig::default().shared(),
            pair,
            InMemoryTicketStore::new().shared(),
        );
        let err = desk
            .submit(submission("VPN", "VPN keeps disconnecting every hour"))
            .unwrap_err();
        assert!(matches!(err, DeskError::Triage(_)));
        assert!(desk.store().get_tickets(None).unwrap().is_empty());
    }

    #[test]
    fn test_find_by_reference() {
        let desk = hardware_desk();
        desk.submit(submission("Screen", "My screen is flickering constantly"))
            .unwrap();
        assert_eq!(desk.find("TK000001").unwrap().id, 1);
        assert_eq!(desk.find("1").unwrap().id, 1);
        assert!(matches!(desk.find("TK000002"), Err(DeskError::TicketNotFound(2))));
        assert!(matches!(desk.find("nope"), Err(DeskError::InvalidLookup(_))));
    }

    #[test]
    fn test_comments_visibility() {
        let desk = hardware_desk();
        desk.submit(submission("Screen", "My screen is flickering constantly"))
            .unwrap();
        desk.add_comment(1, "agent-7", "Agent", "Replacing the cable", false)
            .unwrap();
        desk.add_comment(1, "agent-7", "Agent", "Check warranty first", true)
            .unwrap();
        assert_eq!(desk.list_comments(1).unwrap().len(), 2);
        let public = desk.list_public_comments(1).unwrap();
        assert_eq!(public.len(), 1);
        assert!(!public[0].internal);

        assert!(matches!(
            desk.add_comment(1, "a", "A", "   ", false),
            Err(DeskError::EmptyComment)
        ));
        assert!(matches!(
            desk.list_comments(9),
            Err(DeskError::TicketNotFound(9))
        ));
    }

    #[test]
    fn test_bulk_from_raw_input() {
        let desk = hardware_desk();
        for _ in 0..3 {
            desk.submit(submission("Screen", "My screen is flickering constantly"))
                .unwrap();
        }
        let outcome = desk.bulk_update_status("1, 2, x, 9", TicketStatus::Resolved);
        assert_eq!(outcome.affected, vec![1, 2]);
        assert_eq!(outcome.missing, vec![9]);

        let outcome = desk.bulk_delete("3,abc");
        assert_eq!(outcome.affected, vec![3]);
        assert_eq!(desk.store().get_tickets(None).unwrap().len(), 2);
    }
}
