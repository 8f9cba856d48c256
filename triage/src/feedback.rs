//! Human corrections to triage output, and user experience feedback.
//!
//! Corrections are an append-only audit trail for later retraining; a
//! record is never edited and recording it never changes the ticket.
//! Experience feedback is what end users say about the desk itself: a
//! kind, a message and a 1 to 5 rating. It is not tied to any ticket.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::category::Category;
use crate::store::{SharedTicketStore, StoreError};
use crate::ticket::TicketId;

/// Confidence weight used when the reviewer gives none.
pub const DEFAULT_FEEDBACK_WEIGHT: f64 = 0.5;

pub const MIN_RATING: u8 = 1;
pub const MAX_RATING: u8 = 5;
/// Rating used when the user gives none.
pub const DEFAULT_RATING: u8 = 3;

/// Error type for feedback operations
#[derive(Debug, thiserror::Error)]
pub enum FeedbackError {
    #[error("Ticket not found: TK{0:06}")]
    TicketNotFound(TicketId),

    #[error("Feedback weight must be within 0.0..=1.0, got {0}")]
    InvalidWeight(f64),

    #[error("Rating must be within 1..=5, got {0}")]
    InvalidRating(u8),

    #[error("Feedback message is empty")]
    EmptyMessage,

    #[error("Store error: {0}")]
    Store(StoreError),
}

impl From<StoreError> for FeedbackError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => Self::TicketNotFound(id),
            other => Self::Store(other),
        }
    }
}

/// Result type for feedback operations
pub type FeedbackResult<T> = Result<T, FeedbackError>;

/// Kind of correction. Free-form; the first three are what the console offers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FeedbackKind {
    WrongCategory,
    Misclassification,
    IncorrectPriority,
    Other(String),
}

impl std::fmt::Display for FeedbackKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::WrongCategory => write!(f, "Wrong Category"),
            Self::Misclassification => write!(f, "Misclassification"),
            Self::IncorrectPriority => write!(f, "Incorrect Priority"),
            Self::Other(label) => write!(f, "{label}"),
        }
    }
}

impl From<String> for FeedbackKind {
    fn from(label: String) -> Self {
        let key = label.trim().to_lowercase().replace(['_', '-'], " ");
        match key.as_str() {
            "wrong category" => Self::WrongCategory,
            "misclassification" => Self::Misclassification,
            "incorrect priority" => Self::IncorrectPriority,
            _ => Self::Other(label.trim().to_string()),
        }
    }
}

impl From<&str> for FeedbackKind {
    fn from(label: &str) -> Self {
        Self::from(label.to_string())
    }
}

impl From<FeedbackKind> for String {
    fn from(kind: FeedbackKind) -> Self {
        kind.to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackRecord {
    pub id: Uuid,
    pub ticket_id: TicketId,
    pub predicted_category: Category,
    pub corrected_category: Category,
    pub weight: f64,
    pub kind: FeedbackKind,
    pub recorded_at: DateTime<Utc>,
}

/// What a piece of experience feedback is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ExperienceKind {
    #[serde(rename = "Bug Report")]
    BugReport,
    #[serde(rename = "Feature Request")]
    FeatureRequest,
    #[serde(rename = "General Feedback")]
    General,
    #[serde(rename = "AI Categorization Issue")]
    Categorization,
    Other,
}

impl ExperienceKind {
    pub const ALL: [ExperienceKind; 5] = [
        ExperienceKind::BugReport,
        ExperienceKind::FeatureRequest,
        ExperienceKind::General,
        ExperienceKind::Categorization,
        ExperienceKind::Other,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::BugReport => "Bug Report",
            Self::FeatureRequest => "Feature Request",
            Self::General => "General Feedback",
            Self::Categorization => "AI Categorization Issue",
            Self::Other => "Other",
        }
    }
}

impl std::fmt::Display for ExperienceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Error returned when a label does not name an experience kind.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown feedback type: {0}")]
pub struct UnknownExperienceKind(pub String);

impl std::str::FromStr for ExperienceKind {
    type Err = UnknownExperienceKind;

    /// Case-insensitive; accepts the display label or a snake_case form.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase().replace(['_', '-'], " ");
        ExperienceKind::ALL
            .iter()
            .copied()
            .find(|k| k.label().to_lowercase() == wanted)
            .ok_or_else(|| UnknownExperienceKind(s.to_string()))
    }
}

/// Experience feedback as a user submits it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewExperienceFeedback {
    pub user_id: String,
    pub user_name: String,
    pub email: Option<String>,
    pub kind: ExperienceKind,
    pub message: String,
    pub rating: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExperienceFeedback {
    pub id: Uuid,
    pub user_id: String,
    pub user_name: String,
    pub email: Option<String>,
    pub kind: ExperienceKind,
    pub message: String,
    pub rating: u8,
    pub submitted_at: DateTime<Utc>,
}

/// Aggregates over all experience feedback
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperienceSummary {
    pub total: usize,
    /// `None` when there is no feedback yet
    pub average_rating: Option<f64>,
    pub by_kind: BTreeMap<ExperienceKind, usize>,
}

impl ExperienceSummary {
    pub fn compute(feedback: &[ExperienceFeedback]) -> Self {
        let mut by_kind = BTreeMap::new();
        for entry in feedback {
            *by_kind.entry(entry.kind).or_insert(0) += 1;
        }
        let average_rating = (!feedback.is_empty()).then(|| {
            let sum: u32 = feedback.iter().map(|f| u32::from(f.rating)).sum();
            f64::from(sum) / feedback.len() as f64
        });
        Self {
            total: feedback.len(),
            average_rating,
            by_kind,
        }
    }

    /// Number of distinct kinds seen.
    pub fn kind_count(&self) -> usize {
        self.by_kind.len()
    }
}

/// Records corrections against stored tickets.
#[derive(Clone)]
pub struct FeedbackRecorder {
    store: SharedTicketStore,
}

impl FeedbackRecorder {
    pub fn new(store: SharedTicketStore) -> Self {
        Self { store }
    }

    /// Record a correction exactly as given.
    pub fn record(
        &self,
        ticket_id: TicketId,
        predicted: Category,
        corrected: Category,
        weight: f64,
        kind: FeedbackKind,
    ) -> FeedbackResult<FeedbackRecord> {
        if !weight.is_finite() || !(0.0..=1.0).contains(&weight) {
            return Err(FeedbackError::InvalidWeight(weight));
        }
        // Corrections must point at a real ticket.
        self.store.get_ticket(ticket_id)?;

        let record = FeedbackRecord {
            id: Uuid::new_v4(),
            ticket_id,
            predicted_category: predicted,
            corrected_category: corrected,
            weight,
            kind,
            recorded_at: Utc::now(),
        };
        self.store.record_feedback(record.clone())?;
        info!(
            ticket_id,
            predicted = %predicted,
            corrected = %corrected,
            kind = %record.kind,
            "Feedback recorded"
        );
        Ok(record)
    }

    /// Record a correction against the ticket's stored category with the
    /// default weight.
    pub fn correct(
        &self,
        ticket_id: TicketId,
        corrected: Category,
        kind: FeedbackKind,
    ) -> FeedbackResult<FeedbackRecord> {
        let ticket = self.store.get_ticket(ticket_id)?;
        self.record(
            ticket_id,
            ticket.category,
            corrected,
            DEFAULT_FEEDBACK_WEIGHT,
            kind,
        )
    }

    pub fn list(&self) -> FeedbackResult<Vec<FeedbackRecord>> {
        Ok(self.store.list_feedback()?)
    }

    /// Number of records per kind label.
    pub fn counts_by_kind(&self) -> FeedbackResult<BTreeMap<String, usize>> {
        let mut counts = BTreeMap::new();
        for record in self.store.list_feedback()? {
            *counts.entry(record.kind.to_string()).or_insert(0) += 1;
        }
        Ok(counts)
    }

    /// Store experience feedback. The message is trimmed and must not be
    /// blank; a blank email is dropped.
    pub fn submit_experience(
        &self,
        feedback: NewExperienceFeedback,
    ) -> FeedbackResult<ExperienceFeedback> {
        if !(MIN_RATING..=MAX_RATING).contains(&feedback.rating) {
            return Err(FeedbackError::InvalidRating(feedback.rating));
        }
        let message = feedback.message.trim();
        if message.is_empty() {
            return Err(FeedbackError::EmptyMessage);
        }
        let email = feedback
            .email
            .map(|e| e.trim().to_string())
            .filter(|e| !e.is_empty());

        let entry = ExperienceFeedback {
            id: Uuid::new_v4(),
            user_id: feedback.user_id,
            user_name: feedback.user_name,
            email,
            kind: feedback.kind,
            message: message.to_string(),
            rating: feedback.rating,
            submitted_at: Utc::now(),
        };
        self.store.record_experience(entry.clone())?;
        info!(
            user_id = %entry.user_id,
            kind = %entry.kind,
            rating = entry.rating,
            "Experience feedback submitted"
        );
        Ok(entry)
    }

    /// Experience feedback, newest first.
    pub fn list_experience(&self) -> FeedbackResult<Vec<ExperienceFeedback>> {
        let mut entries = self.store.list_experience()?;
        entries.reverse();
        Ok(entries)
    }

    pub fn experience_summary(&self) -> FeedbackResult<ExperienceSummary> {
        Ok(ExperienceSummary::compute(&self.store.list_experience()?))
    }
}
