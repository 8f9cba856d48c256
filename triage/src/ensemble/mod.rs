//! Ensemble triage
//!
//! Turns two classifier outputs into one triage decision.
//!
//! # Pipeline
//!
//! 1. Reject reports whose trimmed text is shorter than
//!    [`MIN_TEXT_CHARS`]; neither provider is called.
//! 2. Fuse: `final[i] = 0.6 * semantic[i] + 0.4 * statistical[i]`.
//! 3. Pick the first maximal index; its score is the confidence.
//! 4. Apply the threshold table:
//!
//! | confidence | category | status |
//! |---|---|---|
//! | ≥ 0.70 | argmax | Auto-Categorized |
//! | [0.45, 0.70) | argmax | Pending Verification |
//! | < 0.45 | Miscellaneous | Requires Manual Review |
//!
//! 5. Flag urgency by keyword.
//!
//! A decision becomes a ticket only if [`TriageDecision::is_accepted`].

pub mod decision;
pub mod engine;
pub mod voting;

pub use decision::{
    CategoryScore, ProcessingStatus, RejectionReason, TriageDecision, Urgency,
    ACCEPTANCE_FLOOR_PERCENT, HIGH_CONFIDENCE, LOW_CONFIDENCE, MIN_TEXT_CHARS,
};
pub use engine::{ClassifierPair, EnsembleDecisionEngine, TriageError, TriageResult};
pub use voting::{WeightedVote, SEMANTIC_WEIGHT, STATISTICAL_WEIGHT};
