//! Triage decision types and threshold policy.

use serde::{Deserialize, Serialize};

use crate::category::Category;

/// At or above this confidence a category is assigned without review.
pub const HIGH_CONFIDENCE: f64 = 0.70;

/// Below this confidence the category is forced to Miscellaneous.
pub const LOW_CONFIDENCE: f64 = 0.45;

/// Minimum confidence, in percent, for a decision to become a ticket.
pub const ACCEPTANCE_FLOOR_PERCENT: f64 = 20.0;

/// Minimum trimmed description length, in characters.
pub const MIN_TEXT_CHARS: usize = 10;

/// Urgency flag derived from keywords in the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Urgency {
    High,
    Standard,
}

impl std::fmt::Display for Urgency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::High => write!(f, "High"),
            Self::Standard => write!(f, "Standard"),
        }
    }
}

/// How much human attention a decision needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProcessingStatus {
    #[serde(rename = "Auto-Categorized")]
    AutoCategorized,
    #[serde(rename = "Pending Verification")]
    PendingVerification,
    #[serde(rename = "Requires Manual Review")]
    RequiresManualReview,
}

impl ProcessingStatus {
    /// Threshold table applied to the fused confidence.
    pub fn for_confidence(confidence: f64) -> Self {
        if confidence >= HIGH_CONFIDENCE {
            Self::AutoCategorized
        } else if confidence >= LOW_CONFIDENCE {
            Self::PendingVerification
        } else {
            Self::RequiresManualReview
        }
    }
}

impl std::fmt::Display for ProcessingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AutoCategorized => write!(f, "Auto-Categorized"),
            Self::PendingVerification => write!(f, "Pending Verification"),
            Self::RequiresManualReview => write!(f, "Requires Manual Review"),
        }
    }
}

/// Why a report was rejected before fusion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum RejectionReason {
    InputTooShort { min_chars: usize, actual: usize },
}

impl std::fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InputTooShort { min_chars, .. } => write!(
                f,
                "Input too short. Please provide at least {} characters for proper categorization.",
                min_chars
            ),
        }
    }
}

/// Fused probability for one category.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CategoryScore {
    pub category: Category,
    pub probability: f64,
}

/// Output of ensemble fusion for one report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriageDecision {
    /// Assigned category (Miscellaneous when review is required).
    pub category: Category,
    /// Fused probability of the winning category, 0.0–1.0.
    pub confidence: f64,
    pub urgency: Urgency,
    pub processing_status: ProcessingStatus,
    /// Set when the input failed validation; no fusion happened.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<RejectionReason>,
    /// Fused scores in configured category order. Empty on rejection.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub scores: Vec<CategoryScore>,
    /// Urgency keywords found in the text.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub urgency_keywords: Vec<String>,
}

impl TriageDecision {
    /// Decision for a report that failed input validation.
    pub fn rejected(reason: RejectionReason) -> Self {
        Self {
            category: Category::Miscellaneous,
            confidence: 0.0,
            urgency: Urgency::Standard,
            processing_status: ProcessingStatus::RequiresManualReview,
            rejection_reason: Some(reason),
            scores: Vec::new(),
            urgency_keywords: Vec::new(),
        }
    }

    /// Confidence as a percentage rounded to two decimals.
    pub fn confidence_percent(&self) -> f64 {
        (self.confidence * 100.0 * 100.0).round() / 100.0
    }

    /// Whether this decision may be persisted as a ticket.
    pub fn is_accepted(&self) -> bool {
        self.rejection_reason.is_none() && self.confidence_percent() >= ACCEPTANCE_FLOOR_PERCENT
    }

    /// Highest-scoring categories, best first. Ties keep configured order.
    pub fn top_scores(&self, n: usize) -> Vec<CategoryScore> {
        let mut ranked = self.scores.clone();
        ranked.sort_by(|a, b| b.probability.total_cmp(&a.probability));
        ranked.truncate(n);
        ranked
    }
}
