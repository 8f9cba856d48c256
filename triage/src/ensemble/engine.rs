//! Ensemble decision engine
//!
//! Validates the report, fuses the two provider vectors, applies the
//! threshold policy and flags urgency. Holds no mutable state.

use std::sync::Arc;

use tracing::{debug, warn};

use super::decision::{
    CategoryScore, ProcessingStatus, RejectionReason, TriageDecision, Urgency, MIN_TEXT_CHARS,
};
use super::voting::{argmax_first, default_votes, soft_vote};
use crate::category::Category;
use crate::classifier::{ClassifierAdapter, ClassifierError, ClassifierSlot, ProbabilityVector};
use crate::config::SharedTriageConfig;

/// Error type for triage operations
#[derive(Debug, thiserror::Error)]
pub enum TriageError {
    #[error("{slot} classifier unavailable: {source}")]
    ClassifierUnavailable {
        slot: ClassifierSlot,
        #[source]
        source: ClassifierError,
    },
}

/// Result type for triage operations
pub type TriageResult<T> = Result<T, TriageError>;

/// The two providers whose outputs are fused.
#[derive(Clone)]
pub struct ClassifierPair {
    statistical: Arc<dyn ClassifierAdapter>,
    semantic: Arc<dyn ClassifierAdapter>,
}

impl ClassifierPair {
    pub fn new(
        statistical: Arc<dyn ClassifierAdapter>,
        semantic: Arc<dyn ClassifierAdapter>,
    ) -> Self {
        Self {
            statistical,
            semantic,
        }
    }

    pub fn statistical(&self) -> &dyn ClassifierAdapter {
        self.statistical.as_ref()
    }

    pub fn semantic(&self) -> &dyn ClassifierAdapter {
        self.semantic.as_ref()
    }
}

impl std::fmt::Debug for ClassifierPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClassifierPair")
            .field("statistical", &self.statistical.name())
            .field("semantic", &self.semantic.name())
            .finish()
    }
}

/// Fuses two classifier outputs into a [`TriageDecision`].
#[derive(Debug, Clone)]
pub struct EnsembleDecisionEngine {
    config: SharedTriageConfig,
    /// Lower-cased urgency keywords.
    keywords: Vec<String>,
}

impl EnsembleDecisionEngine {
    pub fn new(config: SharedTriageConfig) -> Self {
        let keywords = config
            .urgent_keywords
            .iter()
            .map(|k| k.trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .collect();
        Self { config, keywords }
    }

    pub fn config(&self) -> &SharedTriageConfig {
        &self.config
    }

    /// Classify `text` with both providers and decide.
    ///
    /// Too-short input is rejected before either provider is called.
    pub fn triage(
        &self,
        text: &str,
        classifiers: &ClassifierPair,
    ) -> TriageResult<TriageDecision> {
        if let Some(reason) = Self::validate_input(text) {
            debug!(%reason, "report rejected before classification");
            return Ok(TriageDecision::rejected(reason));
        }

        let statistical =
            self.run_provider(ClassifierSlot::Statistical, classifiers.statistical(), text)?;
        let semantic =
            self.run_provider(ClassifierSlot::Semantic, classifiers.semantic(), text)?;

        self.decide(text, &statistical, &semantic)
    }

    /// Fuse `statistical` (vector A) and `semantic` (vector B) for `text`.
    pub fn decide(
        &self,
        text: &str,
        statistical: &ProbabilityVector,
        semantic: &ProbabilityVector,
    ) -> TriageResult<TriageDecision> {
        if let Some(reason) = Self::validate_input(text) {
            return Ok(TriageDecision::rejected(reason));
        }

        let n = self.config.category_count();
        for (slot, vector) in [
            (ClassifierSlot::Statistical, statistical),
            (ClassifierSlot::Semantic, semantic),
        ] {
            Self::check_vector(slot, &slot.to_string(), vector, n)?;
        }

        let fused = soft_vote(
            &default_votes(statistical.as_slice(), semantic.as_slice()),
            n,
        );
        let (idx, confidence) = argmax_first(&fused).unwrap_or((0, 0.0));

        let processing_status = ProcessingStatus::for_confidence(confidence);
        let category = match processing_status {
            ProcessingStatus::RequiresManualReview => Category::Miscellaneous,
            _ => self
                .config
                .category_at(idx)
                .unwrap_or(Category::Miscellaneous),
        };

        let (urgency, urgency_keywords) = self.detect_urgency(text);

        let scores = self
            .config
            .categories
            .iter()
            .zip(&fused)
            .map(|(&category, &probability)| CategoryScore {
                category,
                probability,
            })
            .collect();

        debug!(
            category = %category,
            confidence,
            status = %processing_status,
            urgency = %urgency,
            "triage decision"
        );

        Ok(TriageDecision {
            category,
            confidence,
            urgency,
            processing_status,
            rejection_reason: None,
            scores,
            urgency_keywords,
        })
    }

    /// Keyword urgency check, case-insensitive substring match.
    pub fn detect_urgency(&self, text: &str) -> (Urgency, Vec<String>) {
        let lowered = text.to_lowercase();
        let matched: Vec<String> = self
            .keywords
            .iter()
            .filter(|k| lowered.contains(k.as_str()))
            .cloned()
            .collect();
        let urgency = if matched.is_empty() {
            Urgency::Standard
        } else {
            Urgency::High
        };
        (urgency, matched)
    }

    /// Rejection reason if `text` is too short to classify.
    pub fn validate_input(text: &str) -> Option<RejectionReason> {
        let actual = text.trim().chars().count();
        if actual < MIN_TEXT_CHARS {
            Some(RejectionReason::InputTooShort {
                min_chars: MIN_TEXT_CHARS,
                actual,
            })
        } else {
            None
        }
    }

    fn run_provider(
        &self,
        slot: ClassifierSlot,
        provider: &dyn ClassifierAdapter,
        text: &str,
    ) -> TriageResult<ProbabilityVector> {
        let vector = provider.classify(text).map_err(|source| {
            warn!(%slot, provider = provider.name(), error = %source, "classifier failed");
            TriageError::ClassifierUnavailable { slot, source }
        })?;
        Self::check_vector(slot, provider.name(), &vector, self.config.category_count())?;
        Ok(vector)
    }

    fn check_vector(
        slot: ClassifierSlot,
        provider: &str,
        vector: &ProbabilityVector,
        expected_len: usize,
    ) -> TriageResult<()> {
        vector.check(expected_len).map_err(|reason| {
            warn!(%slot, provider, %reason, "malformed classifier output");
            TriageError::ClassifierUnavailable {
                slot,
                source: ClassifierError::Malformed {
                    provider: provider.to_string(),
                    reason,
                },
            }
        })
    }
}
