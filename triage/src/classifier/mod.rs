//! Classifier seam
//!
//! The engine never looks inside a model. It consumes one probability
//! vector per provider, ordered like [`crate::config::TriageConfig::categories`].
//!
//! - [`ClassifierAdapter`]: trait implemented by every provider
//! - [`ProbabilityVector`]: provider output
//! - [`mock`]: deterministic providers for tests and dry runs

pub mod mock;

use serde::{Deserialize, Serialize};

pub use mock::{FailingClassifier, FailureMode, StaticClassifier};

/// Error type for classifier providers
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ClassifierError {
    #[error("{provider} timed out after {after_ms}ms")]
    Timeout { provider: String, after_ms: u64 },

    #[error("{provider} returned malformed output: {reason}")]
    Malformed { provider: String, reason: String },

    #[error("{provider} unavailable: {reason}")]
    Unavailable { provider: String, reason: String },
}

/// Result type for classifier calls
pub type ClassifierResult<T> = Result<T, ClassifierError>;

/// A text classifier that scores every configured category.
///
/// Calls may block (model inference, network). The engine imposes no
/// timeout of its own; adapters surface their own failures as
/// [`ClassifierError`].
pub trait ClassifierAdapter: Send + Sync {
    /// Provider name used in logs and errors.
    fn name(&self) -> &str;

    /// Score `text` against every category.
    fn classify(&self, text: &str) -> ClassifierResult<ProbabilityVector>;
}

/// Which of the two ensemble members produced a vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassifierSlot {
    /// Lighter statistical model (vector A).
    Statistical,
    /// Higher-capacity semantic model (vector B).
    Semantic,
}

impl std::fmt::Display for ClassifierSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Statistical => write!(f, "statistical"),
            Self::Semantic => write!(f, "semantic"),
        }
    }
}

/// Per-category probabilities, in configured category order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProbabilityVector(Vec<f64>);

impl ProbabilityVector {
    pub fn new(values: Vec<f64>) -> Self {
        Self(values)
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<f64> {
        self.0.get(index).copied()
    }

    /// Sum of all entries. Conceptually 1.0 but never enforced.
    pub fn total(&self) -> f64 {
        self.0.iter().sum()
    }

    /// Check the vector is usable for fusion over `expected_len` categories.
    ///
    /// Returns a description of the first problem found.
    pub fn check(&self, expected_len: usize) -> Result<(), String> {
        if self.0.len() != expected_len {
            return Err(format!(
                "expected {} probabilities, got {}",
                expected_len,
                self.0.len()
            ));
        }
        if let Some((i, v)) = self
            .0
            .iter()
            .enumerate()
            .find(|(_, v)| !v.is_finite() || **v < 0.0 || **v > 1.0)
        {
            return Err(format!("probability at index {i} out of range: {v}"));
        }
        Ok(())
    }
}

impl From<Vec<f64>> for ProbabilityVector {
    fn from(values: Vec<f64>) -> Self {
        Self(values)
    }
}
