//! Deterministic classifier providers.
//!
//! Used by tests, dry runs and anywhere a real model is not wired in.

use std::sync::atomic::{AtomicUsize, Ordering};

use super::{ClassifierAdapter, ClassifierError, ClassifierResult, ProbabilityVector};

/// Returns the same vector for every input and counts its calls.
pub struct StaticClassifier {
    name: String,
    output: ProbabilityVector,
    calls: AtomicUsize,
}

impl StaticClassifier {
    pub fn new(name: impl Into<String>, output: impl Into<ProbabilityVector>) -> Self {
        Self {
            name: name.into(),
            output: output.into(),
            calls: AtomicUsize::new(0),
        }
    }

    /// Uniform distribution over `len` categories.
    pub fn uniform(name: impl Into<String>, len: usize) -> Self {
        let p = if len == 0 { 0.0 } else { 1.0 / len as f64 };
        Self::new(name, vec![p; len])
    }

    /// All mass on one category index.
    pub fn one_hot(name: impl Into<String>, len: usize, index: usize) -> Self {
        let mut values = vec![0.0; len];
        if let Some(slot) = values.get_mut(index) {
            *slot = 1.0;
        }
        Self::new(name, values)
    }

    /// Number of times `classify` has been called.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }
}

impl ClassifierAdapter for StaticClassifier {
    fn name(&self) -> &str {
        &self.name
    }

    fn classify(&self, _text: &str) -> ClassifierResult<ProbabilityVector> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        Ok(self.output.clone())
    }
}

/// How a [`FailingClassifier`] fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureMode {
    Timeout,
    Malformed,
    Unavailable,
}

/// Always fails with the configured mode.
pub struct FailingClassifier {
    name: String,
    mode: FailureMode,
}

impl FailingClassifier {
    pub fn new(name: impl Into<String>, mode: FailureMode) -> Self {
        Self {
            name: name.into(),
            mode,
        }
    }

    pub fn timeout(name: impl Into<String>) -> Self {
        Self::new(name, FailureMode::Timeout)
    }

    pub fn unavailable(name: impl Into<String>) -> Self {
        Self::new(name, FailureMode::Unavailable)
    }
}

impl ClassifierAdapter for FailingClassifier {
    fn name(&self) -> &str {
        &self.name
    }

    fn classify(&self, _text: &str) -> ClassifierResult<ProbabilityVector> {
        let provider = self.name.clone();
        Err(match self.mode {
            FailureMode::Timeout => ClassifierError::Timeout {
                provider,
                after_ms: 30_000,
            },
            FailureMode::Malformed => ClassifierError::Malformed {
                provider,
                reason: "simulated malformed output".to_string(),
            },
            FailureMode::Unavailable => ClassifierError::Unavailable {
                provider,
                reason: "simulated failure".to_string(),
            },
        })
    }
}
