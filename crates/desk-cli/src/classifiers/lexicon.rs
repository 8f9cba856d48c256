//! Offline keyword classifiers.
//!
//! Used when no model endpoint is configured. Both count lexicon hits per
//! category and turn the counts into a distribution over the configured
//! ordering; they differ only in how sharply they commit:
//!
//! | mode | p(i) |
//! |---|---|
//! | `Smoothed` | `(hits[i] + 0.5) / (Σhits + 0.5·n)` |
//! | `Softmax` | `exp(2·hits[i]) / Σ exp(2·hits[j])` |
//!
//! With no hits at all both return the uniform distribution.

use triage::{Category, ClassifierAdapter, ClassifierResult, ProbabilityVector};

const SMOOTHING: f64 = 0.5;
const SOFTMAX_SCALE: f64 = 2.0;

fn lexicon(category: Category) -> &'static [&'static str] {
    match category {
        Category::Access => &[
            "access", "login", "log in", "password", "vpn", "account", "locked out", "permission",
            "sign in", "credentials", "mfa",
        ],
        Category::AdministrativeRights => &[
            "admin", "administrator", "install", "elevated", "privilege", "rights", "sudo",
            "local admin",
        ],
        Category::Hardware => &[
            "laptop", "monitor", "screen", "keyboard", "mouse", "printer", "flicker", "battery",
            "charger", "dock", "headset", "device", "hardware",
        ],
        Category::HrSupport => &[
            "human resources", "payroll", "salary", "leave", "holiday", "benefits", "onboarding",
            "contract", "payslip",
        ],
        Category::InternalProject => &[
            "project", "milestone", "deadline", "sprint", "roadmap", "deliverable", "stakeholder",
        ],
        Category::Miscellaneous => &[],
        Category::Purchase => &[
            "purchase", "buy", "order", "quote", "invoice", "procurement", "license", "licence",
            "subscription",
        ],
        Category::Storage => &[
            "storage", "disk", "drive", "quota", "space", "backup", "folder", "sharepoint",
            "onedrive", "archive",
        ],
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LexiconMode {
    Smoothed,
    Softmax,
}

pub struct LexiconClassifier {
    name: String,
    categories: Vec<Category>,
    mode: LexiconMode,
}

impl LexiconClassifier {
    pub fn new(name: impl Into<String>, categories: &[Category], mode: LexiconMode) -> Self {
        Self {
            name: name.into(),
            categories: categories.to_vec(),
            mode,
        }
    }

    /// Stand-in for the statistical provider.
    pub fn statistical(categories: &[Category]) -> Self {
        Self::new("lexicon-statistical", categories, LexiconMode::Smoothed)
    }

    /// Stand-in for the semantic provider.
    pub fn semantic(categories: &[Category]) -> Self {
        Self::new("lexicon-semantic", categories, LexiconMode::Softmax)
    }

    /// Lexicon hits per category, in configured order.
    pub fn hits(&self, text: &str) -> Vec<usize> {
        let text = text.to_lowercase();
        self.categories
            .iter()
            .map(|c| lexicon(*c).iter().filter(|k| text.contains(*k)).count())
            .collect()
    }

    fn distribution(&self, hits: &[usize]) -> Vec<f64> {
        let n = hits.len() as f64;
        match self.mode {
            LexiconMode::Smoothed => {
                let total: usize = hits.iter().sum();
                let denom = total as f64 + SMOOTHING * n;
                hits.iter()
                    .map(|&h| (h as f64 + SMOOTHING) / denom)
                    .collect()
            }
            LexiconMode::Softmax => {
                let max = hits.iter().copied().max().unwrap_or(0) as f64;
                let exps: Vec<f64> = hits
                    .iter()
                    .map(|&h| (SOFTMAX_SCALE * (h as f64 - max)).exp())
                    .collect();
                let total: f64 = exps.iter().sum();
                exps.into_iter().map(|e| e / total).collect()
            }
        }
    }
}

impl ClassifierAdapter for LexiconClassifier {
    fn name(&self) -> &str {
        &self.name
    }

    fn classify(&self, text: &str) -> ClassifierResult<ProbabilityVector> {
        if self.categories.is_empty() {
            return Ok(ProbabilityVector::new(Vec::new()));
        }
        Ok(ProbabilityVector::new(self.distribution(&self.hits(text))))
    }
}
