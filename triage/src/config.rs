//! Triage configuration
//!
//! Static configuration shared by the decision engine and anything that
//! renders category knowledge: the category ordering used as the fusion
//! join key, the urgency keyword set, knowledge-base suggestions and the
//! ticket transition policy.
//!
//! Loaded once at process start and passed around as
//! [`SharedTriageConfig`]. Thresholds and fusion weights are constants in
//! [`crate::ensemble`] and [`crate::ticket`], not configuration.
//!
//! # TOML
//!
//! ```toml
//! categories = ["Access", "Administrative rights", "Hardware", "HR Support",
//!               "Internal Project", "Miscellaneous", "Purchase", "Storage"]
//! urgent_keywords = ["urgent", "outage", "down"]
//! transition_policy = "guarded"
//!
//! [suggestions]
//! Hardware = "Power-cycle the device and check the cables first."
//! ```

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::category::Category;
use crate::ticket::TransitionPolicy;

/// Keywords that mark a report as urgent.
pub const DEFAULT_URGENT_KEYWORDS: [&str; 9] = [
    "urgent",
    "broken",
    "emergency",
    "critical",
    "down",
    "outage",
    "crash",
    "severe",
    "flickering",
];

/// Error type for configuration loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Shared reference to an immutable configuration
pub type SharedTriageConfig = Arc<TriageConfig>;

/// Immutable triage configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TriageConfig {
    /// Category ordering. Index `i` of every probability vector refers to
    /// `categories[i]`; must be a permutation of [`Category::ALL`].
    pub categories: Vec<Category>,
    /// Case-insensitive substrings that flag a report as urgent.
    pub urgent_keywords: Vec<String>,
    /// Knowledge-base overrides keyed by category label.
    pub suggestions: BTreeMap<String, String>,
    /// How manual status changes are validated.
    pub transition_policy: TransitionPolicy,
}

impl Default for TriageConfig {
    fn default() -> Self {
        Self {
            categories: Category::ALL.to_vec(),
            urgent_keywords: DEFAULT_URGENT_KEYWORDS
                .iter()
                .map(|k| k.to_string())
                .collect(),
            suggestions: BTreeMap::new(),
            transition_policy: TransitionPolicy::Override,
        }
    }
}

impl TriageConfig {
    /// Load and validate a TOML config file.
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate TOML text. Missing keys fall back to defaults.
    pub fn from_toml_str(content: &str) -> ConfigResult<Self> {
        let config: TriageConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the invariants the engine relies on.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.categories.len() != Category::ALL.len() {
            return Err(ConfigError::Invalid(format!(
                "expected {} categories, got {}",
                Category::ALL.len(),
                self.categories.len()
            )));
        }
        let unique: HashSet<_> = self.categories.iter().collect();
        if unique.len() != self.categories.len() {
            return Err(ConfigError::Invalid(
                "category ordering contains duplicates".to_string(),
            ));
        }

        if self.urgent_keywords.is_empty() {
            return Err(ConfigError::Invalid(
                "urgent_keywords must not be empty".to_string(),
            ));
        }
        if self.urgent_keywords.iter().any(|k| k.trim().is_empty()) {
            return Err(ConfigError::Invalid(
                "urgent_keywords contains a blank entry".to_string(),
            ));
        }

        for label in self.suggestions.keys() {
            label
                .parse::<Category>()
                .map_err(|e| ConfigError::Invalid(format!("suggestions: {e}")))?;
        }

        Ok(())
    }

    /// Wrap in an `Arc` for sharing between the engine and display code.
    pub fn shared(self) -> SharedTriageConfig {
        Arc::new(self)
    }

    /// Number of categories, i.e. the expected probability vector length.
    pub fn category_count(&self) -> usize {
        self.categories.len()
    }

    /// Category at a vector index.
    pub fn category_at(&self, index: usize) -> Option<Category> {
        self.categories.get(index).copied()
    }

    /// Knowledge-base suggestion for a category.
    pub fn suggestion_for(&self, category: Category) -> &str {
        self.suggestions
            .iter()
            .find(|(label, _)| label.parse::<Category>().ok() == Some(category))
            .map(|(_, text)| text.as_str())
            .unwrap_or_else(|| category.default_suggestion())
    }
}
