use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use triage::TriageConfig;

/// Default location of the JSON ticket store.
pub const DEFAULT_STORE_PATH: &str = "service-desk.json";

/// Default per-request timeout for HTTP classifiers.
pub const DEFAULT_CLASSIFIER_TIMEOUT_SECS: u64 = 30;

/// CLI configuration.
///
/// `Default` reads the environment; command-line flags override it via
/// [`DeskConfig::with_overrides`].
#[derive(Debug, Clone, PartialEq)]
pub struct DeskConfig {
    /// JSON file holding tickets, feedback and comments.
    pub store_path: PathBuf,
    /// Optional TOML triage config; built-in defaults when unset.
    pub triage_config: Option<PathBuf>,
    /// Statistical classifier endpoint. Offline lexicon model when unset.
    pub statistical_url: Option<String>,
    /// Semantic classifier endpoint. Offline lexicon model when unset.
    pub semantic_url: Option<String>,
    pub classifier_timeout: Duration,
}

impl Default for DeskConfig {
    fn default() -> Self {
        Self {
            store_path: std::env::var("SERVICE_DESK_STORE")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_STORE_PATH)),
            triage_config: std::env::var("SERVICE_DESK_CONFIG").ok().map(PathBuf::from),
            statistical_url: non_empty_var("SERVICE_DESK_STATISTICAL_URL"),
            semantic_url: non_empty_var("SERVICE_DESK_SEMANTIC_URL"),
            classifier_timeout: Duration::from_secs(
                std::env::var("SERVICE_DESK_CLASSIFIER_TIMEOUT_SECS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(DEFAULT_CLASSIFIER_TIMEOUT_SECS),
            ),
        }
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Flag values that take precedence over the environment.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub store: Option<PathBuf>,
    pub config: Option<PathBuf>,
    pub statistical_url: Option<String>,
    pub semantic_url: Option<String>,
    pub timeout_secs: Option<u64>,
}

impl DeskConfig {
    pub fn with_overrides(mut self, overrides: ConfigOverrides) -> Self {
        if let Some(store) = overrides.store {
            self.store_path = store;
        }
        if let Some(config) = overrides.config {
            self.triage_config = Some(config);
        }
        if let Some(url) = overrides.statistical_url {
            self.statistical_url = Some(url);
        }
        if let Some(url) = overrides.semantic_url {
            self.semantic_url = Some(url);
        }
        if let Some(secs) = overrides.timeout_secs {
            self.classifier_timeout = Duration::from_secs(secs);
        }
        self
    }

    pub fn store_path(&self) -> &Path {
        &self.store_path
    }

    /// Load the triage config file, or the built-in defaults.
    pub fn load_triage_config(&self) -> Result<TriageConfig> {
        match &self.triage_config {
            Some(path) => TriageConfig::from_file(path)
                .with_context(|| format!("loading triage config {}", path.display())),
            None => Ok(TriageConfig::default()),
        }
    }
}
