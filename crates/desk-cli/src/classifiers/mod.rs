//! Classifier providers for the CLI.
//!
//! Each slot uses its HTTP endpoint when one is configured and the offline
//! lexicon model otherwise.

pub mod http;
pub mod lexicon;

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;
use triage::{ClassifierAdapter, ClassifierPair, TriageConfig};

pub use http::HttpClassifier;
pub use lexicon::{LexiconClassifier, LexiconMode};

use crate::config::DeskConfig;

pub fn build_classifiers(desk: &DeskConfig, triage: &TriageConfig) -> Result<ClassifierPair> {
    let statistical: Arc<dyn ClassifierAdapter> = match &desk.statistical_url {
        Some(url) => Arc::new(
            HttpClassifier::new("statistical", url.as_str(), desk.classifier_timeout)
                .context("building statistical classifier")?,
        ),
        None => Arc::new(LexiconClassifier::statistical(&triage.categories)),
    };
    let semantic: Arc<dyn ClassifierAdapter> = match &desk.semantic_url {
        Some(url) => Arc::new(
            HttpClassifier::new("semantic", url.as_str(), desk.classifier_timeout)
                .context("building semantic classifier")?,
        ),
        None => Arc::new(LexiconClassifier::semantic(&triage.categories)),
    };
    info!(
        statistical = statistical.name(),
        semantic = semantic.name(),
        "Classifiers ready"
    );
    Ok(ClassifierPair::new(statistical, semantic))
}
