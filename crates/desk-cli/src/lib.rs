//! Service desk operator CLI
//!
//! Drives the `triage` engine from the command line over a JSON file
//! store. Classifiers are HTTP endpoints when configured, otherwise the
//! offline lexicon models.
//!
//! # Environment
//!
//! | variable | meaning |
//! |---|---|
//! | `SERVICE_DESK_STORE` | JSON store path (default `service-desk.json`) |
//! | `SERVICE_DESK_CONFIG` | triage config TOML |
//! | `SERVICE_DESK_STATISTICAL_URL` | statistical classifier endpoint |
//! | `SERVICE_DESK_SEMANTIC_URL` | semantic classifier endpoint |
//! | `SERVICE_DESK_CLASSIFIER_TIMEOUT_SECS` | HTTP timeout (default 30) |
//!
//! Every variable has a matching global flag that wins over it.

pub mod classifiers;
pub mod cli;
pub mod commands;
pub mod config;
pub mod json_store;

use std::io::Write;

use anyhow::{Context, Result};
use chrono::Utc;
use tracing::debug;
use triage::ServiceDesk;

pub use cli::{Cli, Command};
pub use config::DeskConfig;
pub use json_store::JsonFileStore;

/// Assemble a desk from configuration.
pub fn open_desk(config: &DeskConfig) -> Result<ServiceDesk> {
    let triage_config = config.load_triage_config()?;
    let classifiers = classifiers::build_classifiers(config, &triage_config)?;
    let store = JsonFileStore::open(config.store_path())
        .with_context(|| format!("opening store {}", config.store_path().display()))?;
    debug!(
        store = %config.store_path().display(),
        policy = %triage_config.transition_policy,
        "Service desk ready"
    );
    Ok(ServiceDesk::new(
        triage_config.shared(),
        classifiers,
        std::sync::Arc::new(store),
    ))
}

/// Parse-independent entry point used by `main` and the tests.
pub fn run(cli: Cli, config: DeskConfig, out: &mut dyn Write) -> Result<()> {
    let config = config.with_overrides(cli.overrides());
    let desk = open_desk(&config)?;
    let mut output = commands::Output {
        out,
        json: cli.json,
    };
    commands::execute(&desk, cli.command, Utc::now(), &mut output)
}
