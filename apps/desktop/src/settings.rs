use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

const ENV_PREFIX: &str = "COMPANION";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SpeechBackend {
    /// Utterances only go to the log.
    #[default]
    Log,
    Espeak,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompanionSettings {
    pub database_url: String,
    /// When set, the guardian directory and panic ledger live on the companion server.
    pub server_url: Option<String>,
    pub speech: SpeechBackend,
    pub notifications_granted: bool,
    pub call_budget_secs: u32,
}

impl Default for CompanionSettings {
    fn default() -> Self {
        Self {
            database_url: default_database_url(),
            server_url: None,
            speech: SpeechBackend::default(),
            notifications_granted: false,
            call_budget_secs: client_core::call::DEFAULT_CALL_BUDGET_SECS,
        }
    }
}

fn default_database_url() -> String {
    let dir = dirs::data_local_dir()
        .map(|dir| dir.join("sahayak"))
        .unwrap_or_else(|| PathBuf::from("./data"));
    format!(
        "sqlite://{}",
        dir.join("companion.db").to_string_lossy().replace('\\', "/")
    )
}

/// Defaults, then `companion.toml` (or `path`), then `COMPANION__*` variables.
pub fn load_settings(path: Option<&Path>) -> Result<CompanionSettings> {
    load_settings_from(path, config::Environment::with_prefix(ENV_PREFIX))
}

fn load_settings_from(
    path: Option<&Path>,
    environment: config::Environment,
) -> Result<CompanionSettings> {
    let mut builder = config::Config::builder()
        .add_source(config::Config::try_from(&CompanionSettings::default())?);

    builder = match path {
        Some(path) => builder.add_source(config::File::from(path).required(true)),
        None => builder.add_source(config::File::with_name("companion").required(false)),
    };

    builder
        .add_source(
            environment
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()
        .context("failed to load companion settings")?
        .try_deserialize()
        .context("invalid companion settings")
}

#[cfg(test)]
#[path = "tests/settings_tests.rs"]
mod tests;
