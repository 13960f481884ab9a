//! TOML configuration for `pgraph`.
//!
//! Every section is optional. When the config file does not exist the
//! built-in defaults are used, so `pgraph` runs with no arguments against a
//! local Memgraph and the standard sample export.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Input file read when none is configured.
pub const DEFAULT_INPUT_PATH: &str = "/workspaces/api/tests/data/us_person_profile.txt";

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub graph: GraphConfig,
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default)]
    pub skills: SkillsConfig,
    #[serde(default)]
    pub ingest: IngestConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct GraphConfig {
    #[serde(default = "default_uri")]
    pub uri: String,
    #[serde(default)]
    pub user: String,
    #[serde(default)]
    pub password: String,
    /// Database name; the server default when unset.
    #[serde(default)]
    pub database: Option<String>,
    #[serde(default = "default_max_connections")]
    pub max_connections: usize,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            uri: default_uri(),
            user: String::new(),
            password: String::new(),
            database: None,
            max_connections: default_max_connections(),
        }
    }
}

fn default_uri() -> String {
    "bolt://memgraph-platform:7687".to_string()
}
fn default_max_connections() -> usize {
    1
}

#[derive(Debug, Deserialize, Clone)]
pub struct InputConfig {
    #[serde(default = "default_input_path")]
    pub path: PathBuf,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            path: default_input_path(),
        }
    }
}

fn default_input_path() -> PathBuf {
    PathBuf::from(DEFAULT_INPUT_PATH)
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct SkillsConfig {
    /// Vocabulary file, one skill per line. The bundled list when unset.
    #[serde(default)]
    pub vocabulary: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct IngestConfig {
    /// Emit a progress event every N lines (the last line always reports).
    #[serde(default = "default_progress_interval")]
    pub progress_interval: u64,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            progress_interval: default_progress_interval(),
        }
    }
}

fn default_progress_interval() -> u64 {
    100
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;
    validate(&config)?;
    Ok(config)
}

/// Load `path` if it exists, otherwise fall back to defaults.
pub fn load_or_default(path: &Path) -> Result<Config> {
    if path.exists() {
        load_config(path)
    } else {
        tracing::info!(path = %path.display(), "config file not found, using defaults");
        Ok(Config::default())
    }
}

fn validate(config: &Config) -> Result<()> {
    if config.graph.uri.trim().is_empty() {
        anyhow::bail!("graph.uri must not be empty");
    }
    if config.graph.max_connections == 0 {
        anyhow::bail!("graph.max_connections must be > 0");
    }
    if config.ingest.progress_interval == 0 {
        anyhow::bail!("ingest.progress_interval must be > 0");
    }
    if config.input.path.as_os_str().is_empty() {
        anyhow::bail!("input.path must not be empty");
    }
    Ok(())
}
