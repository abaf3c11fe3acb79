//! TOML configuration for the `retrieve` CLI.
//!
//! Every section is optional; a missing file section falls back to the
//! core defaults.
//!
//! ```toml
//! [search]
//! fields = ["title", "fields.summary"]
//! max_results = 20
//! threshold = 0.5
//! sort_by = "updated DESC"
//!
//! [search.boost]
//! title = 3.0
//!
//! [chunking]
//! max_chunk_size = 1000
//! min_chunk_size = 250
//! overlap_size = 150
//! ```

use anyhow::{Context, Result};
use connector_retrieval_core::options::{ChunkOptions, SearchOptions};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub search: SearchOptions,
    #[serde(default)]
    pub chunking: ChunkOptions,
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

    config
        .search
        .validate()
        .with_context(|| "Invalid [search] section")?;
    config
        .chunking
        .validate()
        .with_context(|| "Invalid [chunking] section")?;

    Ok(config)
}

/// Load `path` when given, otherwise use defaults.
pub fn load_or_default(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(p) => load_config(p),
        None => Ok(Config::default()),
    }
}
