//! `retrieve search`: load records or text from disk, rank, print.
//!
//! All ranking happens in [`connector_retrieval_core`]; this module only
//! handles file loading, option merging, and output formatting.

use anyhow::{bail, Context, Result};
use connector_retrieval_core::options::{SearchOverrides, SortBy};
use connector_retrieval_core::value::{Record, Value};
use connector_retrieval_core::{Index, SearchResult};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::config::Config;

/// Where the corpus comes from.
#[derive(Debug, Clone)]
pub enum CorpusSource {
    /// JSON array of records.
    Records(PathBuf),
    /// Plain text, chunked before indexing.
    Text(PathBuf),
}

/// Command-line inputs for a search.
#[derive(Debug, Clone)]
pub struct SearchArgs {
    pub query: String,
    pub source: CorpusSource,
    pub fields: Option<Vec<String>>,
    pub limit: Option<usize>,
    pub threshold: Option<f64>,
    pub sort_by: Option<SortBy>,
    pub matches: bool,
}

/// Read a JSON array of records.
pub fn load_records(path: &Path) -> Result<Vec<Record>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read records file: {}", path.display()))?;
    let value: Value = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse records file: {}", path.display()))?;
    match value {
        Value::List(items) => Ok(items.as_ref().clone()),
        _ => bail!(
            "Records file must contain a JSON array of records: {}",
            path.display()
        ),
    }
}

/// Build the index described by `args` and run the query.
pub fn execute_search(config: &Config, args: &SearchArgs) -> Result<Vec<SearchResult>> {
    let mut options = config.search.clone();
    if let Some(ref fields) = args.fields {
        options.fields = Some(fields.clone());
    }

    let index = match &args.source {
        CorpusSource::Records(path) => Index::build(load_records(path)?, options)?,
        CorpusSource::Text(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read text file: {}", path.display()))?;
            Index::from_text(&text, &config.chunking, options)?
        }
    };
    info!(documents = index.len(), "index ready");

    let overrides = SearchOverrides {
        threshold: args.threshold,
        max_results: args.limit,
        sort_by: args.sort_by.clone(),
        include_matches: args.matches.then_some(true),
    };
    index.search(&args.query, Some(&overrides))
}

pub fn run_search(config: &Config, args: &SearchArgs, json: bool) -> Result<()> {
    let results = execute_search(config, args)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&results)?);
        return Ok(());
    }

    if results.is_empty() {
        println!("No results.");
        return Ok(());
    }

    for (i, result) in results.iter().enumerate() {
        println!("{}. [{:.4}] {}", i + 1, result.score, display_title(&result.item));
        if let Some(ref matches) = result.matches {
            println!("    matches: {}", matches.join(", "));
        }
        println!("    item: {}", excerpt(&result.item.to_string(), 240));
        println!();
    }
    Ok(())
}

/// First string among the usual title-like fields.
fn display_title(item: &Record) -> &str {
    ["title", "name", "key", "id", "text"]
        .iter()
        .find_map(|f| item.get(f).and_then(Value::as_str))
        .unwrap_or("(untitled)")
}

fn excerpt(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max_chars).collect();
        format!("{}…", cut)
    }
}
