//! `retrieve chunk`: split a text file and print the chunks.

use anyhow::{Context, Result};
use connector_retrieval_core::chunk::{chunk_document, Chunk};
use connector_retrieval_core::options::ChunkOptions;
use serde::Serialize;
use std::path::Path;
use tracing::info;

use crate::config::Config;

/// Per-invocation overrides of the `[chunking]` section.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChunkArgs {
    pub max_chunk_size: Option<usize>,
    pub min_chunk_size: Option<usize>,
    pub overlap_size: Option<usize>,
}

impl ChunkArgs {
    pub fn apply(&self, base: &ChunkOptions) -> ChunkOptions {
        ChunkOptions {
            max_chunk_size: self.max_chunk_size.unwrap_or(base.max_chunk_size),
            min_chunk_size: self.min_chunk_size.unwrap_or(base.min_chunk_size),
            overlap_size: self.overlap_size.unwrap_or(base.overlap_size),
        }
    }
}

#[derive(Serialize)]
struct ChunkOutput<'a> {
    index: usize,
    chars: usize,
    hash: &'a str,
    text: &'a str,
}

pub fn chunk_file(config: &Config, path: &Path, args: &ChunkArgs) -> Result<Vec<Chunk>> {
    let options = args.apply(&config.chunking);
    options.validate()?;
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read text file: {}", path.display()))?;
    let chunks = chunk_document(&text, &options);
    info!(path = %path.display(), chunks = chunks.len(), "chunked file");
    Ok(chunks)
}

pub fn run_chunk(config: &Config, path: &Path, args: &ChunkArgs, json: bool) -> Result<()> {
    let chunks = chunk_file(config, path, args)?;

    if json {
        let out: Vec<ChunkOutput> = chunks
            .iter()
            .map(|c| ChunkOutput {
                index: c.index,
                chars: c.text.chars().count(),
                hash: &c.hash,
                text: &c.text,
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    if chunks.is_empty() {
        println!("No chunks.");
        return Ok(());
    }

    for c in &chunks {
        println!("--- chunk {} ({} chars)", c.index, c.text.chars().count());
        println!("{}", c.text);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_args_override_config() {
        let base = ChunkOptions::default();
        let args = ChunkArgs {
            max_chunk_size: Some(300),
            ..Default::default()
        };
        let merged = args.apply(&base);
        assert_eq!(merged.max_chunk_size, 300);
        assert_eq!(merged.min_chunk_size, base.min_chunk_size);
    }

    #[test]
    fn test_chunk_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("doc.txt");
        let body = (0..40)
            .map(|i| format!("Line {} of the design notes.", i))
            .collect::<Vec<_>>()
            .join("\n\n");
        fs::write(&path, body).unwrap();
        let args = ChunkArgs {
            max_chunk_size: Some(200),
            min_chunk_size: Some(50),
            overlap_size: Some(0),
        };
        let chunks = chunk_file(&Config::default(), &path, &args).unwrap();
        assert!(chunks.len() > 1);
        assert!(chunks.iter().all(|c| c.text.chars().count() <= 200));
    }

    #[test]
    fn test_invalid_override_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("doc.txt");
        fs::write(&path, "text").unwrap();
        let args = ChunkArgs {
            max_chunk_size: Some(10),
            min_chunk_size: Some(20),
            overlap_size: None,
        };
        assert!(chunk_file(&Config::default(), &path, &args).is_err());
    }
}
