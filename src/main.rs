//! # Connector Retrieval CLI (`retrieve`)
//!
//! Runs the lexical retrieval core against files on disk.
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `retrieve search "<query>" --records <file>` | Rank a JSON array of records |
//! | `retrieve search "<query>" --text <file>` | Chunk a text file and rank its chunks |
//! | `retrieve chunk <file>` | Print the chunks of a text file |
//!
//! Logging goes to stderr and is controlled by `RUST_LOG`
//! (e.g. `RUST_LOG=connector_retrieval_core=debug`).

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use connector_retrieval::chunk::{self, ChunkArgs};
use connector_retrieval::config;
use connector_retrieval::search::{self, CorpusSource, SearchArgs};
use connector_retrieval_core::options::SortBy;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Connector Retrieval — BM25 search over connector records and
/// boundary-aware text chunking.
#[derive(Parser)]
#[command(
    name = "retrieve",
    about = "BM25 search over connector records and boundary-aware text chunking",
    version
)]
struct Cli {
    /// Path to a TOML configuration file.
    ///
    /// Optional. Without it, built-in defaults are used for both the
    /// `[search]` and `[chunking]` sections.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print machine-readable JSON instead of text.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rank records (or chunks of a text file) against a query.
    ///
    /// An empty query returns every record at score 0 in input order.
    Search {
        /// The search query string.
        query: String,

        #[command(flatten)]
        source: SourceArgs,

        /// Comma-separated field paths to index (e.g. `title,fields.summary`).
        #[arg(long, value_delimiter = ',')]
        fields: Option<Vec<String>>,

        /// Maximum number of results to return.
        #[arg(long)]
        limit: Option<usize>,

        /// Minimum score for a result to be shown.
        #[arg(long)]
        threshold: Option<f64>,

        /// Sort by a record property instead of score: `field` or `field DESC`.
        #[arg(long)]
        sort_by: Option<SortBy>,

        /// Show which query terms each result contains.
        #[arg(long)]
        matches: bool,
    },

    /// Split a text file into overlapping, size-bounded chunks.
    Chunk {
        /// Text file to chunk.
        path: PathBuf,

        /// Maximum chunk length in characters.
        #[arg(long)]
        max_chunk_size: Option<usize>,

        /// Minimum chunk length in characters (smaller chunks are merged).
        #[arg(long)]
        min_chunk_size: Option<usize>,

        /// Approximate overlap between adjacent chunks, in characters.
        #[arg(long)]
        overlap_size: Option<usize>,
    },
}

#[derive(Args)]
#[group(required = true, multiple = false)]
struct SourceArgs {
    /// JSON file containing an array of records.
    #[arg(long)]
    records: Option<PathBuf>,

    /// Plain-text file to chunk and search.
    #[arg(long)]
    text: Option<PathBuf>,
}

impl SourceArgs {
    fn into_source(self) -> CorpusSource {
        match (self.records, self.text) {
            (Some(path), _) => CorpusSource::Records(path),
            (None, Some(path)) => CorpusSource::Text(path),
            // clap enforces exactly one of the two
            (None, None) => unreachable!(),
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let cfg = config::load_or_default(cli.config.as_deref())?;

    match cli.command {
        Commands::Search {
            query,
            source,
            fields,
            limit,
            threshold,
            sort_by,
            matches,
        } => {
            let args = SearchArgs {
                query,
                source: source.into_source(),
                fields,
                limit,
                threshold,
                sort_by,
                matches,
            };
            search::run_search(&cfg, &args, cli.json)?;
        }
        Commands::Chunk {
            path,
            max_chunk_size,
            min_chunk_size,
            overlap_size,
        } => {
            let args = ChunkArgs {
                max_chunk_size,
                min_chunk_size,
                overlap_size,
            };
            chunk::run_chunk(&cfg, &path, &args, cli.json)?;
        }
    }

    Ok(())
}
