//! Build-once, query-many search index.
//!
//! An [`Index`] owns the input records, the tokenized [`Corpus`] derived
//! from them, and the [`SearchOptions`] used to build it. It has no
//! interior mutability, so a built index can be shared across threads
//! (e.g. behind an `Arc`) and queried concurrently. To refresh the corpus,
//! build a new index and swap the reference.
//!
//! # Example
//!
//! ```rust
//! use connector_retrieval_core::index::Index;
//! use connector_retrieval_core::options::SearchOptions;
//! use connector_retrieval_core::value::Value;
//! use serde_json::json;
//!
//! let records = vec![
//!     Value::from(json!({"title": "Reset password", "body": "Use the account page."})),
//!     Value::from(json!({"title": "Billing", "body": "Invoices are monthly."})),
//! ];
//! let index = Index::build(records, SearchOptions::default()).unwrap();
//! let results = index.search("password reset", None).unwrap();
//! assert_eq!(results[0].item.get("title").and_then(Value::as_str), Some("Reset password"));
//! ```

use anyhow::Result;
use tracing::{debug, trace};

use crate::bm25::Bm25;
use crate::chunk::chunk;
use crate::corpus::Corpus;
use crate::fields::{extract_fields, FieldWeighter};
use crate::options::{ChunkOptions, SearchOptions, SearchOverrides};
use crate::results::{assemble, identity, ScoredDoc, SearchResult};
use crate::tokenize::{tokenize, unique_terms};
use crate::value::{Record, Value};

/// Field name used for records synthesized from text chunks.
pub const CHUNK_TEXT_FIELD: &str = "text";

/// Records plus their tokenized corpus.
#[derive(Debug, Clone)]
pub struct Index {
    records: Vec<Record>,
    corpus: Corpus,
    options: SearchOptions,
}

impl Index {
    /// Extract, weight, and tokenize every record.
    ///
    /// Fails only if `options` is invalid.
    pub fn build<I>(records: I, options: SearchOptions) -> Result<Self>
    where
        I: IntoIterator<Item = Record>,
    {
        options.validate()?;

        let records: Vec<Record> = records.into_iter().collect();
        let weighter = FieldWeighter::with_boost(options.boost.clone());
        let fields = options.fields.as_deref();

        let texts = records
            .iter()
            .map(|record| weighter.combine(&extract_fields(record, fields)));
        let corpus = Corpus::build(texts, options.case_sensitive);

        debug!(
            documents = corpus.len(),
            avgdl = corpus.avgdl(),
            vocabulary = corpus.vocabulary_size(),
            "built search index"
        );

        Ok(Self {
            records,
            corpus,
            options,
        })
    }

    /// Chunk `text` and index each chunk as a `{ "text": chunk }` record.
    pub fn from_text(
        text: &str,
        chunk_options: &ChunkOptions,
        options: SearchOptions,
    ) -> Result<Self> {
        chunk_options.validate()?;
        let records = chunk(text, chunk_options)
            .into_iter()
            .map(|c| Value::map([(CHUNK_TEXT_FIELD, Value::String(c))]));
        Self::build(records, options)
    }

    /// Rank records against `query`.
    ///
    /// A query with no usable terms returns every record at score 0 in
    /// input order (up to `max_results`). An empty index returns nothing.
    pub fn search(
        &self,
        query: &str,
        overrides: Option<&SearchOverrides>,
    ) -> Result<Vec<SearchResult>> {
        let opts = match overrides {
            Some(o) => {
                let merged = self.options.with_overrides(o);
                merged.validate()?;
                merged
            }
            None => self.options.clone(),
        };

        let terms = tokenize(query, opts.case_sensitive);
        if terms.is_empty() {
            trace!(records = self.records.len(), "empty query, returning identity");
            return Ok(identity(&self.records, opts.max_results, opts.include_matches));
        }
        if self.corpus.is_empty() {
            return Ok(Vec::new());
        }

        let bm25 = Bm25::new(opts.k1, opts.b);
        let distinct = unique_terms(&terms);
        let scored: Vec<ScoredDoc> = self
            .corpus
            .documents()
            .iter()
            .map(|doc| ScoredDoc {
                id: doc.id,
                score: bm25.score(&terms, doc, &self.corpus),
                matches: opts.include_matches.then(|| {
                    distinct
                        .iter()
                        .filter(|t| doc.contains(t))
                        .cloned()
                        .collect()
                }),
            })
            .collect();

        let results = assemble(
            scored,
            &self.records,
            opts.threshold,
            opts.max_results,
            opts.sort_by.as_ref(),
        );
        trace!(terms = terms.len(), results = results.len(), "search complete");
        Ok(results)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn options(&self) -> &SearchOptions {
        &self.options
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn corpus(&self) -> &Corpus {
        &self.corpus
    }
}

/// Build an [`Index`]; same as [`Index::build`].
pub fn build_index<I>(records: I, options: SearchOptions) -> Result<Index>
where
    I: IntoIterator<Item = Record>,
{
    Index::build(records, options)
}

/// Query an [`Index`]; same as [`Index::search`].
pub fn search(
    index: &Index,
    query: &str,
    overrides: Option<&SearchOverrides>,
) -> Result<Vec<SearchResult>> {
    index.search(query, overrides)
}

/// Build, query, and discard an index, returning only the ranked records.
pub fn search_once<I>(records: I, query: &str, options: SearchOptions) -> Result<Vec<Record>>
where
    I: IntoIterator<Item = Record>,
{
    let index = Index::build(records, options)?;
    Ok(index
        .search(query, None)?
        .into_iter()
        .map(|r| r.item)
        .collect())
}
