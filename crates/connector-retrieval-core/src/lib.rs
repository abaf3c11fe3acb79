//! # Connector Retrieval Core
//!
//! Lexical retrieval shared by the integration connectors: BM25 ranking
//! over arbitrary structured records, and a boundary-aware chunker that
//! turns long text into overlapping, retrieval-sized windows.
//!
//! This crate performs no I/O. It receives already-fetched records or raw
//! text and returns ranked results or chunk lists.
//!
//! ## Pipeline
//!
//! ```text
//! records ──▶ fields (extract + weight) ──┐
//!                                         ├──▶ tokenize ──▶ corpus ──▶ bm25 ──▶ results
//! text ─────▶ chunk ──▶ { text: chunk } ──┘
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`tokenize`] | Case/punctuation normalization |
//! | [`value`] | Record value model |
//! | [`fields`] | Field extraction and weighting |
//! | [`corpus`] | Tokenized documents and corpus statistics |
//! | [`bm25`] | Okapi BM25 scoring |
//! | [`chunk`] | Boundary-aware text chunker |
//! | [`results`] | Threshold, ordering, truncation |
//! | [`options`] | Search and chunk options |
//! | [`index`] | Build-once, query-many index |

pub mod bm25;
pub mod chunk;
pub mod corpus;
pub mod fields;
pub mod index;
pub mod options;
pub mod results;
pub mod tokenize;
pub mod value;

pub use chunk::{chunk, chunk_document, Chunk};
pub use index::{build_index, search, search_once, Index};
pub use options::{ChunkOptions, SearchOptions, SearchOverrides, SortBy, SortOrder};
pub use results::SearchResult;
pub use value::{Record, Value};
