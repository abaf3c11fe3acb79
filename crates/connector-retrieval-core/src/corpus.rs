//! Tokenized corpus and its aggregate statistics.
//!
//! A [`Corpus`] is built once from the combined text of every document and
//! is read-only afterwards. It records the document count `N`, the average
//! document length `avgdl`, and the document frequency of every term.
//!
//! Document frequencies are tabulated at build time instead of rescanning
//! the corpus per query term. The values are exactly
//! `count(docs where t ∈ tokens(doc))`.

use std::collections::{HashMap, HashSet};

use crate::tokenize::tokenize;

/// One tokenized document.
#[derive(Debug, Clone)]
pub struct Document {
    /// Position of the source record in the input sequence.
    pub id: usize,
    /// Combined, weighted text the tokens were derived from.
    pub text: String,
    pub tokens: Vec<String>,
    term_freqs: HashMap<String, usize>,
}

impl Document {
    pub fn new(id: usize, text: String, case_sensitive: bool) -> Self {
        let tokens = tokenize(&text, case_sensitive);
        let mut term_freqs: HashMap<String, usize> = HashMap::new();
        for token in &tokens {
            *term_freqs.entry(token.clone()).or_insert(0) += 1;
        }
        Self {
            id,
            text,
            tokens,
            term_freqs,
        }
    }

    /// Document length in tokens.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn term_frequency(&self, term: &str) -> usize {
        self.term_freqs.get(term).copied().unwrap_or(0)
    }

    pub fn contains(&self, term: &str) -> bool {
        self.term_freqs.contains_key(term)
    }
}

/// Ordered documents plus corpus-level statistics.
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    documents: Vec<Document>,
    avgdl: f64,
    doc_freqs: HashMap<String, usize>,
}

impl Corpus {
    /// Tokenize each text and compute `N`, `avgdl`, and document frequencies.
    ///
    /// Document ids are the position of each text in `texts`.
    pub fn build<I>(texts: I, case_sensitive: bool) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let documents: Vec<Document> = texts
            .into_iter()
            .enumerate()
            .map(|(id, text)| Document::new(id, text, case_sensitive))
            .collect();

        let total_tokens: usize = documents.iter().map(Document::len).sum();
        let avgdl = if documents.is_empty() {
            0.0
        } else {
            total_tokens as f64 / documents.len() as f64
        };

        let mut doc_freqs: HashMap<String, usize> = HashMap::new();
        for doc in &documents {
            let distinct: HashSet<&str> = doc.tokens.iter().map(String::as_str).collect();
            for term in distinct {
                *doc_freqs.entry(term.to_string()).or_insert(0) += 1;
            }
        }

        Self {
            documents,
            avgdl,
            doc_freqs,
        }
    }

    /// Document count `N`.
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Average document length in tokens; `0.0` for an empty corpus.
    pub fn avgdl(&self) -> f64 {
        self.avgdl
    }

    /// Number of documents containing `term` at least once.
    pub fn document_frequency(&self, term: &str) -> usize {
        self.doc_freqs.get(term).copied().unwrap_or(0)
    }

    pub fn vocabulary_size(&self) -> usize {
        self.doc_freqs.len()
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn get(&self, id: usize) -> Option<&Document> {
        self.documents.get(id)
    }
}
