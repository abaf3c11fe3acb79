//! Okapi BM25 scoring.
//!
//! ```text
//! score(D, Q) = Σ idf(t) · tf·(k1 + 1) / (tf + k1·(1 − b + b·dl/avgdl))
//! idf(t)      = ln((N − df + 0.5) / (df + 0.5)), clamped to IDF_EPSILON if ≤ 0
//! ```
//!
//! - `tf`: occurrences of `t` in the document (terms with `tf = 0` are skipped)
//! - `df`: documents containing `t`
//! - `dl`: document length in tokens, `avgdl`: corpus average
//!
//! Every query token contributes, so a term repeated in the query counts
//! once per repetition.

use crate::corpus::{Corpus, Document};

/// Default term-frequency saturation.
pub const DEFAULT_K1: f64 = 1.2;

/// Default length normalization.
pub const DEFAULT_B: f64 = 0.75;

/// IDF used when the raw IDF is not positive (terms in half or more of
/// the corpus).
pub const IDF_EPSILON: f64 = 0.1;

/// BM25 parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bm25 {
    pub k1: f64,
    pub b: f64,
}

impl Default for Bm25 {
    fn default() -> Self {
        Self {
            k1: DEFAULT_K1,
            b: DEFAULT_B,
        }
    }
}

impl Bm25 {
    pub fn new(k1: f64, b: f64) -> Self {
        Self { k1, b }
    }

    /// Inverse document frequency with the epsilon clamp.
    pub fn idf(df: usize, n: usize) -> f64 {
        let df = df as f64;
        let n = n as f64;
        let idf = ((n - df + 0.5) / (df + 0.5)).ln();
        if idf > 0.0 {
            idf
        } else {
            IDF_EPSILON
        }
    }

    /// Contribution of one query term.
    pub fn term_score(&self, tf: usize, df: usize, n: usize, dl: usize, avgdl: f64) -> f64 {
        if tf == 0 {
            return 0.0;
        }
        let tf = tf as f64;
        let length_ratio = if avgdl > 0.0 { dl as f64 / avgdl } else { 0.0 };
        let norm = self.k1 * (1.0 - self.b + self.b * length_ratio);
        Self::idf(df, n) * (tf * (self.k1 + 1.0)) / (tf + norm)
    }

    /// Score `doc` against the query tokens. Never negative.
    pub fn score(&self, query_terms: &[String], doc: &Document, corpus: &Corpus) -> f64 {
        let n = corpus.len();
        let avgdl = corpus.avgdl();
        let dl = doc.len();
        query_terms
            .iter()
            .map(|term| {
                self.term_score(
                    doc.term_frequency(term),
                    corpus.document_frequency(term),
                    n,
                    dl,
                    avgdl,
                )
            })
            .sum()
    }
}
