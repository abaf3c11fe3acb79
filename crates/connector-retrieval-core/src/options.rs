//! Search and chunking options.
//!
//! Both option structs deserialize with every field defaulted, so a
//! partial TOML or JSON table is enough. Contract violations are caught by
//! `validate()`, which callers run before building or querying.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

use crate::bm25::{DEFAULT_B, DEFAULT_K1};

/// Sort direction for [`SortBy`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

/// Sort results by a record property instead of score.
///
/// Parsed from `"field"`, `"field ASC"`, or `"field DESC"`; the keyword is
/// case-insensitive and `field` may be a dotted path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SortBy {
    pub field: String,
    pub order: SortOrder,
}

impl SortBy {
    pub fn asc(field: &str) -> Self {
        Self {
            field: field.to_string(),
            order: SortOrder::Asc,
        }
    }

    pub fn desc(field: &str) -> Self {
        Self {
            field: field.to_string(),
            order: SortOrder::Desc,
        }
    }
}

impl FromStr for SortBy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.split_whitespace().collect();
        match parts.as_slice() {
            [field] => Ok(Self::asc(field)),
            [field, dir] if dir.eq_ignore_ascii_case("asc") => Ok(Self::asc(field)),
            [field, dir] if dir.eq_ignore_ascii_case("desc") => Ok(Self::desc(field)),
            _ => bail!(
                "Invalid sort specification: '{}'. Use '<field>', '<field> ASC', or '<field> DESC'.",
                s
            ),
        }
    }
}

impl TryFrom<String> for SortBy {
    type Error = anyhow::Error;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<SortBy> for String {
    fn from(s: SortBy) -> Self {
        s.to_string()
    }
}

impl fmt::Display for SortBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.order {
            SortOrder::Asc => write!(f, "{}", self.field),
            SortOrder::Desc => write!(f, "{} DESC", self.field),
        }
    }
}

/// Index and query configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchOptions {
    /// Field paths to index. `None` or empty indexes every string leaf.
    pub fields: Option<Vec<String>>,
    /// Minimum score for a result to be kept.
    pub threshold: f64,
    /// Maximum results returned.
    pub max_results: usize,
    pub case_sensitive: bool,
    pub k1: f64,
    pub b: f64,
    /// Per-field weight overrides, keyed by full path or leaf name.
    pub boost: HashMap<String, f64>,
    pub sort_by: Option<SortBy>,
    /// Report which query terms each result contains.
    pub include_matches: bool,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            fields: None,
            threshold: 0.0,
            max_results: 50,
            case_sensitive: false,
            k1: DEFAULT_K1,
            b: DEFAULT_B,
            boost: HashMap::new(),
            sort_by: None,
            include_matches: false,
        }
    }
}

impl SearchOptions {
    pub fn validate(&self) -> Result<()> {
        if !self.k1.is_finite() || self.k1 < 0.0 {
            bail!("k1 must be a finite number >= 0 (got {})", self.k1);
        }
        if !self.b.is_finite() || !(0.0..=1.0).contains(&self.b) {
            bail!("b must be in [0.0, 1.0] (got {})", self.b);
        }
        if !self.threshold.is_finite() {
            bail!("threshold must be finite (got {})", self.threshold);
        }
        if self.max_results == 0 {
            bail!("max_results must be >= 1");
        }
        for (field, weight) in &self.boost {
            if !weight.is_finite() || *weight < 0.0 {
                bail!("boost for '{}' must be a finite number >= 0 (got {})", field, weight);
            }
        }
        Ok(())
    }

    /// Apply per-query overrides on top of these options.
    pub fn with_overrides(&self, overrides: &SearchOverrides) -> Self {
        let mut opts = self.clone();
        if let Some(threshold) = overrides.threshold {
            opts.threshold = threshold;
        }
        if let Some(max_results) = overrides.max_results {
            opts.max_results = max_results;
        }
        if let Some(ref sort_by) = overrides.sort_by {
            opts.sort_by = Some(sort_by.clone());
        }
        if let Some(include_matches) = overrides.include_matches {
            opts.include_matches = include_matches;
        }
        opts
    }
}

/// Query-time settings that do not require rebuilding the index.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchOverrides {
    pub threshold: Option<f64>,
    pub max_results: Option<usize>,
    pub sort_by: Option<SortBy>,
    pub include_matches: Option<bool>,
}

/// Chunker configuration. Sizes are in characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkOptions {
    pub max_chunk_size: usize,
    pub min_chunk_size: usize,
    /// Approximate overlap carried between adjacent chunks. Converted to
    /// `overlap_size / 10` words.
    pub overlap_size: usize,
}

impl Default for ChunkOptions {
    fn default() -> Self {
        Self {
            max_chunk_size: 1000,
            min_chunk_size: 250,
            overlap_size: 150,
        }
    }
}

impl ChunkOptions {
    pub fn validate(&self) -> Result<()> {
        if self.max_chunk_size == 0 {
            bail!("max_chunk_size must be > 0");
        }
        if self.min_chunk_size > self.max_chunk_size {
            bail!(
                "min_chunk_size ({}) must not exceed max_chunk_size ({})",
                self.min_chunk_size,
                self.max_chunk_size
            );
        }
        Ok(())
    }

    /// Words of trailing context carried into the next chunk.
    pub fn overlap_words(&self) -> usize {
        self.overlap_size / 10
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let o = SearchOptions::default();
        assert_eq!(o.max_results, 50);
        assert_eq!(o.threshold, 0.0);
        assert_eq!(o.k1, 1.2);
        assert_eq!(o.b, 0.75);
        assert!(!o.case_sensitive);
        assert!(o.validate().is_ok());

        let c = ChunkOptions::default();
        assert_eq!((c.max_chunk_size, c.min_chunk_size, c.overlap_size), (1000, 250, 150));
        assert_eq!(c.overlap_words(), 15);
    }

    #[test]
    fn test_validate_rejects_bad_params() {
        let bad = [
            SearchOptions { k1: -0.1, ..Default::default() },
            SearchOptions { b: -0.5, ..Default::default() },
            SearchOptions { b: 1.5, ..Default::default() },
            SearchOptions { threshold: f64::NAN, ..Default::default() },
            SearchOptions { max_results: 0, ..Default::default() },
        ];
        for opts in bad {
            assert!(opts.validate().is_err(), "{:?} should be rejected", opts);
        }

        let mut boost = HashMap::new();
        boost.insert("title".to_string(), -1.0);
        let opts = SearchOptions { boost, ..Default::default() };
        let err = opts.validate().unwrap_err().to_string();
        assert!(err.contains("title"));
    }

    #[test]
    fn test_chunk_validate() {
        assert!(ChunkOptions { max_chunk_size: 0, ..Default::default() }.validate().is_err());
        assert!(ChunkOptions { min_chunk_size: 2000, ..Default::default() }.validate().is_err());
    }

    #[test]
    fn test_sort_by_parse() {
        assert_eq!("priority".parse::<SortBy>().unwrap(), SortBy::asc("priority"));
        assert_eq!("created desc".parse::<SortBy>().unwrap(), SortBy::desc("created"));
        assert_eq!("a.b ASC".parse::<SortBy>().unwrap(), SortBy::asc("a.b"));
        assert!("".parse::<SortBy>().is_err());
        assert!("a b c".parse::<SortBy>().is_err());
        assert!("a sideways".parse::<SortBy>().is_err());
    }

    #[test]
    fn test_deserialize_partial() {
        let opts: SearchOptions = serde_json::from_str(
            r#"{"max_results": 5, "sort_by": "updated DESC", "boost": {"title": 2.0}}"#,
        )
        .unwrap();
        assert_eq!(opts.max_results, 5);
        assert_eq!(opts.sort_by, Some(SortBy::desc("updated")));
        assert_eq!(opts.boost.get("title"), Some(&2.0));
        assert_eq!(opts.k1, 1.2);
    }

    #[test]
    fn test_overrides() {
        let base = SearchOptions::default();
        let o = SearchOverrides {
            max_results: Some(3),
            include_matches: Some(true),
            ..Default::default()
        };
        let merged = base.with_overrides(&o);
        assert_eq!(merged.max_results, 3);
        assert!(merged.include_matches);
        assert_eq!(merged.threshold, base.threshold);
    }
}
