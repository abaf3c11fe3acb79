//! Field extraction and field weighting.
//!
//! A record is flattened into `(path, text)` pairs by [`extract_fields`],
//! then [`FieldWeighter::combine`] folds those pairs into one text blob per
//! document. Important fields are repeated so their terms count more in
//! BM25 term frequency.
//!
//! # Weight rules
//!
//! Rules are matched as case-insensitive substrings of the field path,
//! first match wins:
//!
//! | Pattern | Weight |
//! |---------|--------|
//! | `id`, `key` | 1.8 |
//! | `title`, `name` | 1.5 |
//! | `label`, `tag` | 1.3 |
//! | `description`, `summary` | 1.2 |
//! | anything else | 1.0 |
//!
//! A field's text is repeated `max(1, floor(weight))` times. A caller
//! `boost` entry for the field overrides the rule table.

use std::collections::{HashMap, HashSet};

use crate::value::{leaf_name, Value};

/// Maximum container nesting walked when no field paths are given.
pub const MAX_DEPTH: usize = 10;

/// Weight used when no rule matches.
pub const DEFAULT_WEIGHT: f64 = 1.0;

/// Flatten a record into `(field path, string value)` pairs.
///
/// With `paths`, each path is resolved in the order given and only string
/// values are kept. Without `paths` (or with an empty list), every string
/// leaf is emitted with a synthesized path: map keys joined by `.`, list
/// positions as `[i]`.
///
/// Non-string leaves never contribute. Containers deeper than
/// [`MAX_DEPTH`] are skipped, and a container reachable twice (shared
/// `Arc`) is walked only once.
pub fn extract_fields(record: &Value, paths: Option<&[String]>) -> Vec<(String, String)> {
    match paths {
        Some(paths) if !paths.is_empty() => paths
            .iter()
            .filter_map(|p| {
                record
                    .get_path(p)
                    .and_then(Value::as_str)
                    .map(|s| (p.clone(), s.to_string()))
            })
            .collect(),
        _ => {
            let mut out = Vec::new();
            let mut seen = HashSet::new();
            walk(record, String::new(), 0, &mut seen, &mut out);
            out
        }
    }
}

fn walk(
    value: &Value,
    path: String,
    depth: usize,
    seen: &mut HashSet<usize>,
    out: &mut Vec<(String, String)>,
) {
    if let Some(id) = value.container_id() {
        if depth > MAX_DEPTH || !seen.insert(id) {
            return;
        }
    }

    match value {
        Value::String(s) => out.push((path, s.clone())),
        Value::List(items) => {
            for (i, item) in items.iter().enumerate() {
                walk(item, format!("{}[{}]", path, i), depth + 1, seen, out);
            }
        }
        Value::Map(m) => {
            for (key, child) in m.iter() {
                let child_path = if path.is_empty() {
                    key.clone()
                } else {
                    format!("{}.{}", path, key)
                };
                walk(child, child_path, depth + 1, seen, out);
            }
        }
        Value::Null | Value::Bool(_) | Value::Number(_) => {}
    }
}

/// A `(pattern, weight)` rule matched against lower-cased field paths.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightRule {
    pub pattern: String,
    pub weight: f64,
}

impl WeightRule {
    pub fn new(pattern: &str, weight: f64) -> Self {
        Self {
            pattern: pattern.to_lowercase(),
            weight,
        }
    }
}

/// The built-in rule table, in match order.
pub fn default_rules() -> Vec<WeightRule> {
    vec![
        WeightRule::new("id", 1.8),
        WeightRule::new("key", 1.8),
        WeightRule::new("title", 1.5),
        WeightRule::new("name", 1.5),
        WeightRule::new("label", 1.3),
        WeightRule::new("tag", 1.3),
        WeightRule::new("description", 1.2),
        WeightRule::new("summary", 1.2),
    ]
}

/// Assigns weights to fields and combines them into one text blob.
#[derive(Debug, Clone)]
pub struct FieldWeighter {
    rules: Vec<WeightRule>,
    boost: HashMap<String, f64>,
}

impl Default for FieldWeighter {
    fn default() -> Self {
        Self::new(default_rules(), HashMap::new())
    }
}

impl FieldWeighter {
    pub fn new(rules: Vec<WeightRule>, boost: HashMap<String, f64>) -> Self {
        Self { rules, boost }
    }

    /// Default rules plus caller boosts.
    pub fn with_boost(boost: HashMap<String, f64>) -> Self {
        Self::new(default_rules(), boost)
    }

    /// Weight for a field path.
    ///
    /// Boost lookup tries the full path, then its leaf name. Otherwise the
    /// first rule whose pattern occurs in the lower-cased path wins.
    pub fn weight_for(&self, path: &str) -> f64 {
        if let Some(w) = self
            .boost
            .get(path)
            .or_else(|| self.boost.get(leaf_name(path)))
        {
            return *w;
        }
        let lowered = path.to_lowercase();
        self.rules
            .iter()
            .find(|r| lowered.contains(r.pattern.as_str()))
            .map(|r| r.weight)
            .unwrap_or(DEFAULT_WEIGHT)
    }

    /// How many times a field's text is repeated in the combined blob.
    pub fn repetitions(&self, path: &str) -> usize {
        let weight = self.weight_for(path);
        if weight.is_finite() && weight >= 1.0 {
            weight.floor() as usize
        } else {
            1
        }
    }

    /// Join weighted field texts with single spaces.
    pub fn combine(&self, fields: &[(String, String)]) -> String {
        let mut parts: Vec<&str> = Vec::new();
        for (path, text) in fields {
            if text.trim().is_empty() {
                continue;
            }
            for _ in 0..self.repetitions(path) {
                parts.push(text);
            }
        }
        parts.join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::BTreeMap;
    use std::sync::Arc;

    fn paths(v: &[(String, String)]) -> Vec<&str> {
        v.iter().map(|(p, _)| p.as_str()).collect()
    }

    #[test]
    fn test_walk_emits_string_leaves_only() {
        let record = Value::from(json!({
            "title": "Outage",
            "priority": 2,
            "open": true,
            "owner": null,
            "labels": ["infra", 7],
            "meta": {"team": "sre"}
        }));
        let fields = extract_fields(&record, None);
        assert_eq!(
            paths(&fields),
            vec!["labels[0]", "meta.team", "title"]
        );
        assert_eq!(fields[2].1, "Outage");
    }

    #[test]
    fn test_explicit_paths_in_requested_order() {
        let record = Value::from(json!({
            "title": "Outage",
            "fields": {"summary": "db down", "points": 3}
        }));
        let wanted = vec![
            "fields.summary".to_string(),
            "title".to_string(),
            "fields.points".to_string(),
            "missing".to_string(),
        ];
        let fields = extract_fields(&record, Some(wanted.as_slice()));
        assert_eq!(paths(&fields), vec!["fields.summary", "title"]);
    }

    #[test]
    fn test_empty_path_list_walks_everything() {
        let record = Value::from(json!({"a": "x", "b": {"c": "y"}}));
        assert_eq!(extract_fields(&record, Some(&[][..])).len(), 2);
    }

    #[test]
    fn test_depth_limit() {
        let mut v = Value::from("deep");
        for _ in 0..(MAX_DEPTH + 5) {
            v = Value::map([("n", v)]);
        }
        assert!(extract_fields(&v, None).is_empty());

        let mut shallow = Value::from("ok");
        for _ in 0..3 {
            shallow = Value::map([("n", shallow)]);
        }
        assert_eq!(extract_fields(&shallow, None).len(), 1);
    }

    #[test]
    fn test_shared_container_walked_once() {
        let shared = Value::map([("body", Value::from("shared text"))]);
        let mut m = BTreeMap::new();
        m.insert("a".to_string(), shared.clone());
        m.insert("b".to_string(), shared);
        let record = Value::Map(Arc::new(m));
        let fields = extract_fields(&record, None);
        assert_eq!(paths(&fields), vec!["a.body"]);
    }

    #[test]
    fn test_rule_weights_first_match_wins() {
        let w = FieldWeighter::default();
        assert_eq!(w.weight_for("id"), 1.8);
        assert_eq!(w.weight_for("issueKey"), 1.8);
        assert_eq!(w.weight_for("Title"), 1.5);
        assert_eq!(w.weight_for("fields.labels[0]"), 1.3);
        assert_eq!(w.weight_for("description"), 1.2);
        assert_eq!(w.weight_for("body"), 1.0);
        // "provider" contains "id" and matches the first rule.
        assert_eq!(w.weight_for("provider"), 1.8);
    }

    #[test]
    fn test_boost_overrides_rules() {
        let mut boost = HashMap::new();
        boost.insert("body".to_string(), 3.0);
        boost.insert("fields.summary".to_string(), 2.0);
        let w = FieldWeighter::with_boost(boost);
        assert_eq!(w.weight_for("comments[0].body"), 3.0);
        assert_eq!(w.weight_for("fields.summary"), 2.0);
        assert_eq!(w.repetitions("body"), 3);
    }

    #[test]
    fn test_combine_repeats_by_floor_weight() {
        let mut boost = HashMap::new();
        boost.insert("title".to_string(), 2.9);
        let w = FieldWeighter::with_boost(boost);
        let fields = vec![
            ("title".to_string(), "alpha".to_string()),
            ("id".to_string(), "X-1".to_string()),
            ("body".to_string(), "   ".to_string()),
            ("notes".to_string(), "beta".to_string()),
        ];
        assert_eq!(w.combine(&fields), "alpha alpha X-1 beta");
    }

    #[test]
    fn test_fractional_boost_below_one_still_counts_once() {
        let mut boost = HashMap::new();
        boost.insert("notes".to_string(), 0.2);
        let w = FieldWeighter::with_boost(boost);
        assert_eq!(w.repetitions("notes"), 1);
    }
}
