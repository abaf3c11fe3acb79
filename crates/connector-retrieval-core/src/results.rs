//! Result assembly: threshold filter, ordering, truncation.

use std::cmp::Ordering;

use serde::Serialize;
use serde_json::Number;

use crate::options::{SortBy, SortOrder};
use crate::value::{Record, Value};

/// A ranked record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResult {
    pub item: Record,
    pub score: f64,
    /// Distinct query terms present in the document (when requested).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matches: Option<Vec<String>>,
}

/// Score for one document before assembly.
#[derive(Debug, Clone)]
pub struct ScoredDoc {
    /// Position of the record in the input sequence.
    pub id: usize,
    pub score: f64,
    pub matches: Option<Vec<String>>,
}

/// Keep docs with `score >= threshold`, order them, and truncate.
///
/// Default order is score descending with input order breaking ties.
/// With `sort_by`, the named record property decides the order instead;
/// records missing the property sort last in either direction.
pub fn assemble(
    mut scored: Vec<ScoredDoc>,
    records: &[Record],
    threshold: f64,
    max_results: usize,
    sort_by: Option<&SortBy>,
) -> Vec<SearchResult> {
    scored.retain(|d| d.score >= threshold);

    match sort_by {
        None => scored.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(Ordering::Equal)
                .then(a.id.cmp(&b.id))
        }),
        Some(sort) => scored.sort_by(|a, b| {
            let va = records.get(a.id).and_then(|r| r.get_path(&sort.field));
            let vb = records.get(b.id).and_then(|r| r.get_path(&sort.field));
            compare_property(va, vb, sort.order).then(a.id.cmp(&b.id))
        }),
    }

    scored.truncate(max_results);

    scored
        .into_iter()
        .filter_map(|d| {
            records.get(d.id).map(|item| SearchResult {
                item: item.clone(),
                score: d.score,
                matches: d.matches,
            })
        })
        .collect()
}

/// Every record at score 0 in input order, used when the query has no
/// usable terms.
pub fn identity(records: &[Record], max_results: usize, with_matches: bool) -> Vec<SearchResult> {
    records
        .iter()
        .take(max_results)
        .map(|item| SearchResult {
            item: item.clone(),
            score: 0.0,
            matches: with_matches.then(Vec::new),
        })
        .collect()
}

fn compare_property(a: Option<&Value>, b: Option<&Value>, order: SortOrder) -> Ordering {
    let a = a.filter(|v| !matches!(v, Value::Null));
    let b = b.filter(|v| !matches!(v, Value::Null));
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(a), Some(b)) => {
            let ord = compare_values(a, b);
            match order {
                SortOrder::Asc => ord,
                SortOrder::Desc => ord.reverse(),
            }
        }
    }
}

fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => compare_numbers(x, y),
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        _ => type_rank(a).cmp(&type_rank(b)),
    }
}

/// Integers compare exactly; anything involving a float goes through `f64`.
fn compare_numbers(x: &Number, y: &Number) -> Ordering {
    if let (Some(a), Some(b)) = (x.as_i64(), y.as_i64()) {
        return a.cmp(&b);
    }
    if let (Some(a), Some(b)) = (x.as_u64(), y.as_u64()) {
        return a.cmp(&b);
    }
    // One side is above i64::MAX and the other is negative.
    match (x.as_i64(), y.as_u64(), x.as_u64(), y.as_i64()) {
        (Some(_), Some(_), _, _) => Ordering::Less,
        (_, _, Some(_), Some(_)) => Ordering::Greater,
        _ => {
            let a = x.as_f64().unwrap_or(f64::NAN);
            let b = y.as_f64().unwrap_or(f64::NAN);
            a.partial_cmp(&b).unwrap_or(Ordering::Equal)
        }
    }
}

/// Mixed-type properties order as bool < number < string < list < map.
fn type_rank(v: &Value) -> u8 {
    match v {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::List(_) => 4,
        Value::Map(_) => 5,
    }
}
