//! Record value model.
//!
//! Records arrive from foreign APIs as loosely shaped JSON. [`Value`] is an
//! explicit tagged variant over that data. Containers hold their children
//! behind [`Arc`], so a payload may share sub-trees between records and
//! cloning a record is cheap. The `Arc` pointer doubles as container
//! identity for cycle and duplicate detection during field extraction.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Number;

/// A record is any value; in practice it is a [`Value::Map`].
pub type Record = Value;

/// A semi-structured value.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    /// Kept as parsed, so 64-bit integer ids survive unchanged.
    Number(Number),
    String(String),
    List(Arc<Vec<Value>>),
    Map(Arc<BTreeMap<String, Value>>),
}

/// One step of a parsed field path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum PathStep<'a> {
    Key(&'a str),
    Index(usize),
}

impl Value {
    /// Build a map value from key/value pairs.
    pub fn map<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        Value::Map(Arc::new(
            entries.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        ))
    }

    /// Build a list value.
    pub fn list<I: IntoIterator<Item = Value>>(items: I) -> Self {
        Value::List(Arc::new(items.into_iter().collect()))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => n.as_f64(),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Number(n) => n.as_i64(),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Value::Number(n) => n.as_u64(),
            _ => None,
        }
    }

    /// Look up a direct child of a map.
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Map(m) => m.get(key),
            _ => None,
        }
    }

    /// Resolve a dotted field path with optional `[i]` list indices,
    /// e.g. `fields.assignee.name` or `comments[0].body`.
    ///
    /// Returns `None` for missing keys, out-of-range indices, and
    /// malformed paths.
    pub fn get_path(&self, path: &str) -> Option<&Value> {
        let steps = parse_path(path)?;
        let mut current = self;
        for step in steps {
            current = match (step, current) {
                (PathStep::Key(k), Value::Map(m)) => m.get(k)?,
                (PathStep::Index(i), Value::List(items)) => items.get(i)?,
                _ => return None,
            };
        }
        Some(current)
    }

    /// Identity of a container value, stable for the lifetime of the `Arc`.
    pub(crate) fn container_id(&self) -> Option<usize> {
        match self {
            Value::List(items) => Some(Arc::as_ptr(items) as *const () as usize),
            Value::Map(m) => Some(Arc::as_ptr(m) as *const () as usize),
            _ => None,
        }
    }
}

/// Parse `a.b[2].c` into steps. Empty segments and unterminated or
/// non-numeric brackets are rejected.
pub(crate) fn parse_path(path: &str) -> Option<Vec<PathStep<'_>>> {
    if path.is_empty() {
        return None;
    }
    let mut steps = Vec::new();
    for segment in path.split('.') {
        let (name, mut rest) = match segment.find('[') {
            Some(pos) => (&segment[..pos], &segment[pos..]),
            None => (segment, ""),
        };
        if name.is_empty() && rest.is_empty() {
            return None;
        }
        if !name.is_empty() {
            steps.push(PathStep::Key(name));
        }
        while !rest.is_empty() {
            let close = rest.find(']')?;
            if !rest.starts_with('[') {
                return None;
            }
            let index: usize = rest[1..close].parse().ok()?;
            steps.push(PathStep::Index(index));
            rest = &rest[close + 1..];
        }
    }
    Some(steps)
}

/// Last named segment of a field path, without list indices:
/// `fields.labels[0]` → `labels`.
pub(crate) fn leaf_name(path: &str) -> &str {
    let last = path.rsplit('.').next().unwrap_or(path);
    match last.find('[') {
        Some(pos) => &last[..pos],
        None => last,
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => Value::Number(n),
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => Value::list(items.into_iter().map(Value::from)),
            serde_json::Value::Object(m) => {
                Value::map(m.into_iter().map(|(k, v)| (k, Value::from(v))))
            }
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

/// Non-finite floats have no JSON form and become [`Value::Null`].
impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Number::from_f64(n).map(Value::Number).unwrap_or(Value::Null)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n.into())
    }
}

impl From<u64> for Value {
    fn from(n: u64) -> Self {
        Value::Number(n.into())
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Number(n) => n.serialize(serializer),
            Value::String(s) => serializer.serialize_str(s),
            Value::List(items) => serializer.collect_seq(items.iter()),
            Value::Map(m) => serializer.collect_map(m.iter()),
        }
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        serde_json::Value::deserialize(deserializer).map(Value::from)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match serde_json::to_string(self) {
            Ok(s) => f.write_str(&s),
            Err(_) => Err(fmt::Error),
        }
    }
}
