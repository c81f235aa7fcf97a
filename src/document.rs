//! Document model: boolean-expression documents, conjunctions and values.
//!
//! A [`Document`] carries one or more [`Conjunction`]s; each conjunction is
//! an AND of per-field [`BoolExpr`]s (`IN` / `NOT IN` a set of values). The
//! whole model derives serde traits so corpora can be loaded straight from
//! JSON.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Document identifier (32 bits).
pub type DocId = u32;

/// A query assignment: field name to the values live in the current context.
pub type Assignment = HashMap<String, Vec<FieldValue>>;

/// Represents a value for a field, on both the document and the query side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Integer value
    Integer(i64),
    /// Floating point value
    Float(f64),
    /// Boolean value
    Boolean(bool),
    /// Text value
    Text(String),
}

impl FieldValue {
    /// Convert to text if this is a text value.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Convert to an integer if this is an integer value.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            FieldValue::Integer(i) => Some(*i),
            _ => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Integer(i) => write!(f, "{i}"),
            FieldValue::Float(v) => write!(f, "{v}"),
            FieldValue::Boolean(b) => write!(f, "{b}"),
            FieldValue::Text(s) => write!(f, "{s}"),
        }
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Integer(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Boolean(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

/// Build a value list from integers.
pub fn int_values<I: IntoIterator<Item = i64>>(values: I) -> Vec<FieldValue> {
    values.into_iter().map(FieldValue::Integer).collect()
}

/// Build a value list from strings.
pub fn str_values<'a, I: IntoIterator<Item = &'a str>>(values: I) -> Vec<FieldValue> {
    values.into_iter().map(FieldValue::from).collect()
}

/// One field predicate: the field's value must (`incl == true`) or must not
/// (`incl == false`) intersect `values`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoolExpr {
    pub incl: bool,
    pub values: Vec<FieldValue>,
}

impl BoolExpr {
    /// Create an inclusive (`IN`) expression.
    pub fn include(values: Vec<FieldValue>) -> Self {
        BoolExpr { incl: true, values }
    }

    /// Create an exclusive (`NOT IN`) expression.
    pub fn exclude(values: Vec<FieldValue>) -> Self {
        BoolExpr {
            incl: false,
            values,
        }
    }
}

/// An AND of per-field boolean expressions.
///
/// A conjunction with no inclusive expressions has size (K) zero and matches
/// every assignment its exclusive expressions do not veto.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Conjunction {
    #[serde(default)]
    pub expressions: HashMap<String, Vec<BoolExpr>>,
}

impl Conjunction {
    /// Create an empty conjunction.
    pub fn new() -> Self {
        Conjunction::default()
    }

    /// Add an `IN` predicate on `field`.
    pub fn include<S: Into<String>>(mut self, field: S, values: Vec<FieldValue>) -> Self {
        self.expressions
            .entry(field.into())
            .or_default()
            .push(BoolExpr::include(values));
        self
    }

    /// Add a `NOT IN` predicate on `field`.
    pub fn exclude<S: Into<String>>(mut self, field: S, values: Vec<FieldValue>) -> Self {
        self.expressions
            .entry(field.into())
            .or_default()
            .push(BoolExpr::exclude(values));
        self
    }

    /// Number of inclusive expressions: the conjunction's K.
    pub fn size(&self) -> usize {
        self.expressions
            .values()
            .flatten()
            .filter(|expr| expr.incl)
            .count()
    }

    /// Whether the conjunction carries no expressions at all.
    pub fn is_empty(&self) -> bool {
        self.expressions.is_empty()
    }
}

/// A document: a target identified by `id`, matched when any of its
/// conjunctions is satisfied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: DocId,
    #[serde(default)]
    pub conjunctions: Vec<Conjunction>,
}

impl Document {
    /// Create a document with no conjunctions yet.
    pub fn new(id: DocId) -> Self {
        Document {
            id,
            conjunctions: Vec::new(),
        }
    }

    /// Append a conjunction.
    pub fn with_conjunction(mut self, conjunction: Conjunction) -> Self {
        self.conjunctions.push(conjunction);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conjunction_size_counts_includes_only() {
        let conj = Conjunction::new()
            .include("age", int_values([1, 2]))
            .include("city", str_values(["sh"]))
            .exclude("tag", str_values(["spam"]));
        assert_eq!(conj.size(), 2);

        let wildcard = Conjunction::new();
        assert_eq!(wildcard.size(), 0);
        assert!(wildcard.is_empty());

        let exclude_only = Conjunction::new().exclude("b", int_values([5]));
        assert_eq!(exclude_only.size(), 0);
        assert!(!exclude_only.is_empty());
    }

    #[test]
    fn test_document_json_round_trip() {
        let doc = Document::new(7).with_conjunction(
            Conjunction::new()
                .include("age", int_values([1, 2, 3]))
                .exclude("city", str_values(["bj"])),
        );
        let json = serde_json::to_string(&doc).unwrap();
        let back: Document = serde_json::from_str(&json).unwrap();
        assert_eq!(doc, back);
    }

    #[test]
    fn test_field_value_untagged_json() {
        let values: Vec<FieldValue> = serde_json::from_str(r#"[1, "sh", true]"#).unwrap();
        assert_eq!(
            values,
            vec![
                FieldValue::Integer(1),
                FieldValue::Text("sh".to_string()),
                FieldValue::Boolean(true),
            ]
        );
    }

    #[test]
    fn test_field_value_display() {
        assert_eq!(FieldValue::Integer(42).to_string(), "42");
        assert_eq!(FieldValue::Text("sh".into()).to_string(), "sh");
        assert_eq!(FieldValue::Boolean(true).to_string(), "true");
    }
}
