//! Dynamic value model shared by the collection helpers.
//!
//! `Value` is a closed sum type covering everything the helpers traffic in:
//! scalar leaves, ordered sequences with value semantics, and keyed records
//! with reference semantics. Records live behind `Rc<RefCell<..>>` so that a
//! record reachable through several fields is one allocation with one
//! identity, and so that graphs with back-references are representable. The
//! cycle-aware traversals ([`crate::deep::map_deep`], [`Value::to_json`])
//! key their bookkeeping off that allocation identity, never off contents.
//!
//! Derived `Debug` and `PartialEq` walk the structure and assume acyclic
//! input; hand a cyclic graph to the cycle-aware entry points instead.
//! Cloning a `Record` value clones the handle, not the record.

use std::cell::RefCell;
use std::rc::Rc;

use rustc_hash::FxHashSet;
use serde_json::{Map as JsonMap, Number as JsonNumber, Value as JsonValue};
use thiserror::Error;

/// Shared handle to a [`Record`]. Cloning the handle shares the underlying
/// record; the allocation is the record's identity.
pub type RecordRef = Rc<RefCell<Record>>;

/// Errors from converting a [`Value`] graph into another representation.
#[derive(Debug, Error, PartialEq)]
pub enum ValueError {
    /// The conversion descended into a record that is its own ancestor.
    #[error("cannot convert a cyclic record graph")]
    CyclicGraph,
    /// JSON has no representation for NaN or infinite floats.
    #[error("float value {0} has no JSON representation")]
    NonFiniteFloat(f64),
}

/// A keyed container with declaration-ordered fields.
///
/// Iteration yields fields in insertion order; [`Record::insert`] on an
/// existing key overwrites the value without moving the field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: Vec<(String, Value)>,
}

impl Record {
    pub fn new() -> Self {
        Record { fields: Vec::new() }
    }

    /// Wraps the record in a shared, identity-bearing handle.
    pub fn into_shared(self) -> RecordRef {
        Rc::new(RefCell::new(self))
    }

    /// Address-based identity of a shared record handle. Two handles denote
    /// the same record only when they point at the same allocation;
    /// structurally equal records at different addresses are distinct.
    pub fn identity(handle: &RecordRef) -> usize {
        Rc::as_ptr(handle) as usize
    }

    /// Sets `key` to `value`, overwriting in place when the key exists and
    /// appending a new field otherwise.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        let key = key.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Field at `index` in declaration order.
    pub fn field_at(&self, index: usize) -> Option<(&str, &Value)> {
        self.fields.get(index).map(|(k, v)| (k.as_str(), v))
    }

    pub(crate) fn set_value_at(&mut self, index: usize, value: Value) {
        if let Some(slot) = self.fields.get_mut(index) {
            slot.1 = value;
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(k, _)| k.as_str())
    }
}

/// Any value the helpers operate on.
///
/// `Null`, `Bool`, `Int`, `Float`, and `Str` are leaves; `Seq` is an
/// ordered container with value semantics; `Record` is a keyed container
/// with reference semantics (see [`RecordRef`]).
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Seq(Vec<Value>),
    Record(RecordRef),
}

impl Value {
    /// Builds a `Seq` from anything convertible to values.
    pub fn seq<V, I>(items: I) -> Value
    where
        V: Into<Value>,
        I: IntoIterator<Item = V>,
    {
        Value::Seq(items.into_iter().map(Into::into).collect())
    }

    /// Builds a fresh `Record` from key/value pairs.
    pub fn record<K, V, I>(fields: I) -> Value
    where
        K: Into<String>,
        V: Into<Value>,
        I: IntoIterator<Item = (K, V)>,
    {
        let mut record = Record::new();
        for (key, value) in fields {
            record.insert(key, value);
        }
        Value::Record(record.into_shared())
    }

    /// True for every variant that is not a container.
    pub fn is_leaf(&self) -> bool {
        !matches!(self, Value::Seq(_) | Value::Record(_))
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(n) => Some(*n as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_seq(&self) -> Option<&[Value]> {
        match self {
            Value::Seq(items) => Some(items.as_slice()),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&RecordRef> {
        match self {
            Value::Record(rec) => Some(rec),
            _ => None,
        }
    }

    /// Converts parsed JSON into a value graph. JSON objects become fresh
    /// records, so the result is always acyclic.
    pub fn from_json(json: JsonValue) -> Value {
        match json {
            JsonValue::Null => Value::Null,
            JsonValue::Bool(b) => Value::Bool(b),
            JsonValue::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => n.as_f64().map(Value::Float).unwrap_or(Value::Null),
            },
            JsonValue::String(s) => Value::Str(s),
            JsonValue::Array(items) => {
                Value::Seq(items.into_iter().map(Value::from_json).collect())
            }
            JsonValue::Object(map) => {
                let mut record = Record::new();
                for (key, value) in map {
                    record.insert(key, Value::from_json(value));
                }
                Value::Record(record.into_shared())
            }
        }
    }

    /// Renders the graph as JSON. Fails with [`ValueError::CyclicGraph`]
    /// when a record is reachable from itself; shared acyclic records are
    /// rendered once per reference path.
    pub fn to_json(&self) -> Result<JsonValue, ValueError> {
        let mut ancestors = FxHashSet::default();
        self.to_json_inner(&mut ancestors)
    }

    fn to_json_inner(&self, ancestors: &mut FxHashSet<usize>) -> Result<JsonValue, ValueError> {
        match self {
            Value::Null => Ok(JsonValue::Null),
            Value::Bool(b) => Ok(JsonValue::Bool(*b)),
            Value::Int(n) => Ok(JsonValue::Number((*n).into())),
            Value::Float(f) => JsonNumber::from_f64(*f)
                .map(JsonValue::Number)
                .ok_or(ValueError::NonFiniteFloat(*f)),
            Value::Str(s) => Ok(JsonValue::String(s.clone())),
            Value::Seq(items) => items
                .iter()
                .map(|item| item.to_json_inner(ancestors))
                .collect::<Result<Vec<_>, _>>()
                .map(JsonValue::Array),
            Value::Record(rec) => {
                let id = Record::identity(rec);
                if !ancestors.insert(id) {
                    return Err(ValueError::CyclicGraph);
                }
                // Fields are copied out so no RefCell borrow is held while
                // recursing into them.
                let fields: Vec<(String, Value)> = rec
                    .borrow()
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.clone()))
                    .collect();
                let mut map = JsonMap::new();
                let mut outcome = Ok(());
                for (key, value) in fields {
                    match value.to_json_inner(ancestors) {
                        Ok(json) => {
                            map.insert(key, json);
                        }
                        Err(err) => {
                            outcome = Err(err);
                            break;
                        }
                    }
                }
                // The identity must leave the set on the error path too.
                ancestors.remove(&id);
                outcome?;
                Ok(JsonValue::Object(map))
            }
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Value {
        Value::Bool(b)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Value {
        Value::Int(n as i64)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Value {
        Value::Int(n)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Value {
        Value::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Value {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Value {
        Value::Str(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Value {
        Value::Seq(items)
    }
}

impl From<Record> for Value {
    fn from(record: Record) -> Value {
        Value::Record(record.into_shared())
    }
}

impl From<RecordRef> for Value {
    fn from(handle: RecordRef) -> Value {
        Value::Record(handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_overwrites_in_place() {
        let mut record = Record::new();
        record.insert("a", 1);
        record.insert("b", 2);
        record.insert("a", 3);

        assert_eq!(record.len(), 2);
        assert_eq!(record.get("a"), Some(&Value::Int(3)));
        assert_eq!(record.keys().collect::<Vec<_>>(), vec!["a", "b"]);
    }

    #[test]
    fn test_identity_distinguishes_equal_records() {
        let a = Record::new().into_shared();
        let b = Record::new().into_shared();

        assert_eq!(*a.borrow(), *b.borrow());
        assert_ne!(Record::identity(&a), Record::identity(&b));
        assert_eq!(Record::identity(&a), Record::identity(&Rc::clone(&a)));
    }

    #[test]
    fn test_leaf_and_accessor_views() {
        assert!(Value::Null.is_leaf());
        assert!(Value::Str("x".into()).is_leaf());
        assert!(!Value::Seq(vec![]).is_leaf());
        assert!(!Value::record([("k", 1)]).is_leaf());

        assert_eq!(Value::Bool(true).as_bool(), Some(true));
        assert_eq!(Value::Int(7).as_f64(), Some(7.0));
        assert_eq!(Value::Float(1.5).as_f64(), Some(1.5));
        assert_eq!(Value::Str("s".into()).as_str(), Some("s"));
        assert_eq!(Value::seq([1]).as_seq(), Some(&[Value::Int(1)][..]));
        assert_eq!(Value::Int(7).as_str(), None);
    }

    #[test]
    fn test_json_round_trip() {
        let json: JsonValue =
            serde_json::from_str(r#"{"name":"ada","tags":["x","y"],"score":1.5,"ok":true,"gone":null}"#)
                .unwrap();
        let value = Value::from_json(json.clone());

        let rec = value.as_record().unwrap().borrow().clone();
        assert_eq!(rec.get("name"), Some(&Value::Str("ada".into())));
        assert_eq!(rec.get("score"), Some(&Value::Float(1.5)));
        assert_eq!(rec.get("gone"), Some(&Value::Null));

        assert_eq!(value.to_json().unwrap(), json);
    }

    #[test]
    fn test_to_json_rejects_cycles() {
        let rec = Record::new().into_shared();
        rec.borrow_mut()
            .insert("me", Value::Record(Rc::clone(&rec)));

        assert_eq!(
            Value::Record(rec).to_json(),
            Err(ValueError::CyclicGraph)
        );
    }

    #[test]
    fn test_to_json_allows_shared_records() {
        let shared = Value::record([("v", 1)]);
        let parent = Value::record([("left", shared.clone()), ("right", shared)]);

        let json = parent.to_json().unwrap();
        assert_eq!(json["left"]["v"], 1);
        assert_eq!(json["right"]["v"], 1);
    }

    #[test]
    fn test_to_json_rejects_non_finite_floats() {
        assert!(matches!(
            Value::Float(f64::NAN).to_json(),
            Err(ValueError::NonFiniteFloat(_))
        ));
        assert!(matches!(
            Value::Float(f64::INFINITY).to_json(),
            Err(ValueError::NonFiniteFloat(_))
        ));
    }
}
