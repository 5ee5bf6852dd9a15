//! Sequence helpers: flattening, grouping, and record plucking.

use rustc_hash::FxHashMap;

use crate::value::Value;

/// Splices one level of nested sequences into the output; non-sequence
/// elements pass through unchanged.
pub fn flatten(items: &[Value]) -> Vec<Value> {
    let mut out = Vec::with_capacity(items.len());
    for item in items {
        match item {
            Value::Seq(inner) => out.extend(inner.iter().cloned()),
            other => out.push(other.clone()),
        }
    }
    out
}

/// Fully flattens nested sequences, depth first. Records are not descended
/// into; they pass through as elements.
pub fn flatten_deep(items: &[Value]) -> Vec<Value> {
    let mut out = Vec::new();
    for item in items {
        match item {
            Value::Seq(inner) => out.extend(flatten_deep(inner)),
            other => out.push(other.clone()),
        }
    }
    out
}

/// Groups elements by a derived string key. Key order is first-seen order
/// and elements keep their relative order within each group.
pub fn group_by<K>(items: &[Value], key_fn: K) -> Vec<(String, Vec<Value>)>
where
    K: Fn(&Value) -> String,
{
    let mut index: FxHashMap<String, usize> = FxHashMap::default();
    let mut groups: Vec<(String, Vec<Value>)> = Vec::new();
    for item in items {
        let key = key_fn(item);
        let slot = match index.get(&key) {
            Some(&slot) => slot,
            None => {
                groups.push((key.clone(), Vec::new()));
                index.insert(key, groups.len() - 1);
                groups.len() - 1
            }
        };
        groups[slot].1.push(item.clone());
    }
    groups
}

/// For each element, the value of the named record field, or `Null` when
/// the element is not a record or lacks the field.
pub fn pluck(items: &[Value], key: &str) -> Vec<Value> {
    items
        .iter()
        .map(|item| match item {
            Value::Record(rec) => rec.borrow().get(key).cloned().unwrap_or(Value::Null),
            _ => Value::Null,
        })
        .collect()
}
