//! Cycle-safe deep mapping over [`Value`] graphs.
//!
//! [`map_deep`] applies a caller-supplied transform to every leaf of an
//! arbitrarily nested value while guaranteeing termination on graphs with
//! back-references. Sequences are rebuilt element by element; records are
//! rewritten in place through their `RefCell`, so every handle to a shared
//! record observes the rewrite.
//!
//! Cycle detection is scoped to the active descent path: a record's
//! identity enters the ancestor set when its fields start processing and
//! leaves it when they finish, on the error path as well. A record
//! encountered while it is its own ancestor is returned as-is (the
//! back-edge stays the same reference and is not reprocessed). A record
//! shared between sibling branches is *not* an ancestor of itself and is
//! processed once per arriving path, so transforms applied to graphs with
//! shared substructure must be idempotent.
//!
//! Recursion depth equals the depth of the input graph; pathologically deep
//! acyclic structures can exhaust the call stack.

use std::convert::Infallible;
use std::rc::Rc;

use rustc_hash::FxHashSet;
use tracing::trace;

use crate::value::{Record, Value};

/// Applies `transform` to every leaf of `value`, returning a value of the
/// same shape. See the module docs for cycle and sharing semantics.
///
/// # Examples
///
/// ```
/// use sundry::{map_deep, Value};
///
/// let input = Value::seq(["a", "b"]);
/// let upper = map_deep(&input, |leaf| match leaf {
///     Value::Str(s) => Value::Str(s.to_uppercase()),
///     other => other,
/// });
/// assert_eq!(upper, Value::seq(["A", "B"]));
/// ```
pub fn map_deep<F>(value: &Value, mut transform: F) -> Value
where
    F: FnMut(Value) -> Value,
{
    let result: Result<Value, Infallible> = try_map_deep(value, |leaf| Ok(transform(leaf)));
    match result {
        Ok(mapped) => mapped,
        Err(never) => match never {},
    }
}

/// Fallible form of [`map_deep`]. The first transform error aborts the
/// traversal and propagates; ancestor bookkeeping added on the current
/// descent path is unwound before the error surfaces. Record fields
/// rewritten before the failure keep their new values.
pub fn try_map_deep<F, E>(value: &Value, mut transform: F) -> Result<Value, E>
where
    F: FnMut(Value) -> Result<Value, E>,
{
    let mut ancestors = FxHashSet::default();
    map_inner(value, &mut transform, &mut ancestors)
}

fn map_inner<F, E>(
    value: &Value,
    transform: &mut F,
    ancestors: &mut FxHashSet<usize>,
) -> Result<Value, E>
where
    F: FnMut(Value) -> Result<Value, E>,
{
    match value {
        Value::Seq(items) => {
            let mut mapped = Vec::with_capacity(items.len());
            for item in items {
                mapped.push(map_inner(item, transform, ancestors)?);
            }
            Ok(Value::Seq(mapped))
        }
        Value::Record(rec) => {
            let id = Record::identity(rec);
            if !ancestors.insert(id) {
                // This record is currently being processed further up the
                // stack: a back-edge. Returning the handle unmodified breaks
                // the cycle.
                trace!(record = id, "skipping record already on the descent path");
                return Ok(Value::Record(Rc::clone(rec)));
            }
            let len = rec.borrow().len();
            let mut outcome = Ok(());
            for index in 0..len {
                // The field value is copied out so no RefCell borrow is held
                // while recursing; a back-edge would otherwise alias it.
                let Some(field) = rec.borrow().field_at(index).map(|(_, v)| v.clone()) else {
                    break;
                };
                match map_inner(&field, transform, ancestors) {
                    Ok(mapped) => rec.borrow_mut().set_value_at(index, mapped),
                    Err(err) => {
                        outcome = Err(err);
                        break;
                    }
                }
            }
            // The identity must leave the set on the error path as well, or a
            // later sibling branch sharing this record would be skipped.
            ancestors.remove(&id);
            outcome?;
            Ok(Value::Record(Rc::clone(rec)))
        }
        leaf => transform(leaf.clone()),
    }
}
