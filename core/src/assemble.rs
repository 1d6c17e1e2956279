//! Merging of path-keyed assignments into one value.
//!
//! Assignments are applied shallowest first, so a more specific assignment
//! (`--a.b=y`) always overrides the matching part of a broader one
//! (`--a='{"b":"x"}'`) regardless of argv order.

use serde_json::{Map, Value};
use tracing::trace;

use crate::issue::PathKey;

/// A value waiting to be installed at a path.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingAssignment {
    /// Keys from the root.
    pub path: Vec<PathKey>,
    /// The value; `None` leaves the key absent.
    pub value: Option<Value>,
}

impl PendingAssignment {
    /// Creates an assignment.
    pub fn new(path: Vec<PathKey>, value: Option<Value>) -> Self {
        Self { path, value }
    }
}

/// Assembles assignments into a single value.
///
/// Returns `None` when no assignment carried a value.
///
/// # Examples
///
/// ```
/// use argz_core::{PathKey, PendingAssignment, assemble};
/// use serde_json::json;
///
/// let value = assemble(vec![
///     PendingAssignment::new(vec!["a".into(), "b".into()], Some(json!("y"))),
///     PendingAssignment::new(vec!["a".into()], Some(json!({"b": "x", "c": 1}))),
/// ]);
/// assert_eq!(value, Some(json!({"a": {"b": "y", "c": 1}})));
/// ```
pub fn assemble(mut assignments: Vec<PendingAssignment>) -> Option<Value> {
    assignments.sort_by_key(|assignment| assignment.path.len());

    let mut root = None;
    for PendingAssignment { path, value } in assignments {
        match value {
            Some(value) => set_path(&mut root, &path, value),
            None => trace!(path = ?path, "Skipping absent value"),
        }
    }
    root
}

/// Installs `value` at `path`, creating containers along the way.
///
/// Key steps turn the slot into an object and index steps into an array
/// (padded with nulls); any other value in the way is replaced.
pub fn set_path(root: &mut Option<Value>, path: &[PathKey], value: Value) {
    if path.is_empty() {
        *root = Some(value);
        return;
    }
    set_in(root.get_or_insert(Value::Null), path, value);
}

fn set_in(slot: &mut Value, path: &[PathKey], value: Value) {
    let Some((head, rest)) = path.split_first() else {
        *slot = value;
        return;
    };

    let child = match head {
        PathKey::Key(key) => {
            if !slot.is_object() {
                *slot = Value::Object(Map::new());
            }
            let Some(map) = slot.as_object_mut() else {
                return;
            };
            map.entry(key.clone()).or_insert(Value::Null)
        }
        PathKey::Index(index) => {
            if !slot.is_array() {
                *slot = Value::Array(Vec::new());
            }
            let Some(items) = slot.as_array_mut() else {
                return;
            };
            if items.len() <= *index {
                items.resize(index + 1, Value::Null);
            }
            &mut items[*index]
        }
    };

    set_in(child, rest, value);
}
