//! Access to nested configuration trees by key path.
//!
//! Configuration is kept as a [`serde_json::Value`] tree mirroring the
//! schema. A missing key and an explicit `null` are both treated as
//! "absent": lookups return `None`, and writes create the missing
//! intermediate tables.

use serde_json::{Map, Value};
use thiserror::Error;

/// Errors raised when writing into a configuration tree.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TreeError {
    /// An intermediate value exists but cannot be descended into.
    #[error("cannot descend into '{path}': value is not a table")]
    NotAMapping { path: String },

    /// `set` was called with an empty key path.
    #[error("empty key path")]
    EmptyPath,
}

/// Look up the value at `path`.
///
/// Returns `None` as soon as any key along the way is missing, maps to
/// `null`, or the current value is not a table.
pub fn get<'a, S: AsRef<str>>(tree: &'a Value, path: &[S]) -> Option<&'a Value> {
    let mut cur = tree;
    for key in path {
        cur = cur.as_object()?.get(key.as_ref())?;
        if cur.is_null() {
            return None;
        }
    }
    Some(cur)
}

/// Look up the value at `path`, falling back to `default` when absent.
pub fn get_or<'a, S: AsRef<str>>(tree: &'a Value, path: &[S], default: &'a Value) -> &'a Value {
    get(tree, path).unwrap_or(default)
}

/// Mutable counterpart of [`get`].
pub fn get_mut<'a, S: AsRef<str>>(tree: &'a mut Value, path: &[S]) -> Option<&'a mut Value> {
    let mut cur = tree;
    for key in path {
        cur = cur.as_object_mut()?.get_mut(key.as_ref())?;
        if cur.is_null() {
            return None;
        }
    }
    Some(cur)
}

/// Assign `value` at `path`, creating empty tables for missing steps.
///
/// # Errors
///
/// Returns [`TreeError::NotAMapping`] if an existing intermediate value
/// (or the root) is a scalar or array.
pub fn set<S: AsRef<str>>(tree: &mut Value, path: &[S], value: Value) -> Result<(), TreeError> {
    let Some((last, parents)) = path.split_last() else {
        return Err(TreeError::EmptyPath);
    };

    let mut cur = tree;
    for (depth, key) in parents.iter().enumerate() {
        let table = cur.as_object_mut().ok_or_else(|| not_a_mapping(&path[..depth]))?;
        let slot = table
            .entry(key.as_ref().to_string())
            .or_insert(Value::Null);
        if slot.is_null() {
            *slot = Value::Object(Map::new());
        }
        cur = slot;
    }

    let table = cur
        .as_object_mut()
        .ok_or_else(|| not_a_mapping(parents))?;
    table.insert(last.as_ref().to_string(), value);
    Ok(())
}

/// Check whether `key` of `table` is absent or holds a falsy value.
///
/// Falsy values are `null`, `false`, `0`, the empty string, the empty
/// array and the empty table. Defaults are filled for every falsy field.
pub fn is_empty(table: &Map<String, Value>, key: &str) -> bool {
    match table.get(key) {
        None | Some(Value::Null) => true,
        Some(Value::Bool(b)) => !b,
        Some(Value::Number(n)) => n.as_f64() == Some(0.0),
        Some(Value::String(s)) => s.is_empty(),
        Some(Value::Array(a)) => a.is_empty(),
        Some(Value::Object(o)) => o.is_empty(),
    }
}

fn not_a_mapping<S: AsRef<str>>(path: &[S]) -> TreeError {
    let joined: Vec<&str> = path.iter().map(AsRef::as_ref).collect();
    TreeError::NotAMapping {
        path: if joined.is_empty() {
            "<root>".to_string()
        } else {
            joined.join(".")
        },
    }
}
