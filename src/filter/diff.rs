// src/filter/diff.rs

//! First-difference comparison of two configuration trees.
//!
//! Only the first difference found is reported: objects are walked in
//! sorted key order, arrays by index, depth first. Callers get one
//! pinpointed change per diff, not a full change set.

use std::collections::BTreeSet;

use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    Changed,
    Added,
    Removed,
}

/// One structural difference between `before` and `after`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Difference {
    pub kind: ChangeKind,
    /// `/`-separated path of object keys and array indices.
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub before: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub after: Option<Value>,
}

impl Difference {
    fn new(kind: ChangeKind, path: &[String], before: Option<&Value>, after: Option<&Value>) -> Self {
        Self {
            kind,
            path: path.join("/"),
            before: before.cloned(),
            after: after.cloned(),
        }
    }
}

/// Return the first difference between two trees, or `None` if equal.
pub fn first_difference(before: &Value, after: &Value) -> Option<Difference> {
    let mut path = Vec::new();
    walk(before, after, &mut path)
}

fn walk(before: &Value, after: &Value, path: &mut Vec<String>) -> Option<Difference> {
    match (before, after) {
        (Value::Object(b), Value::Object(a)) => {
            let keys: BTreeSet<&String> = b.keys().chain(a.keys()).collect();
            for key in keys {
                path.push(key.clone());
                let found = compare_slots(b.get(key), a.get(key), path);
                path.pop();
                if found.is_some() {
                    return found;
                }
            }
            None
        }
        (Value::Array(b), Value::Array(a)) => {
            for index in 0..b.len().max(a.len()) {
                path.push(index.to_string());
                let found = compare_slots(b.get(index), a.get(index), path);
                path.pop();
                if found.is_some() {
                    return found;
                }
            }
            None
        }
        _ if before == after => None,
        _ => Some(Difference::new(
            ChangeKind::Changed,
            path,
            Some(before),
            Some(after),
        )),
    }
}

fn compare_slots(
    before: Option<&Value>,
    after: Option<&Value>,
    path: &mut Vec<String>,
) -> Option<Difference> {
    match (before, after) {
        (Some(b), Some(a)) => walk(b, a, path),
        (Some(b), None) => Some(Difference::new(ChangeKind::Removed, path, Some(b), None)),
        (None, Some(a)) => Some(Difference::new(ChangeKind::Added, path, None, Some(a))),
        (None, None) => None,
    }
}
