//! Reads, writes and deletes at a [`PathExpression`] inside a root value.
//!
//! Writes materialize missing structure: a key step turns a Null into an
//! object, an index step turns a Null into a vector padded with Nulls up
//! to the index. A step whose kind disagrees with the container it meets
//! is a type mismatch.

use std::collections::BTreeMap;

use crate::ast::{PathExpression, PathStep};
use crate::error::EvalError;
use crate::value::Value;

fn descend_error(step: &PathStep, found: &Value) -> EvalError {
    match step {
        PathStep::Key(key) => EvalError::type_mismatch(format!(
            "cannot descend into {} with key {key:?}",
            found.type_name()
        )),
        PathStep::Index(index) => EvalError::type_mismatch(format!(
            "cannot descend into {} with index {index}",
            found.type_name()
        )),
    }
}

/// Resolve `path` inside `root`. The empty path addresses the root.
pub fn get(root: &Value, path: &PathExpression) -> Result<Value, EvalError> {
    let mut current = root;
    for step in &path.steps {
        current = match (step, current) {
            (PathStep::Key(key), Value::Object(entries)) => entries
                .get(key)
                .ok_or_else(|| EvalError::path_not_found(format!("no such key {key:?}")))?,
            (PathStep::Index(index), Value::Vector(elements)) => elements
                .get(*index)
                .ok_or_else(|| EvalError::path_not_found(format!("index {index} out of range")))?,
            (step, found) => return Err(descend_error(step, found)),
        };
    }
    Ok(current.clone())
}

/// Returns a new root with the value at `path` replaced by `new_value`.
/// `set(root, [], v)` is `v`.
pub fn set(mut root: Value, path: &PathExpression, new_value: Value) -> Result<Value, EvalError> {
    set_at(&mut root, &path.steps, new_value)?;
    Ok(root)
}

fn set_at(current: &mut Value, steps: &[PathStep], new_value: Value) -> Result<(), EvalError> {
    let Some((step, rest)) = steps.split_first() else {
        *current = new_value;
        return Ok(());
    };

    match step {
        PathStep::Key(key) => {
            if matches!(current, Value::Null) {
                *current = Value::Object(BTreeMap::new());
            }
            let Value::Object(entries) = current else {
                return Err(descend_error(step, current));
            };
            let slot = entries.entry(key.clone()).or_insert(Value::Null);
            set_at(slot, rest, new_value)
        }
        PathStep::Index(index) => {
            if matches!(current, Value::Null) {
                *current = Value::Vector(Vec::new());
            }
            let Value::Vector(elements) = current else {
                return Err(descend_error(step, current));
            };
            if elements.len() <= *index {
                elements.resize(index + 1, Value::Null);
            }
            set_at(&mut elements[*index], rest, new_value)
        }
    }
}

/// Returns a new root with the terminal key/index of `path` removed.
/// Containers on the way are retained as-is, possibly left empty.
pub fn delete(mut root: Value, path: &PathExpression) -> Result<Value, EvalError> {
    if path.steps.is_empty() {
        return Err(EvalError::type_mismatch("cannot delete the root value"));
    }
    delete_at(&mut root, &path.steps)?;
    Ok(root)
}

fn delete_at(current: &mut Value, steps: &[PathStep]) -> Result<(), EvalError> {
    let (step, rest) = steps.split_first().expect("path checked non-empty");

    if rest.is_empty() {
        return match (step, &mut *current) {
            (PathStep::Key(key), Value::Object(entries)) => {
                entries
                    .remove(key)
                    .ok_or_else(|| EvalError::path_not_found(format!("no such key {key:?}")))?;
                Ok(())
            }
            (PathStep::Index(index), Value::Vector(elements)) => {
                if *index >= elements.len() {
                    return Err(EvalError::path_not_found(format!("index {index} out of range")));
                }
                elements.remove(*index);
                Ok(())
            }
            (step, found) => Err(descend_error(step, found)),
        };
    }

    let next = match (step, current) {
        (PathStep::Key(key), Value::Object(entries)) => entries
            .get_mut(key)
            .ok_or_else(|| EvalError::path_not_found(format!("no such key {key:?}")))?,
        (PathStep::Index(index), Value::Vector(elements)) => {
            let len = elements.len();
            elements
                .get_mut(*index)
                .ok_or_else(|| EvalError::path_not_found(format!("index {index} out of range (len {len})")))?
        }
        (step, found) => return Err(descend_error(step, found)),
    };
    delete_at(next, rest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EvalErrorKind;
    use serde_json::json;

    fn path(steps: Vec<PathStep>) -> PathExpression {
        PathExpression::new(steps)
    }

    fn key(k: &str) -> PathStep {
        PathStep::Key(k.into())
    }

    #[test]
    fn get_walks_keys_and_indexes() {
        let root = Value::from(json!({"users": [{"name": "ada"}]}));
        let value = get(
            &root,
            &path(vec![key("users"), PathStep::Index(0), key("name")]),
        )
        .unwrap();
        assert_eq!(value, Value::from("ada"));

        let err = get(&root, &path(vec![key("missing")])).unwrap_err();
        assert_eq!(err.kind, EvalErrorKind::PathNotFound);

        let err = get(&root, &path(vec![key("users"), key("name")])).unwrap_err();
        assert_eq!(err.kind, EvalErrorKind::TypeMismatch);
    }

    #[test]
    fn empty_path_addresses_the_root() {
        let root = Value::from(json!({"a": 1}));
        assert_eq!(get(&root, &path(vec![])).unwrap(), root);
        assert_eq!(
            set(root, &path(vec![]), Value::Int(7)).unwrap(),
            Value::Int(7)
        );
    }

    #[test]
    fn set_materializes_objects_through_nulls() {
        let root = Value::from(json!({}));
        let updated = set(root, &path(vec![key("a"), key("b"), key("c")]), Value::Int(7)).unwrap();
        assert_eq!(updated, Value::from(json!({"a": {"b": {"c": 7}}})));
    }

    #[test]
    fn set_materializes_vectors_padded_with_nulls() {
        let root = Value::Null;
        let updated = set(root, &path(vec![PathStep::Index(2)]), Value::from("x")).unwrap();
        assert_eq!(updated, Value::from(json!([null, null, "x"])));
    }

    #[test]
    fn set_rejects_conflicting_container_kinds() {
        let root = Value::from(json!({"a": [1, 2]}));
        let err = set(root, &path(vec![key("a"), key("b")]), Value::Int(1)).unwrap_err();
        assert_eq!(err.kind, EvalErrorKind::TypeMismatch);
    }

    #[test]
    fn delete_removes_the_terminal_step_only() {
        let root = Value::from(json!({"a": {"b": 1, "c": 2}, "xs": [1, 2, 3]}));

        let updated = delete(root.clone(), &path(vec![key("a"), key("b")])).unwrap();
        assert_eq!(updated, Value::from(json!({"a": {"c": 2}, "xs": [1, 2, 3]})));

        let updated = delete(root.clone(), &path(vec![key("xs"), PathStep::Index(1)])).unwrap();
        assert_eq!(updated, Value::from(json!({"a": {"b": 1, "c": 2}, "xs": [1, 3]})));

        let err = delete(root, &path(vec![key("a"), key("zzz")])).unwrap_err();
        assert_eq!(err.kind, EvalErrorKind::PathNotFound);
    }

    #[test]
    fn delete_leaves_emptied_containers_in_place() {
        let root = Value::from(json!({"a": {"b": 1}}));
        let updated = delete(root, &path(vec![key("a"), key("b")])).unwrap();
        assert_eq!(updated, Value::from(json!({"a": {}})));
    }
}
