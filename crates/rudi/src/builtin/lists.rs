//! Collection helpers and the controlled iteration constructs.
//!
//! `range`, `map` and `filter` bind their loop variables in a child
//! scope, so the caller's bindings are untouched once the loop ends.
//! Iteration is index order for vectors and key order for objects.

use std::collections::BTreeMap;

use crate::ast::{Expression, Shim, Symbol, SymbolKind};
use crate::context::{BasicFunction, Context, Functions};
use crate::error::EvalError;
use crate::eval;
use crate::value::Value;

use super::{at_least, between, exactly};

pub fn functions() -> Functions {
    let mut funcs = Functions::new();
    funcs.set(
        "len",
        BasicFunction::new(len_function, "returns the length of a string, vector or object"),
    );
    funcs.set(
        "append",
        BasicFunction::new(append_function, "appends more strings to a string or arbitrary items to a vector"),
    );
    funcs.set(
        "prepend",
        BasicFunction::new(prepend_function, "prepends more strings to a string or arbitrary items to a vector"),
    );
    funcs.set(
        "reverse",
        BasicFunction::new(reverse_function, "reverses a string or the elements of a vector"),
    );
    funcs.set(
        "contains?",
        BasicFunction::new(
            contains_function,
            "returns true if a string contains a substring or a vector contains the given element",
        ),
    );
    funcs.set(
        "range",
        BasicFunction::new(range_function, "iterates over a vector or object, returning the last body value"),
    );
    funcs.set(
        "map",
        BasicFunction::new(map_function, "applies an expression to every element in a vector or object"),
    );
    funcs.set(
        "filter",
        BasicFunction::new(
            filter_function,
            "returns a copy of a vector/object with only the elements that satisfy a condition",
        ),
    );
    funcs
}

fn len_function(ctx: &Context, args: &[Expression]) -> Result<Value, EvalError> {
    exactly("len", args, 1)?;
    let value = eval::eval_expression(ctx, &args[0])?;
    let len = match &value {
        Value::String(s) => s.chars().count(),
        Value::Vector(elements) => elements.len(),
        Value::Object(entries) => entries.len(),
        other => {
            return Err(
                EvalError::type_mismatch(format!("len: cannot measure {}", other.type_name()))
                    .at(args[0].pos()),
            )
        }
    };
    Ok(Value::Int(len as i64))
}

fn append_function(ctx: &Context, args: &[Expression]) -> Result<Value, EvalError> {
    at_least("append", args, 2)?;
    let base = eval::eval_expression(ctx, &args[0])?;
    let rest = eval::eval_args(ctx, &args[1..])?;

    match base {
        Value::Vector(mut elements) => {
            elements.extend(rest);
            Ok(Value::Vector(elements))
        }
        Value::Null => Ok(Value::Vector(rest)),
        Value::String(mut s) => {
            for value in &rest {
                s.push_str(&ctx.coalesce().to_string(value)?);
            }
            Ok(Value::String(s))
        }
        other => Err(EvalError::type_mismatch(format!(
            "append: cannot append to {}",
            other.type_name()
        ))
        .at(args[0].pos())),
    }
}

fn prepend_function(ctx: &Context, args: &[Expression]) -> Result<Value, EvalError> {
    at_least("prepend", args, 2)?;
    let base = eval::eval_expression(ctx, &args[0])?;
    let rest = eval::eval_args(ctx, &args[1..])?;

    match base {
        Value::Vector(elements) => {
            let mut out = rest;
            out.extend(elements);
            Ok(Value::Vector(out))
        }
        Value::Null => Ok(Value::Vector(rest)),
        Value::String(s) => {
            let mut out = String::new();
            for value in &rest {
                out.push_str(&ctx.coalesce().to_string(value)?);
            }
            out.push_str(&s);
            Ok(Value::String(out))
        }
        other => Err(EvalError::type_mismatch(format!(
            "prepend: cannot prepend to {}",
            other.type_name()
        ))
        .at(args[0].pos())),
    }
}

fn reverse_function(ctx: &Context, args: &[Expression]) -> Result<Value, EvalError> {
    exactly("reverse", args, 1)?;
    let value = eval::eval_expression(ctx, &args[0])?;
    match value {
        Value::String(s) => Ok(Value::String(s.chars().rev().collect())),
        Value::Vector(mut elements) => {
            elements.reverse();
            Ok(Value::Vector(elements))
        }
        other => Err(EvalError::type_mismatch(format!(
            "reverse: cannot reverse {}",
            other.type_name()
        ))
        .at(args[0].pos())),
    }
}

fn contains_function(ctx: &Context, args: &[Expression]) -> Result<Value, EvalError> {
    exactly("contains?", args, 2)?;
    let haystack = eval::eval_expression(ctx, &args[0])?;
    let needle = eval::eval_expression(ctx, &args[1])?;

    match &haystack {
        Value::String(s) => {
            let sub = ctx.coalesce().to_string(&needle).map_err(|e| e.at(args[1].pos()))?;
            Ok(Value::Bool(s.contains(&sub)))
        }
        Value::Vector(elements) => {
            // a failed comparison (wrong variant under this mode) simply
            // does not match
            let found = elements
                .iter()
                .any(|element| ctx.coalesce().equal(element, &needle).unwrap_or(false));
            Ok(Value::Bool(found))
        }
        other => Err(EvalError::type_mismatch(format!(
            "contains?: cannot search {}",
            other.type_name()
        ))
        .at(args[0].pos())),
    }
}

enum Bindings {
    /// `[$value]`
    One(String),
    /// `[$indexOrKey $value]`
    Two(String, String),
}

fn binding_names(name: &str, expr: &Expression) -> Result<Bindings, EvalError> {
    let Expression::Vector(vector) = expr else {
        return Err(EvalError::type_mismatch(format!(
            "{name}: bindings must look like [$item] or [$index $item]"
        ))
        .at(expr.pos()));
    };

    let mut names = Vec::new();
    for element in &vector.elements {
        match element {
            Expression::Symbol(Symbol {
                kind: SymbolKind::Variable(var),
                path: None,
                ..
            }) => names.push(var.clone()),
            other => {
                return Err(EvalError::type_mismatch(format!(
                    "{name}: bindings must be plain variables"
                ))
                .at(other.pos()))
            }
        }
    }

    match names.len() {
        1 => Ok(Bindings::One(names.remove(0))),
        2 => {
            let value = names.remove(1);
            Ok(Bindings::Two(names.remove(0), value))
        }
        n => Err(EvalError::type_mismatch(format!(
            "{name}: expected 1 or 2 bindings, got {n}"
        ))
        .at(expr.pos())),
    }
}

fn scope_for(ctx: &Context, bindings: &Bindings, key: Value, value: Value) -> Context {
    match bindings {
        Bindings::One(var) => ctx.with_variable(var.clone(), value),
        Bindings::Two(key_var, value_var) => ctx
            .with_variable(key_var.clone(), key)
            .with_variable(value_var.clone(), value),
    }
}

fn range_function(ctx: &Context, args: &[Expression]) -> Result<Value, EvalError> {
    exactly("range", args, 3)?;
    let collection = eval::eval_expression(ctx, &args[0])?;
    let bindings = binding_names("range", &args[1])?;
    let body = &args[2];

    let mut result = Value::Null;
    match collection {
        Value::Vector(elements) => {
            for (index, element) in elements.into_iter().enumerate() {
                let scope = scope_for(ctx, &bindings, Value::Int(index as i64), element);
                result = eval::eval_expression(&scope, body)?;
            }
        }
        Value::Object(entries) => {
            for (key, value) in entries {
                let scope = scope_for(ctx, &bindings, Value::String(key), value);
                result = eval::eval_expression(&scope, body)?;
            }
        }
        other => {
            return Err(EvalError::type_mismatch(format!(
                "range: cannot iterate over {}",
                other.type_name()
            ))
            .at(args[0].pos()))
        }
    }
    Ok(result)
}

/// Per-element evaluation shared by `map` and `filter`: either a binding
/// form with a body expression, or a bare function name applied via a
/// shim argument.
enum ElementFn<'a> {
    Body(Bindings, &'a Expression),
    Named(&'a str),
}

impl<'a> ElementFn<'a> {
    fn parse(name: &str, args: &'a [Expression]) -> Result<Self, EvalError> {
        between(name, args, 2, 3)?;
        if args.len() == 3 {
            return Ok(ElementFn::Body(binding_names(name, &args[1])?, &args[2]));
        }
        match &args[1] {
            Expression::Symbol(Symbol {
                kind: SymbolKind::Name { name: func, bang: false },
                path: None,
                ..
            }) => Ok(ElementFn::Named(func.as_str())),
            other => Err(EvalError::type_mismatch(format!(
                "{name}: expected bindings and a body, or a function name"
            ))
            .at(other.pos())),
        }
    }

    fn apply(&self, ctx: &Context, key: Value, value: Value) -> Result<Value, EvalError> {
        match self {
            ElementFn::Body(bindings, body) => {
                let scope = scope_for(ctx, bindings, key, value);
                eval::eval_expression(&scope, body)
            }
            ElementFn::Named(func) => {
                let function = ctx
                    .function(func)
                    .ok_or_else(|| EvalError::unknown_function(func))?;
                function.evaluate(ctx, &[Expression::Shim(Shim { value })])
            }
        }
    }
}

fn map_function(ctx: &Context, args: &[Expression]) -> Result<Value, EvalError> {
    let element_fn = ElementFn::parse("map", args)?;
    let collection = eval::eval_expression(ctx, &args[0])?;

    match collection {
        Value::Vector(elements) => {
            let mut out = Vec::with_capacity(elements.len());
            for (index, element) in elements.into_iter().enumerate() {
                out.push(element_fn.apply(ctx, Value::Int(index as i64), element)?);
            }
            Ok(Value::Vector(out))
        }
        Value::Object(entries) => {
            let mut out = BTreeMap::new();
            for (key, value) in entries {
                let mapped = element_fn.apply(ctx, Value::String(key.clone()), value)?;
                out.insert(key, mapped);
            }
            Ok(Value::Object(out))
        }
        other => Err(EvalError::type_mismatch(format!(
            "map: cannot iterate over {}",
            other.type_name()
        ))
        .at(args[0].pos())),
    }
}

fn filter_function(ctx: &Context, args: &[Expression]) -> Result<Value, EvalError> {
    let element_fn = ElementFn::parse("filter", args)?;
    let collection = eval::eval_expression(ctx, &args[0])?;

    match collection {
        Value::Vector(elements) => {
            let mut out = Vec::new();
            for (index, element) in elements.into_iter().enumerate() {
                let keep = element_fn.apply(ctx, Value::Int(index as i64), element.clone())?;
                if ctx.coalesce().to_bool(&keep).map_err(|e| e.at(args[0].pos()))? {
                    out.push(element);
                }
            }
            Ok(Value::Vector(out))
        }
        Value::Object(entries) => {
            let mut out = BTreeMap::new();
            for (key, value) in entries {
                let keep = element_fn.apply(ctx, Value::String(key.clone()), value.clone())?;
                if ctx.coalesce().to_bool(&keep).map_err(|e| e.at(args[0].pos()))? {
                    out.insert(key, value);
                }
            }
            Ok(Value::Object(out))
        }
        other => Err(EvalError::type_mismatch(format!(
            "filter: cannot iterate over {}",
            other.type_name()
        ))
        .at(args[0].pos())),
    }
}

#[cfg(test)]
mod tests {
    use crate::builtin;
    use crate::context::{Context, Document, Variables};
    use crate::error::{EvalError, EvalErrorKind};
    use crate::eval::run_program;
    use crate::parser::parse;
    use crate::value::Value;
    use serde_json::json;

    fn run(source: &str, document: serde_json::Value) -> Result<(Value, Value), EvalError> {
        let program = parse("test", source).expect("parse");
        let doc = Document::new(Value::from(document));
        let ctx = Context::new(doc.clone(), Variables::new(), builtin::all(), None);
        let value = run_program(&ctx, &program)?;
        Ok((value, doc.get()))
    }

    #[test]
    fn len_measures_strings_vectors_and_objects() {
        assert_eq!(run("(len \"abc\")", json!(null)).unwrap().0, Value::Int(3));
        assert_eq!(run("(len [1 2])", json!(null)).unwrap().0, Value::Int(2));
        assert_eq!(run("(len .)", json!({"a": 1})).unwrap().0, Value::Int(1));
        let err = run("(len 5)", json!(null)).unwrap_err();
        assert_eq!(err.kind, EvalErrorKind::TypeMismatch);
    }

    #[test]
    fn append_prepend_reverse() {
        assert_eq!(
            run("(append [1 2] 3 4)", json!(null)).unwrap().0,
            Value::from(json!([1, 2, 3, 4]))
        );
        assert_eq!(
            run("(prepend [3] 1 2)", json!(null)).unwrap().0,
            Value::from(json!([1, 2, 3]))
        );
        assert_eq!(run("(append \"foo\" \"bar\")", json!(null)).unwrap().0, Value::from("foobar"));
        assert_eq!(run("(prepend \"bar\" \"foo\")", json!(null)).unwrap().0, Value::from("foobar"));
        assert_eq!(run("(append null 1)", json!(null)).unwrap().0, Value::from(json!([1])));
        assert_eq!(run("(reverse [1 2 3])", json!(null)).unwrap().0, Value::from(json!([3, 2, 1])));
        assert_eq!(run("(reverse \"abc\")", json!(null)).unwrap().0, Value::from("cba"));
    }

    #[test]
    fn contains_on_strings_and_vectors() {
        assert_eq!(run("(contains? \"foobar\" \"oba\")", json!(null)).unwrap().0, Value::Bool(true));
        assert_eq!(run("(contains? [1 2 3] 2)", json!(null)).unwrap().0, Value::Bool(true));
        assert_eq!(run("(contains? [1 \"x\"] 9)", json!(null)).unwrap().0, Value::Bool(false));
    }

    #[test]
    fn map_squares_a_vector() {
        let (value, _) = run("(map [1 2 3] [$x] (* $x $x))", json!(null)).unwrap();
        assert_eq!(value, Value::from(json!([1, 4, 9])));
    }

    #[test]
    fn map_with_index_binding_and_objects() {
        let (value, _) = run("(map [10 20] [$i $x] (+ $i $x))", json!(null)).unwrap();
        assert_eq!(value, Value::from(json!([10, 21])));

        let (value, _) = run("(map . [$v] (* $v 2))", json!({"a": 1, "b": 2})).unwrap();
        assert_eq!(value, Value::from(json!({"a": 2, "b": 4})));
    }

    #[test]
    fn map_accepts_a_bare_function_name() {
        let (value, _) = run("(map [\"a\" \"b\"] to-upper)", json!(null)).unwrap();
        assert_eq!(value, Value::from(json!(["A", "B"])));
    }

    #[test]
    fn filter_keeps_matching_elements() {
        let (value, _) = run("(filter [1 2 3 4] [$x] (gt? $x 2))", json!(null)).unwrap();
        assert_eq!(value, Value::from(json!([3, 4])));

        let (value, _) = run(
            "(filter . [$k $v] (gt? $v 1))",
            json!({"a": 1, "b": 2, "c": 3}),
        )
        .unwrap();
        assert_eq!(value, Value::from(json!({"b": 2, "c": 3})));
    }

    #[test]
    fn range_returns_the_last_body_value() {
        let (value, document) = run(
            "(set! $sum 0) (range [1 2 3] [$x] (sum! $sum $x))",
            json!(null),
        )
        .unwrap();
        assert_eq!(value, Value::Int(6));
        assert_eq!(document, Value::Null);

        let (value, _) = run("(range [] [$x] $x)", json!(null)).unwrap();
        assert_eq!(value, Value::Null);
    }

    #[test]
    fn loop_bindings_shadow_and_unwind() {
        let (value, _) = run(
            "(set! $x 100) (map [1 2] [$x] (* $x 2)) $x",
            json!(null),
        )
        .unwrap();
        assert_eq!(value, Value::Int(100));
    }

    #[test]
    fn range_iterates_objects_in_stable_key_order() {
        let (value, _) = run(
            "(set! $keys \"\") (range . [$k $v] (set! $keys (append $keys $k))) $keys",
            json!({"b": 1, "a": 2, "c": 3}),
        )
        .unwrap();
        assert_eq!(value, Value::from("abc"));
    }
}
