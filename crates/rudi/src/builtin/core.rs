//! Control flow and document/variable plumbing.

use crate::ast::Expression;
use crate::context::{BasicFunction, Context, Function, Functions};
use crate::error::EvalError;
use crate::eval;
use crate::path;
use crate::value::Value;

use super::{between, exactly, identifier_arg};

pub fn functions() -> Functions {
    let mut funcs = Functions::new();
    funcs.set(
        "default",
        BasicFunction::new(default_function, "returns the fallback if the first argument is empty"),
    );
    funcs.set("delete", DeleteFunction);
    funcs.set(
        "do",
        BasicFunction::new(do_function, "evaluates a sequence of statements, returning the last"),
    );
    funcs.set(
        "empty?",
        BasicFunction::new(
            is_empty_function,
            "returns true when the given value is empty-ish (null, false, 0, \"\", …)",
        ),
    );
    funcs.set(
        "has?",
        BasicFunction::new(
            has_function,
            "returns true if the given identifier's path points to an existing value",
        ),
    );
    funcs.set(
        "if",
        BasicFunction::new(if_function, "evaluates one of two expressions based on a condition"),
    );
    funcs.set(
        "set",
        BasicFunction::new(
            set_function,
            "sets a value in a variable/document, only really useful with the ! modifier (set!)",
        ),
    );
    funcs.set(
        "try",
        BasicFunction::new(try_function, "returns the fallback if the first expression errors out"),
    );
    funcs
}

fn if_function(ctx: &Context, args: &[Expression]) -> Result<Value, EvalError> {
    between("if", args, 2, 3)?;
    let condition = eval::eval_expression(ctx, &args[0])?;
    if ctx.coalesce().to_bool(&condition).map_err(|e| e.at(args[0].pos()))? {
        eval::eval_expression(ctx, &args[1])
    } else {
        match args.get(2) {
            Some(other) => eval::eval_expression(ctx, other),
            None => Ok(Value::Null),
        }
    }
}

fn do_function(ctx: &Context, args: &[Expression]) -> Result<Value, EvalError> {
    super::at_least("do", args, 1)?;
    let mut result = Value::Null;
    for arg in args {
        result = eval::eval_expression(ctx, arg)?;
    }
    Ok(result)
}

fn try_function(ctx: &Context, args: &[Expression]) -> Result<Value, EvalError> {
    between("try", args, 1, 2)?;
    match eval::eval_expression(ctx, &args[0]) {
        Ok(value) => Ok(value),
        Err(_) => match args.get(1) {
            Some(fallback) => eval::eval_expression(ctx, fallback),
            None => Ok(Value::Null),
        },
    }
}

fn set_function(ctx: &Context, args: &[Expression]) -> Result<Value, EvalError> {
    exactly("set", args, 2)?;
    identifier_arg("set", args, 0)?;
    eval::eval_expression(ctx, &args[1])
}

fn default_function(ctx: &Context, args: &[Expression]) -> Result<Value, EvalError> {
    exactly("default", args, 2)?;
    let value = eval::eval_expression(ctx, &args[0])?;
    if ctx.coalesce().empty(&value) {
        eval::eval_expression(ctx, &args[1])
    } else {
        Ok(value)
    }
}

fn is_empty_function(ctx: &Context, args: &[Expression]) -> Result<Value, EvalError> {
    exactly("empty?", args, 1)?;
    let value = eval::eval_expression(ctx, &args[0])?;
    Ok(Value::Bool(ctx.coalesce().empty(&value)))
}

fn has_function(ctx: &Context, args: &[Expression]) -> Result<Value, EvalError> {
    exactly("has?", args, 1)?;
    let symbol = identifier_arg("has?", args, 0)?;
    Ok(Value::Bool(eval::eval_symbol(ctx, symbol).is_ok()))
}

/// `delete` removes the terminal step of its argument's path. The
/// write-back is not the generic protocol (that would write into the
/// deleted position), so it overrides the bang hook and replaces the
/// whole root instead.
struct DeleteFunction;

impl DeleteFunction {
    fn delete(&self, ctx: &Context, args: &[Expression], write_back: bool) -> Result<Value, EvalError> {
        exactly("delete", args, 1)?;
        let symbol = identifier_arg("delete", args, 0)?;
        let Some(expr_path) = &symbol.path else {
            return Err(
                EvalError::type_mismatch("delete requires a path expression on its argument").at(symbol.pos),
            );
        };
        let root = eval::symbol_root(ctx, symbol)?;
        let updated = path::delete(root, expr_path).map_err(|e| e.at(symbol.pos))?;
        if write_back {
            eval::replace_symbol_root(ctx, symbol, updated.clone())?;
        }
        Ok(updated)
    }
}

impl Function for DeleteFunction {
    fn evaluate(&self, ctx: &Context, args: &[Expression]) -> Result<Value, EvalError> {
        self.delete(ctx, args, false)
    }

    fn description(&self) -> &str {
        "removes a key or index from the document or a variable"
    }

    fn evaluate_bang(&self, ctx: &Context, args: &[Expression]) -> Option<Result<Value, EvalError>> {
        Some(self.delete(ctx, args, true))
    }
}
