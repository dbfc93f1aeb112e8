//! String helpers. Arguments are coalesced to strings through the active
//! mode, so the strict default only accepts actual strings.

use regex::Regex;

use crate::ast::Expression;
use crate::context::{BasicFunction, Context, Functions};
use crate::error::EvalError;
use crate::eval;
use crate::value::Value;

use super::{at_least, exactly};

pub fn functions() -> Functions {
    let mut funcs = Functions::new();
    funcs.set(
        "concat",
        BasicFunction::new(concat_function, "concatenates items (or vectors of items) using a glue string"),
    );
    funcs.set("split", BasicFunction::new(split_function, "splits a string into a vector"));
    funcs.set(
        "has-prefix?",
        BasicFunction::new(has_prefix_function, "returns true if the given string has the prefix"),
    );
    funcs.set(
        "has-suffix?",
        BasicFunction::new(has_suffix_function, "returns true if the given string has the suffix"),
    );
    funcs.set(
        "trim-prefix",
        BasicFunction::new(trim_prefix_function, "removes the prefix from the string, if it exists"),
    );
    funcs.set(
        "trim-suffix",
        BasicFunction::new(trim_suffix_function, "removes the suffix from the string, if it exists"),
    );
    funcs.set(
        "to-lower",
        BasicFunction::new(to_lower_function, "returns the lowercased version of the given string"),
    );
    funcs.set(
        "to-upper",
        BasicFunction::new(to_upper_function, "returns the uppercased version of the given string"),
    );
    funcs.set(
        "trim",
        BasicFunction::new(trim_function, "returns the given string with leading/trailing whitespace removed"),
    );
    funcs.set(
        "matches?",
        BasicFunction::new(matches_function, "returns true if the string matches the regular expression"),
    );
    funcs
}

fn string_arg(ctx: &Context, args: &[Expression], index: usize) -> Result<String, EvalError> {
    let value = eval::eval_expression(ctx, &args[index])?;
    ctx.coalesce().to_string(&value).map_err(|e| e.at(args[index].pos()))
}

fn concat_function(ctx: &Context, args: &[Expression]) -> Result<Value, EvalError> {
    at_least("concat", args, 2)?;
    let glue = string_arg(ctx, args, 0)?;

    let mut parts = Vec::new();
    for arg in &args[1..] {
        let value = eval::eval_expression(ctx, arg)?;
        match value {
            Value::Vector(elements) => {
                for element in elements {
                    parts.push(ctx.coalesce().to_string(&element).map_err(|e| e.at(arg.pos()))?);
                }
            }
            other => parts.push(ctx.coalesce().to_string(&other).map_err(|e| e.at(arg.pos()))?),
        }
    }
    Ok(Value::String(parts.join(&glue)))
}

fn split_function(ctx: &Context, args: &[Expression]) -> Result<Value, EvalError> {
    exactly("split", args, 2)?;
    let source = string_arg(ctx, args, 0)?;
    let separator = string_arg(ctx, args, 1)?;

    let parts: Vec<Value> = if separator.is_empty() {
        source.chars().map(|c| Value::String(c.to_string())).collect()
    } else {
        source.split(&separator).map(|s| Value::String(s.to_string())).collect()
    };
    Ok(Value::Vector(parts))
}

fn has_prefix_function(ctx: &Context, args: &[Expression]) -> Result<Value, EvalError> {
    exactly("has-prefix?", args, 2)?;
    let source = string_arg(ctx, args, 0)?;
    let prefix = string_arg(ctx, args, 1)?;
    Ok(Value::Bool(source.starts_with(&prefix)))
}

fn has_suffix_function(ctx: &Context, args: &[Expression]) -> Result<Value, EvalError> {
    exactly("has-suffix?", args, 2)?;
    let source = string_arg(ctx, args, 0)?;
    let suffix = string_arg(ctx, args, 1)?;
    Ok(Value::Bool(source.ends_with(&suffix)))
}

fn trim_prefix_function(ctx: &Context, args: &[Expression]) -> Result<Value, EvalError> {
    exactly("trim-prefix", args, 2)?;
    let source = string_arg(ctx, args, 0)?;
    let prefix = string_arg(ctx, args, 1)?;
    let trimmed = source.strip_prefix(&prefix).unwrap_or(&source);
    Ok(Value::String(trimmed.to_string()))
}

fn trim_suffix_function(ctx: &Context, args: &[Expression]) -> Result<Value, EvalError> {
    exactly("trim-suffix", args, 2)?;
    let source = string_arg(ctx, args, 0)?;
    let suffix = string_arg(ctx, args, 1)?;
    let trimmed = source.strip_suffix(&suffix).unwrap_or(&source);
    Ok(Value::String(trimmed.to_string()))
}

fn to_lower_function(ctx: &Context, args: &[Expression]) -> Result<Value, EvalError> {
    exactly("to-lower", args, 1)?;
    Ok(Value::String(string_arg(ctx, args, 0)?.to_lowercase()))
}

fn to_upper_function(ctx: &Context, args: &[Expression]) -> Result<Value, EvalError> {
    exactly("to-upper", args, 1)?;
    Ok(Value::String(string_arg(ctx, args, 0)?.to_uppercase()))
}

fn trim_function(ctx: &Context, args: &[Expression]) -> Result<Value, EvalError> {
    exactly("trim", args, 1)?;
    Ok(Value::String(string_arg(ctx, args, 0)?.trim().to_string()))
}

fn matches_function(ctx: &Context, args: &[Expression]) -> Result<Value, EvalError> {
    exactly("matches?", args, 2)?;
    let source = string_arg(ctx, args, 0)?;
    let pattern = string_arg(ctx, args, 1)?;
    let re = Regex::new(&pattern)
        .map_err(|e| EvalError::function(format!("invalid regex {pattern:?}: {e}")).at(args[1].pos()))?;
    Ok(Value::Bool(re.is_match(&source)))
}
