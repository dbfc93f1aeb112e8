//! Type introspection and explicit conversions.
//!
//! The `to-*` functions are explicit conversion requests, so they always
//! apply the humane matrix regardless of the surrounding mode — asking
//! `(to-string 5)` and getting a type mismatch back would defeat their
//! purpose.

use crate::ast::Expression;
use crate::coalescing::{Coalescer, Humane};
use crate::context::{BasicFunction, Context, Functions};
use crate::error::EvalError;
use crate::eval;
use crate::value::Value;

use super::exactly;

pub fn functions() -> Functions {
    let mut funcs = Functions::new();
    funcs.set(
        "type-of",
        BasicFunction::new(type_of_function, "returns the type of a given value (e.g. \"string\" or \"int\")"),
    );
    funcs.set(
        "to-bool",
        BasicFunction::new(to_bool_function, "converts the given argument to a bool"),
    );
    funcs.set(
        "to-int",
        BasicFunction::new(to_int_function, "converts the given argument losslessly to an int"),
    );
    funcs.set(
        "to-float",
        BasicFunction::new(to_float_function, "converts the given argument losslessly to a float"),
    );
    funcs.set(
        "to-string",
        BasicFunction::new(to_string_function, "converts the given argument losslessly to a string"),
    );
    funcs
}

fn single_arg(name: &str, ctx: &Context, args: &[Expression]) -> Result<Value, EvalError> {
    exactly(name, args, 1)?;
    eval::eval_expression(ctx, &args[0])
}

fn type_of_function(ctx: &Context, args: &[Expression]) -> Result<Value, EvalError> {
    let value = single_arg("type-of", ctx, args)?;
    Ok(Value::String(value.type_name().to_string()))
}

fn to_bool_function(ctx: &Context, args: &[Expression]) -> Result<Value, EvalError> {
    let value = single_arg("to-bool", ctx, args)?;
    Ok(Value::Bool(Humane.to_bool(&value).map_err(|e| e.at(args[0].pos()))?))
}

fn to_int_function(ctx: &Context, args: &[Expression]) -> Result<Value, EvalError> {
    let value = single_arg("to-int", ctx, args)?;
    Ok(Value::Int(Humane.to_integer(&value).map_err(|e| e.at(args[0].pos()))?))
}

fn to_float_function(ctx: &Context, args: &[Expression]) -> Result<Value, EvalError> {
    let value = single_arg("to-float", ctx, args)?;
    Ok(Value::Float(Humane.to_float(&value).map_err(|e| e.at(args[0].pos()))?))
}

fn to_string_function(ctx: &Context, args: &[Expression]) -> Result<Value, EvalError> {
    let value = single_arg("to-string", ctx, args)?;
    Ok(Value::String(Humane.to_string(&value).map_err(|e| e.at(args[0].pos()))?))
}

#[cfg(test)]
mod tests {
    use crate::builtin;
    use crate::context::{Context, Document, Variables};
    use crate::error::EvalError;
    use crate::eval::run_program;
    use crate::parser::parse;
    use crate::value::Value;

    fn run(source: &str) -> Result<Value, EvalError> {
        let program = parse("test", source).expect("parse");
        let ctx = Context::new(Document::default(), Variables::new(), builtin::all(), None);
        run_program(&ctx, &program)
    }

    #[test]
    fn type_of_names_the_variant() {
        assert_eq!(run("(type-of null)").unwrap(), Value::from("null"));
        assert_eq!(run("(type-of 1)").unwrap(), Value::from("int"));
        assert_eq!(run("(type-of 1.5)").unwrap(), Value::from("float"));
        assert_eq!(run("(type-of [1])").unwrap(), Value::from("vector"));
        assert_eq!(run("(type-of {})").unwrap(), Value::from("object"));
    }

    #[test]
    fn conversions_are_humane_even_under_the_strict_default() {
        assert_eq!(run("(to-string 5)").unwrap(), Value::from("5"));
        assert_eq!(run("(to-int \"12\")").unwrap(), Value::Int(12));
        assert_eq!(run("(to-float \"1.5\")").unwrap(), Value::Float(1.5));
        assert_eq!(run("(to-bool \"no\")").unwrap(), Value::Bool(false));
        assert_eq!(run("(to-bool 2)").unwrap(), Value::Bool(true));
        assert!(run("(to-int \"1.5\")").is_err());
    }
}
