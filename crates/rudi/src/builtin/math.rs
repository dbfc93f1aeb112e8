//! Arithmetic over integers and floats.
//!
//! Integer arithmetic wraps on overflow. Any float operand promotes the
//! whole computation to float; conversions go through the active
//! coalescer, so `(humanely (+ "1" 2))` works while the strict default
//! rejects it.

use crate::ast::Expression;
use crate::context::{BasicFunction, Context, Functions};
use crate::error::EvalError;
use crate::eval;
use crate::value::Value;

use super::at_least;

pub fn functions() -> Functions {
    let mut funcs = Functions::new();
    funcs.set("+", BasicFunction::new(sum_function, "returns the sum of all of its arguments"));
    funcs.set("-", BasicFunction::new(sub_function, "returns arg1 - arg2 - … - argN"));
    funcs.set("*", BasicFunction::new(multiply_function, "returns the product of all of its arguments"));
    funcs.set("/", BasicFunction::new(divide_function, "returns arg1 / arg2 / … / argN"));

    // aliases to make bang tuples nicer (sum! vs +!)
    funcs.set("sum", BasicFunction::new(sum_function, "alias for +"));
    funcs.set("sub", BasicFunction::new(sub_function, "alias for -"));
    funcs.set("mult", BasicFunction::new(multiply_function, "alias for *"));
    funcs.set("div", BasicFunction::new(divide_function, "alias for /"));
    funcs
}

fn numeric_args(name: &str, ctx: &Context, args: &[Expression]) -> Result<Vec<Value>, EvalError> {
    at_least(name, args, 2)?;
    eval::eval_args(ctx, args)
}

fn any_float(values: &[Value]) -> bool {
    values.iter().any(|v| matches!(v, Value::Float(_)))
}

fn fold(
    ctx: &Context,
    values: &[Value],
    int_op: fn(i64, i64) -> i64,
    float_op: fn(f64, f64) -> f64,
) -> Result<Value, EvalError> {
    if any_float(values) {
        let mut acc = ctx.coalesce().to_float(&values[0])?;
        for value in &values[1..] {
            acc = float_op(acc, ctx.coalesce().to_float(value)?);
        }
        Ok(Value::Float(acc))
    } else {
        let mut acc = ctx.coalesce().to_integer(&values[0])?;
        for value in &values[1..] {
            acc = int_op(acc, ctx.coalesce().to_integer(value)?);
        }
        Ok(Value::Int(acc))
    }
}

fn sum_function(ctx: &Context, args: &[Expression]) -> Result<Value, EvalError> {
    let values = numeric_args("+", ctx, args)?;
    fold(ctx, &values, i64::wrapping_add, |a, b| a + b)
}

fn sub_function(ctx: &Context, args: &[Expression]) -> Result<Value, EvalError> {
    let values = numeric_args("-", ctx, args)?;
    fold(ctx, &values, i64::wrapping_sub, |a, b| a - b)
}

fn multiply_function(ctx: &Context, args: &[Expression]) -> Result<Value, EvalError> {
    let values = numeric_args("*", ctx, args)?;
    fold(ctx, &values, i64::wrapping_mul, |a, b| a * b)
}

fn divide_function(ctx: &Context, args: &[Expression]) -> Result<Value, EvalError> {
    let values = numeric_args("/", ctx, args)?;
    let ints_only = !any_float(&values);

    let mut acc = ctx.coalesce().to_float(&values[0])?;
    for value in &values[1..] {
        let divisor = ctx.coalesce().to_float(value)?;
        if divisor == 0.0 {
            return Err(EvalError::function("division by zero"));
        }
        acc /= divisor;
    }

    if ints_only && acc.fract() == 0.0 && acc.is_finite() {
        Ok(Value::Int(acc as i64))
    } else {
        Ok(Value::Float(acc))
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

    fn run(source: &str) -> Result<Value, EvalError> {
        let program = parse("test", source).expect("parse");
        let ctx = Context::new(Document::default(), Variables::new(), builtin::all(), None);
        run_program(&ctx, &program)
    }

    #[test]
    fn integers_stay_integers() {
        assert_eq!(run("(+ 1 2 3)").unwrap(), Value::Int(6));
        assert_eq!(run("(- 10 2 3)").unwrap(), Value::Int(5));
        assert_eq!(run("(* 2 3 4)").unwrap(), Value::Int(24));
        assert_eq!(run("(/ 10 2)").unwrap(), Value::Int(5));
    }

    #[test]
    fn floats_are_contagious() {
        assert_eq!(run("(+ 1 2.5)").unwrap(), Value::Float(3.5));
        assert_eq!(run("(* 2 0.5)").unwrap(), Value::Float(1.0));
        assert_eq!(run("(/ 10 4)").unwrap(), Value::Float(2.5));
    }

    #[test]
    fn integer_overflow_wraps() {
        assert_eq!(run("(+ 9223372036854775807 1)").unwrap(), Value::Int(i64::MIN));
    }

    #[test]
    fn division_by_zero_errors() {
        let err = run("(/ 1 0)").unwrap_err();
        assert_eq!(err.kind, EvalErrorKind::Function);
    }

    #[test]
    fn strings_require_the_humane_mode() {
        assert!(run("(+ \"1\" 2)").is_err());
        assert_eq!(run("(humanely (+ \"1\" 2))").unwrap(), Value::Int(3));
    }

    #[test]
    fn bang_alias_writes_back() {
        let program = parse("test", "(set! .n 10) (sum! .n 5) .n").expect("parse");
        let doc = Document::new(Value::Null);
        let ctx = Context::new(doc, Variables::new(), builtin::all(), None);
        assert_eq!(run_program(&ctx, &program).unwrap(), Value::Int(15));
    }
}
