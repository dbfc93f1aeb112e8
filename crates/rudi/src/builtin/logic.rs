//! Short-circuiting boolean operators.
//!
//! `and` and `or` return the deciding operand itself, not a bool; only
//! the decision goes through the active coalescer.

use crate::ast::Expression;
use crate::context::{BasicFunction, Context, Functions};
use crate::error::EvalError;
use crate::eval;
use crate::value::Value;

use super::{at_least, exactly};

pub fn functions() -> Functions {
    let mut funcs = Functions::new();
    funcs.set(
        "and",
        BasicFunction::new(and_function, "returns the first falsy argument, or the last truthy one"),
    );
    funcs.set(
        "or",
        BasicFunction::new(or_function, "returns the first truthy argument, or the last falsy one"),
    );
    funcs.set("not", BasicFunction::new(not_function, "negates the given argument"));
    funcs
}

fn and_function(ctx: &Context, args: &[Expression]) -> Result<Value, EvalError> {
    at_least("and", args, 1)?;
    let mut last = Value::Null;
    for arg in args {
        last = eval::eval_expression(ctx, arg)?;
        if !ctx.coalesce().to_bool(&last).map_err(|e| e.at(arg.pos()))? {
            return Ok(last);
        }
    }
    Ok(last)
}

fn or_function(ctx: &Context, args: &[Expression]) -> Result<Value, EvalError> {
    at_least("or", args, 1)?;
    let mut last = Value::Null;
    for arg in args {
        last = eval::eval_expression(ctx, arg)?;
        if ctx.coalesce().to_bool(&last).map_err(|e| e.at(arg.pos()))? {
            return Ok(last);
        }
    }
    Ok(last)
}

fn not_function(ctx: &Context, args: &[Expression]) -> Result<Value, EvalError> {
    exactly("not", args, 1)?;
    let value = eval::eval_expression(ctx, &args[0])?;
    Ok(Value::Bool(!ctx.coalesce().to_bool(&value).map_err(|e| e.at(args[0].pos()))?))
}

#[cfg(test)]
mod tests {
    use crate::builtin;
    use crate::context::{BasicFunction, Context, Document, Variables};
    use crate::error::EvalError;
    use crate::eval::run_program;
    use crate::parser::parse;
    use crate::value::Value;
    use crate::ast::Expression;
    use std::cell::Cell;

    thread_local! {
        static PROBE_CALLS: Cell<usize> = const { Cell::new(0) };
    }

    fn probe(_: &Context, _: &[Expression]) -> Result<Value, EvalError> {
        PROBE_CALLS.with(|c| c.set(c.get() + 1));
        Ok(Value::Bool(true))
    }

    fn run(source: &str) -> Value {
        let program = parse("test", source).expect("parse");
        let mut functions = builtin::all();
        functions.set("probe", BasicFunction::new(probe, "counts how often it runs"));
        let ctx = Context::new(Document::default(), Variables::new(), functions, None);
        run_program(&ctx, &program).expect("run")
    }

    #[test]
    fn and_or_return_the_deciding_value() {
        assert_eq!(run("(and true true)"), Value::Bool(true));
        assert_eq!(run("(humanely (and 1 2))"), Value::Int(2));
        assert_eq!(run("(humanely (and 1 0 2))"), Value::Int(0));
        assert_eq!(run("(humanely (or 0 \"\" 3))"), Value::Int(3));
        assert_eq!(run("(humanely (or 0 false))"), Value::Bool(false));
    }

    #[test]
    fn and_short_circuits_past_the_deciding_argument() {
        PROBE_CALLS.with(|c| c.set(0));
        assert_eq!(run("(and false (probe))"), Value::Bool(false));
        assert_eq!(PROBE_CALLS.with(Cell::get), 0);

        assert_eq!(run("(and true (probe))"), Value::Bool(true));
        assert_eq!(PROBE_CALLS.with(Cell::get), 1);
    }

    #[test]
    fn or_short_circuits_past_the_deciding_argument() {
        PROBE_CALLS.with(|c| c.set(0));
        assert_eq!(run("(or true (probe))"), Value::Bool(true));
        assert_eq!(PROBE_CALLS.with(Cell::get), 0);
    }

    #[test]
    fn not_negates_through_the_coalescer() {
        assert_eq!(run("(not false)"), Value::Bool(true));
        assert_eq!(run("(humanely (not \"\"))"), Value::Bool(true));
    }
}
