//! Equality and ordering checks.

use std::cmp::Ordering;

use crate::ast::Expression;
use crate::coalescing::{Coalescer, Humane, Strict};
use crate::context::{BasicFunction, Context, Functions};
use crate::error::EvalError;
use crate::eval;
use crate::value::Value;

use super::exactly;

pub fn functions() -> Functions {
    let mut funcs = Functions::new();
    funcs.set(
        "eq?",
        BasicFunction::new(eq_function, "equality check: returns true if both arguments are the same"),
    );
    funcs.set(
        "identical?",
        BasicFunction::new(identical_function, "like `eq?`, but always uses strict coalescing"),
    );
    funcs.set(
        "like?",
        BasicFunction::new(like_function, "like `eq?`, but always uses humane coalescing"),
    );
    funcs.set("lt?", BasicFunction::new(lt_function, "returns a < b"));
    funcs.set("lte?", BasicFunction::new(lte_function, "returns a <= b"));
    funcs.set("gt?", BasicFunction::new(gt_function, "returns a > b"));
    funcs.set("gte?", BasicFunction::new(gte_function, "returns a >= b"));
    funcs
}

fn equality(name: &str, coalescer: &dyn Coalescer, ctx: &Context, args: &[Expression]) -> Result<Value, EvalError> {
    exactly(name, args, 2)?;
    let a = eval::eval_expression(ctx, &args[0])?;
    let b = eval::eval_expression(ctx, &args[1])?;
    Ok(Value::Bool(coalescer.equal(&a, &b).map_err(|e| e.at(args[0].pos()))?))
}

fn eq_function(ctx: &Context, args: &[Expression]) -> Result<Value, EvalError> {
    equality("eq?", ctx.coalesce(), ctx, args)
}

fn identical_function(ctx: &Context, args: &[Expression]) -> Result<Value, EvalError> {
    equality("identical?", &Strict, ctx, args)
}

fn like_function(ctx: &Context, args: &[Expression]) -> Result<Value, EvalError> {
    equality("like?", &Humane, ctx, args)
}

fn comparison(
    name: &str,
    ctx: &Context,
    args: &[Expression],
    pick: fn(Ordering) -> bool,
) -> Result<Value, EvalError> {
    exactly(name, args, 2)?;
    let a = eval::eval_expression(ctx, &args[0])?;
    let b = eval::eval_expression(ctx, &args[1])?;
    let ordering = ctx.coalesce().ordering(&a, &b).map_err(|e| e.at(args[0].pos()))?;
    Ok(Value::Bool(pick(ordering)))
}

fn lt_function(ctx: &Context, args: &[Expression]) -> Result<Value, EvalError> {
    comparison("lt?", ctx, args, Ordering::is_lt)
}

fn lte_function(ctx: &Context, args: &[Expression]) -> Result<Value, EvalError> {
    comparison("lte?", ctx, args, Ordering::is_le)
}

fn gt_function(ctx: &Context, args: &[Expression]) -> Result<Value, EvalError> {
    comparison("gt?", ctx, args, Ordering::is_gt)
}

fn gte_function(ctx: &Context, args: &[Expression]) -> Result<Value, EvalError> {
    comparison("gte?", ctx, args, Ordering::is_ge)
}
