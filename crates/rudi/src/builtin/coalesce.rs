//! Scoped coalescer switches: evaluate child expressions under a derived
//! context whose coalescer is replaced.

use std::rc::Rc;

use crate::ast::Expression;
use crate::coalescing::{humane, pedantic, strict, Coalescer};
use crate::context::{BasicFunction, Context, Functions};
use crate::error::EvalError;
use crate::eval;
use crate::value::Value;

use super::at_least;

pub fn functions() -> Functions {
    let mut funcs = Functions::new();
    funcs.set(
        "strictly",
        BasicFunction::new(strictly_function, "evaluates the child expressions using strict coalescing"),
    );
    funcs.set(
        "pedantically",
        BasicFunction::new(pedantically_function, "evaluates the child expressions using pedantic coalescing"),
    );
    funcs.set(
        "humanely",
        BasicFunction::new(humanely_function, "evaluates the child expressions using humane coalescing"),
    );
    funcs
}

fn scoped(name: &str, coalescer: Rc<dyn Coalescer>, ctx: &Context, args: &[Expression]) -> Result<Value, EvalError> {
    at_least(name, args, 1)?;
    let scope = ctx.with_coalescer(coalescer);
    let mut result = Value::Null;
    for arg in args {
        result = eval::eval_expression(&scope, arg)?;
    }
    Ok(result)
}

fn strictly_function(ctx: &Context, args: &[Expression]) -> Result<Value, EvalError> {
    scoped("strictly", strict(), ctx, args)
}

fn pedantically_function(ctx: &Context, args: &[Expression]) -> Result<Value, EvalError> {
    scoped("pedantically", pedantic(), ctx, args)
}

fn humanely_function(ctx: &Context, args: &[Expression]) -> Result<Value, EvalError> {
    scoped("humanely", humane(), ctx, args)
}

#[cfg(test)]
mod tests {
    use crate::builtin;
    use crate::coalescing;
    use crate::context::{Context, Document, Variables};
    use crate::error::EvalError;
    use crate::eval::run_program;
    use crate::parser::parse;
    use crate::value::Value;
    use std::rc::Rc;

    fn run_with(source: &str, coalescer: Rc<dyn coalescing::Coalescer>) -> Result<Value, EvalError> {
        let program = parse("test", source).expect("parse");
        let ctx = Context::new(Document::default(), Variables::new(), builtin::all(), Some(coalescer));
        run_program(&ctx, &program)
    }

    #[test]
    fn the_switch_only_applies_inside_the_call() {
        assert_eq!(
            run_with("(humanely (eq? 1 \"1\"))", coalescing::strict()).unwrap(),
            Value::Bool(true)
        );
        assert!(run_with("(strictly (eq? 1 \"1\"))", coalescing::humane()).is_err());
        assert!(run_with("(pedantically (eq? 1 1.0))", coalescing::humane()).is_err());

        // back outside, the surrounding mode is intact
        assert_eq!(
            run_with("(humanely (eq? 1 \"1\")) (eq? 1 1.0)", coalescing::strict()).unwrap(),
            Value::Bool(true)
        );
    }

    #[test]
    fn the_last_child_expression_wins() {
        assert_eq!(
            run_with("(humanely 1 2 3)", coalescing::strict()).unwrap(),
            Value::Int(3)
        );
    }
}
