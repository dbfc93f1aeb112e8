//! The built-in function library: plugins over the evaluator, grouped by
//! concern. Hosts start from [`all`] and add/remove groups or individual
//! functions through the [`Functions`] registry API.

use crate::ast::{Expression, Symbol, SymbolKind};
use crate::context::Functions;
use crate::error::EvalError;

pub mod coalesce;
pub mod compare;
pub mod core;
pub mod lists;
pub mod logic;
pub mod math;
pub mod strings;
pub mod types;

/// Every built-in group combined. Later groups would win name collisions,
/// but the groups are disjoint.
pub fn all() -> Functions {
    let mut funcs = Functions::new();
    funcs
        .add(&self::core::functions())
        .add(&self::logic::functions())
        .add(&self::compare::functions())
        .add(&self::math::functions())
        .add(&self::strings::functions())
        .add(&self::lists::functions())
        .add(&self::types::functions())
        .add(&self::coalesce::functions());
    funcs
}

pub(crate) fn exactly(name: &str, args: &[Expression], want: usize) -> Result<(), EvalError> {
    if args.len() != want {
        return Err(EvalError::arity(
            name,
            format!("expected {want} argument(s), got {}", args.len()),
        ));
    }
    Ok(())
}

pub(crate) fn at_least(name: &str, args: &[Expression], want: usize) -> Result<(), EvalError> {
    if args.len() < want {
        return Err(EvalError::arity(
            name,
            format!("expected at least {want} argument(s), got {}", args.len()),
        ));
    }
    Ok(())
}

pub(crate) fn between(name: &str, args: &[Expression], lo: usize, hi: usize) -> Result<(), EvalError> {
    if args.len() < lo || args.len() > hi {
        return Err(EvalError::arity(
            name,
            format!("expected {lo} to {hi} arguments, got {}", args.len()),
        ));
    }
    Ok(())
}

/// The document/variable identifier functions like `set`, `delete` and
/// `has?` require as an argument.
pub(crate) fn identifier_arg<'a>(
    name: &str,
    args: &'a [Expression],
    index: usize,
) -> Result<&'a Symbol, EvalError> {
    match args.get(index) {
        Some(Expression::Symbol(symbol))
            if matches!(symbol.kind, SymbolKind::Document | SymbolKind::Variable(_)) =>
        {
            Ok(symbol)
        }
        Some(other) => Err(EvalError::type_mismatch(format!(
            "{name}: argument #{index} must be a document or variable identifier"
        ))
        .at(other.pos())),
        None => Err(EvalError::arity(name, format!("missing argument #{index}"))),
    }
}
