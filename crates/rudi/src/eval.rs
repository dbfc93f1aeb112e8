//! Tree-walking evaluator.
//!
//! Statements run in source order; the program's value is the value of
//! its last statement. Functions receive their arguments unevaluated and
//! re-enter the evaluator for the ones they want, so short-circuiting and
//! scoped coalescing fall out of the calling convention.

use crate::ast::{Expression, Program, Statement, Symbol, SymbolKind, Tuple};
use crate::context::Context;
use crate::error::EvalError;
use crate::path;
use crate::value::Value;

/// Evaluate every statement in sequence; returns the last value, or Null
/// for an empty program.
pub fn run_program(ctx: &Context, program: &Program) -> Result<Value, EvalError> {
    let mut result = Value::Null;
    for statement in &program.statements {
        result = eval_statement(ctx, statement)?;
    }
    Ok(result)
}

pub fn eval_statement(ctx: &Context, statement: &Statement) -> Result<Value, EvalError> {
    eval_expression(ctx, &statement.expression)
}

pub fn eval_expression(ctx: &Context, expression: &Expression) -> Result<Value, EvalError> {
    match expression {
        Expression::Literal(node) => Ok(node.value.clone()),
        Expression::Shim(node) => Ok(node.value.clone()),
        Expression::Vector(node) => {
            let mut elements = Vec::with_capacity(node.elements.len());
            for element in &node.elements {
                elements.push(eval_expression(ctx, element)?);
            }
            Ok(Value::Vector(elements))
        }
        Expression::Object(node) => {
            let mut entries = std::collections::BTreeMap::new();
            for (key_expr, value_expr) in &node.entries {
                let key_value = eval_expression(ctx, key_expr)?;
                let key = ctx
                    .coalesce()
                    .to_string(&key_value)
                    .map_err(|e| e.at(key_expr.pos()))?;
                let value = eval_expression(ctx, value_expr)?;
                entries.insert(key, value);
            }
            Ok(Value::Object(entries))
        }
        Expression::Symbol(node) => eval_symbol(ctx, node),
        Expression::Tuple(node) => eval_tuple(ctx, node),
    }
}

/// Evaluate a batch of argument expressions left to right. Shared by
/// every eager builtin.
pub fn eval_args(ctx: &Context, args: &[Expression]) -> Result<Vec<Value>, EvalError> {
    let mut values = Vec::with_capacity(args.len());
    for arg in args {
        values.push(eval_expression(ctx, arg)?);
    }
    Ok(values)
}

/// Resolve a document/variable symbol to the value its path addresses.
pub fn eval_symbol(ctx: &Context, symbol: &Symbol) -> Result<Value, EvalError> {
    match &symbol.kind {
        SymbolKind::Document => {
            let root = ctx.document().get();
            match &symbol.path {
                Some(path) => path::get(&root, path).map_err(|e| e.at(symbol.pos)),
                None => Ok(root),
            }
        }
        SymbolKind::Variable(name) => {
            let value = ctx
                .variable(name)
                .ok_or_else(|| EvalError::unknown_variable(name).at(symbol.pos))?;
            match &symbol.path {
                Some(path) => path::get(&value, path).map_err(|e| e.at(symbol.pos)),
                None => Ok(value),
            }
        }
        SymbolKind::Name { name, .. } => Err(EvalError::type_mismatch(format!(
            "function name `{name}` is not a value; call it as ({name} …)"
        ))
        .at(symbol.pos)),
    }
}

/// The root value a symbol addresses into: the whole document, or the
/// variable's current value. Path-independent; used by `delete`.
pub fn symbol_root(ctx: &Context, symbol: &Symbol) -> Result<Value, EvalError> {
    match &symbol.kind {
        SymbolKind::Document => Ok(ctx.document().get()),
        SymbolKind::Variable(name) => ctx
            .variable(name)
            .ok_or_else(|| EvalError::unknown_variable(name).at(symbol.pos)),
        SymbolKind::Name { name, .. } => Err(EvalError::type_mismatch(format!(
            "`{name}` does not address a document or variable"
        ))
        .at(symbol.pos)),
    }
}

/// Replace the root value a symbol addresses into. Counterpart of
/// [`symbol_root`]; used by `delete!`.
pub fn replace_symbol_root(ctx: &Context, symbol: &Symbol, root: Value) -> Result<(), EvalError> {
    match &symbol.kind {
        SymbolKind::Document => {
            ctx.document().set(root);
            Ok(())
        }
        SymbolKind::Variable(name) => {
            ctx.set_variable(name, root);
            Ok(())
        }
        SymbolKind::Name { name, .. } => Err(EvalError::type_mismatch(format!(
            "`{name}` does not address a document or variable"
        ))
        .at(symbol.pos)),
    }
}

/// Write `value` at the position a symbol addresses: the generic `!`
/// write-back.
pub fn write_target(ctx: &Context, target: &Symbol, value: Value) -> Result<(), EvalError> {
    match &target.kind {
        SymbolKind::Document => match &target.path {
            None => {
                ctx.document().set(value);
                Ok(())
            }
            Some(path) => {
                let root = ctx.document().get();
                let updated = path::set(root, path, value).map_err(|e| e.at(target.pos))?;
                ctx.document().set(updated);
                Ok(())
            }
        },
        SymbolKind::Variable(name) => match &target.path {
            None => {
                ctx.set_variable(name, value);
                Ok(())
            }
            Some(path) => {
                let current = ctx
                    .variable(name)
                    .ok_or_else(|| EvalError::unknown_variable(name).at(target.pos))?;
                let updated = path::set(current, path, value).map_err(|e| e.at(target.pos))?;
                ctx.set_variable(name, updated);
                Ok(())
            }
        },
        SymbolKind::Name { name, .. } => Err(EvalError::modifier_misuse(format!(
            "cannot write back into function name `{name}`"
        ))
        .at(target.pos)),
    }
}

fn bang_target(tuple: &Tuple) -> Option<&Symbol> {
    match tuple.args.first() {
        Some(Expression::Symbol(symbol))
            if matches!(symbol.kind, SymbolKind::Document | SymbolKind::Variable(_)) =>
        {
            Some(symbol)
        }
        _ => None,
    }
}

fn eval_tuple(ctx: &Context, tuple: &Tuple) -> Result<Value, EvalError> {
    let function = ctx
        .function(&tuple.name)
        .ok_or_else(|| EvalError::unknown_function(&tuple.name).at(tuple.pos))?;

    let mut result = if tuple.bang {
        if let Some(custom) = function.evaluate_bang(ctx, &tuple.args) {
            custom.map_err(|e| e.at(tuple.pos))?
        } else {
            let Some(target) = bang_target(tuple) else {
                return Err(EvalError::modifier_misuse(format!(
                    "`{}!` requires its first argument to be a document or variable identifier",
                    tuple.name
                ))
                .at(tuple.pos));
            };
            let value = function
                .evaluate(ctx, &tuple.args)
                .map_err(|e| e.at(tuple.pos))?;
            write_target(ctx, target, value.clone())?;
            value
        }
    } else {
        function
            .evaluate(ctx, &tuple.args)
            .map_err(|e| e.at(tuple.pos))?
    };

    // A path on the head navigates into whatever the call produced.
    if let Some(path) = &tuple.path {
        result = path::get(&result, path).map_err(|e| e.at(tuple.pos))?;
    }
    Ok(result)
}
