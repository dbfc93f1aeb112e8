//! Error types for the two engine layers: parsing and evaluation.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::ast::Pos;

/// Error produced while turning source text into a [`Program`](crate::ast::Program).
///
/// Carries the script name handed to [`parse`](crate::parse) plus the
/// line/column of the offending input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseError {
    pub script: String,
    pub line: usize,
    pub column: usize,
    pub message: String,
}

impl ParseError {
    pub fn new(script: impl Into<String>, line: usize, column: usize, message: impl Into<String>) -> Self {
        Self {
            script: script.into(),
            line,
            column,
            message: message.into(),
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}: {}", self.script, self.line, self.column, self.message)
    }
}

impl std::error::Error for ParseError {}

/// Classification of a runtime failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EvalErrorKind {
    /// Tuple head not present in the function registry.
    UnknownFunction,
    /// `$name` is unbound.
    UnknownVariable,
    /// A read walked past a missing key or out-of-range index.
    PathNotFound,
    /// Wrong variant for a path step, operation, or coalescer conversion.
    TypeMismatch,
    /// `!` applied to a tuple whose first argument is not an identifier.
    ModifierMisuse,
    /// Raised by a (host) function body.
    Function,
    /// Wrong number of arguments to a function.
    Arity,
}

/// Runtime evaluation error.
///
/// Errors unwind the whole evaluation immediately unless caught by `try`.
/// The position is filled in by the evaluator at the innermost dispatch
/// site that knows one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvalError {
    pub kind: EvalErrorKind,
    pub pos: Option<Pos>,
    pub message: String,
}

impl EvalError {
    pub fn new(kind: EvalErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            pos: None,
            message: message.into(),
        }
    }

    pub fn unknown_function(name: &str) -> Self {
        Self::new(EvalErrorKind::UnknownFunction, format!("unknown function {name:?}"))
    }

    pub fn unknown_variable(name: &str) -> Self {
        Self::new(EvalErrorKind::UnknownVariable, format!("unknown variable ${name}"))
    }

    pub fn path_not_found(message: impl Into<String>) -> Self {
        Self::new(EvalErrorKind::PathNotFound, message)
    }

    pub fn type_mismatch(message: impl Into<String>) -> Self {
        Self::new(EvalErrorKind::TypeMismatch, message)
    }

    pub fn modifier_misuse(message: impl Into<String>) -> Self {
        Self::new(EvalErrorKind::ModifierMisuse, message)
    }

    pub fn function(message: impl Into<String>) -> Self {
        Self::new(EvalErrorKind::Function, message)
    }

    pub fn arity(name: &str, message: impl Into<String>) -> Self {
        Self::new(EvalErrorKind::Arity, format!("{name}: {}", message.into()))
    }

    /// Attach a position unless one is already set.
    pub fn at(mut self, pos: Pos) -> Self {
        if self.pos.is_none() {
            self.pos = Some(pos);
        }
        self
    }
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.pos {
            Some(pos) => write!(f, "{pos}: {}", self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

impl std::error::Error for EvalError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_position_when_known() {
        let err = EvalError::unknown_function("frob").at(Pos::new(3, 7));
        assert_eq!(err.to_string(), "3:7: unknown function \"frob\"");

        let err = EvalError::type_mismatch("expected a string");
        assert_eq!(err.to_string(), "expected a string");
    }

    #[test]
    fn at_keeps_the_innermost_position() {
        let err = EvalError::path_not_found("no such key").at(Pos::new(1, 2)).at(Pos::new(9, 9));
        assert_eq!(err.pos, Some(Pos::new(1, 2)));
    }
}
