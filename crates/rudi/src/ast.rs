//! Typed abstract syntax tree produced by the parser.
//!
//! Nodes are immutable after parsing and carry the source position they
//! started at. `Display` renders a node back into source form, which is
//! what error messages and the AST dump use.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::value::Value;

/// Line/column source position, 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Pos {
    pub line: usize,
    pub column: usize,
}

impl Pos {
    pub const ZERO: Pos = Pos { line: 0, column: 0 };

    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A parsed script: an ordered sequence of statements.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    /// Script name as given to `parse`; used in error messages.
    pub name: String,
    pub statements: Vec<Statement>,
}

/// A single top-level expression.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub expression: Expression,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Literal(Literal),
    Vector(VectorNode),
    Object(ObjectNode),
    Symbol(Symbol),
    Tuple(Tuple),
    /// An already-evaluated value wrapped as an expression so builtins can
    /// re-enter the evaluator with computed arguments. Never produced by
    /// the parser.
    Shim(Shim),
}

impl Expression {
    pub fn pos(&self) -> Pos {
        match self {
            Expression::Literal(n) => n.pos,
            Expression::Vector(n) => n.pos,
            Expression::Object(n) => n.pos,
            Expression::Symbol(n) => n.pos,
            Expression::Tuple(n) => n.pos,
            Expression::Shim(_) => Pos::ZERO,
        }
    }

    /// True for document (`.path`) and variable (`$name.path`) symbols —
    /// the only expressions the `!` modifier can write back into.
    pub fn is_identifier(&self) -> bool {
        matches!(
            self,
            Expression::Symbol(Symbol {
                kind: SymbolKind::Document | SymbolKind::Variable(_),
                ..
            })
        )
    }
}

/// A scalar literal: null, bool, integer, float or string.
#[derive(Debug, Clone, PartialEq)]
pub struct Literal {
    pub value: Value,
    pub pos: Pos,
}

/// `[expr expr …]`
#[derive(Debug, Clone, PartialEq)]
pub struct VectorNode {
    pub elements: Vec<Expression>,
    pub pos: Pos,
}

/// `{keyExpr valueExpr …}`
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectNode {
    pub entries: Vec<(Expression, Expression)>,
    pub pos: Pos,
}

/// A name-shaped node: a document path, a variable path, or a bare
/// function name (only meaningful to builtins like `map`).
#[derive(Debug, Clone, PartialEq)]
pub struct Symbol {
    pub kind: SymbolKind,
    pub path: Option<PathExpression>,
    pub pos: Pos,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SymbolKind {
    /// `.`-led accessor into the shared document.
    Document,
    /// `$name` accessor into the variable scope.
    Variable(String),
    /// A bare function name, e.g. the `to-upper` in `(map .xs to-upper)`.
    Name { name: String, bang: bool },
}

/// `(head arg1 … argN)` — the sole call form.
#[derive(Debug, Clone, PartialEq)]
pub struct Tuple {
    pub name: String,
    /// The `!` modifier: write the result back into the first argument.
    pub bang: bool,
    /// Optional path applied to the call's result.
    pub path: Option<PathExpression>,
    pub args: Vec<Expression>,
    pub pos: Pos,
}

/// See [`Expression::Shim`].
#[derive(Debug, Clone, PartialEq)]
pub struct Shim {
    pub value: Value,
}

/// Non-empty ordered sequence of steps addressing a position inside a
/// value.
#[derive(Debug, Clone, PartialEq)]
pub struct PathExpression {
    pub steps: Vec<PathStep>,
}

impl PathExpression {
    pub fn new(steps: Vec<PathStep>) -> Self {
        Self { steps }
    }
}

impl From<Vec<PathStep>> for PathExpression {
    fn from(steps: Vec<PathStep>) -> Self {
        Self { steps }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathStep {
    Key(String),
    Index(usize),
}

impl fmt::Display for PathStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathStep::Key(key) => write!(f, ".{key}"),
            PathStep::Index(index) => write!(f, "[{index}]"),
        }
    }
}

impl fmt::Display for PathExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for step in &self.steps {
            write!(f, "{step}")?;
        }
        Ok(())
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            SymbolKind::Document => match &self.path {
                None => f.write_str("."),
                Some(path) => match path.steps.first() {
                    Some(PathStep::Key(_)) => write!(f, "{path}"),
                    _ => write!(f, ".{path}"),
                },
            },
            SymbolKind::Variable(name) => {
                write!(f, "${name}")?;
                if let Some(path) = &self.path {
                    write!(f, "{path}")?;
                }
                Ok(())
            }
            SymbolKind::Name { name, bang } => {
                write!(f, "{name}")?;
                if *bang {
                    f.write_str("!")?;
                }
                if let Some(path) = &self.path {
                    write!(f, "{path}")?;
                }
                Ok(())
            }
        }
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Literal(n) => write!(f, "{}", n.value),
            Expression::Shim(n) => write!(f, "{}", n.value),
            Expression::Vector(n) => {
                f.write_str("[")?;
                for (i, element) in n.elements.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{element}")?;
                }
                f.write_str("]")
            }
            Expression::Object(n) => {
                f.write_str("{")?;
                for (i, (key, value)) in n.entries.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{key} {value}")?;
                }
                f.write_str("}")
            }
            Expression::Symbol(n) => write!(f, "{n}"),
            Expression::Tuple(n) => write!(f, "{n}"),
        }
    }
}

impl fmt::Display for Tuple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}", self.name)?;
        if self.bang {
            f.write_str("!")?;
        }
        if let Some(path) = &self.path {
            write!(f, "{path}")?;
        }
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        f.write_str(")")
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.expression)
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, statement) in self.statements.iter().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            write!(f, "{statement}")?;
        }
        Ok(())
    }
}
