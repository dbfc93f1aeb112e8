//! # rudi
//!
//! An embeddable, non-Turing-complete scripting language for transforming
//! JSON-shaped data. A host supplies a document, variables and functions;
//! a script is a sequence of tuples that read and mutate the document,
//! and the run yields the last expression's value plus the (possibly
//! mutated) document.
//!
//! ## Module Roles
//!
//! | Module | Responsibility | Public Entry Points |
//! |---|---|---|
//! | `value` | In-memory value model + serde_json interop | [`Value`] |
//! | `coalescing` | Cross-type conversion rules, three strictness modes | [`Coalescer`], [`coalescing::pedantic`], [`coalescing::strict`], [`coalescing::humane`] |
//! | `lexer`/`parser` | Source text → position-tagged AST | [`parse`] |
//! | `path` | Reads/writes/deletes at a path inside a value | `path::{get, set, delete}` |
//! | `context` | Document handle, variable scopes, function registry | [`Context`], [`Document`], [`Variables`], [`Functions`] |
//! | `eval` | Tree-walking evaluator and the `!` write-back protocol | [`eval::run_program`] |
//! | `builtin` | The built-in function library | [`builtin::all`] |
//!
//! ## Termination
//!
//! There are no user-defined functions, no recursion and no unbounded
//! loops: every iteration construct walks a pre-existing finite
//! collection, so every program terminates.
//!
//! ## Hello World
//!
//! ```
//! use rudi::{parse, Value, Variables};
//! use serde_json::json;
//!
//! let program = parse("greeting", r#"(set! .greeting "hello") (to-upper .greeting)"#).unwrap();
//! let output = program
//!     .run(Value::from(json!({})), Variables::new(), rudi::builtin::all(), None)
//!     .unwrap();
//!
//! assert_eq!(output.value, Value::from("HELLO"));
//! assert_eq!(output.document, Value::from(json!({"greeting": "hello"})));
//! ```
//!
//! ## Registering a host function
//!
//! ```
//! use rudi::{eval_args, BasicFunction, Context, EvalError, Expression, Value};
//!
//! fn double(ctx: &Context, args: &[Expression]) -> Result<Value, EvalError> {
//!     let values = eval_args(ctx, args)?;
//!     let n = ctx.coalesce().to_integer(&values[0])?;
//!     Ok(Value::Int(n * 2))
//! }
//!
//! let mut functions = rudi::builtin::all();
//! functions.set("double", BasicFunction::new(double, "doubles an integer"));
//!
//! let program = rudi::parse("demo", "(double 21)").unwrap();
//! let output = program
//!     .run(Value::Null, rudi::Variables::new(), functions, None)
//!     .unwrap();
//! assert_eq!(output.value, Value::Int(42));
//! ```

use std::fmt;
use std::rc::Rc;

pub mod ast;
pub mod builtin;
pub mod coalescing;
pub mod context;
pub mod error;
pub mod eval;
pub mod lexer;
pub mod parser;
pub mod path;
pub mod value;

pub use ast::{Expression, Pos, Program, Statement};
pub use coalescing::{Coalescer, Humane, Pedantic, Strict};
pub use context::{BasicFunction, Context, Document, Function, Functions, TupleFn, Variables};
pub use error::{EvalError, EvalErrorKind, ParseError};
pub use eval::eval_args;
pub use parser::parse;
pub use value::Value;

/// Result of a completed [`Program::run`]: the document after all
/// mutations, and the value of the last statement.
#[derive(Debug, Clone, PartialEq)]
pub struct Output {
    pub document: Value,
    pub value: Value,
}

impl Program {
    /// Evaluate the program against a fresh document handle.
    ///
    /// `coalescer` defaults to strict. On error the document is dropped;
    /// hosts that need the partially mutated state build a [`Context`]
    /// around their own [`Document`] handle and call
    /// [`eval::run_program`] directly.
    pub fn run(
        &self,
        document: Value,
        variables: Variables,
        functions: Functions,
        coalescer: Option<Rc<dyn Coalescer>>,
    ) -> Result<Output, EvalError> {
        let doc = Document::new(document);
        let ctx = Context::new(doc.clone(), variables, functions, coalescer);
        let value = eval::run_program(&ctx, self)?;
        Ok(Output {
            document: doc.get(),
            value,
        })
    }
}

/// Either layer's failure, for hosts that parse and run in one step.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    Parse(ParseError),
    Eval(EvalError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Parse(e) => write!(f, "{e}"),
            Error::Eval(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for Error {}

impl From<ParseError> for Error {
    fn from(e: ParseError) -> Self {
        Error::Parse(e)
    }
}

impl From<EvalError> for Error {
    fn from(e: EvalError) -> Self {
        Error::Eval(e)
    }
}

/// Parse and run a script with the default runtime components: the full
/// builtin library, no variables, the strict coalescer.
pub fn run_script(script: &str, document: Value) -> Result<Output, Error> {
    let program = parse("script", script)?;
    Ok(program.run(document, Variables::new(), builtin::all(), None)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn scenario(source: &str, document: serde_json::Value) -> Output {
        let variables = Variables::new();
        variables.set("myvar", Value::Int(42));
        let program = parse("scenario", source).expect("parse");
        program
            .run(Value::from(document), variables, builtin::all(), None)
            .expect("run")
    }

    #[test]
    fn scenario_set_then_add() {
        let out = scenario("(set! .foo 42) (+ $myvar 42 .foo)", json!({"foo": 9000}));
        assert_eq!(out.value, Value::Int(126));
        assert_eq!(out.document, Value::from(json!({"foo": 42})));
    }

    #[test]
    fn scenario_branch_on_emptiness() {
        let out = scenario(
            "(if (gt? (len .users) 0) \"some\" \"none\")",
            json!({"users": []}),
        );
        assert_eq!(out.value, Value::from("none"));
    }

    #[test]
    fn scenario_map_squares() {
        let out = scenario("(map [1 2 3] [$x] (* $x $x))", json!(null));
        assert_eq!(out.value, Value::from(json!([1, 4, 9])));
    }

    #[test]
    fn scenario_try_fallback() {
        let out = scenario("(try (.missing.path) \"fallback\")", json!({"foo": 9000}));
        assert_eq!(out.value, Value::from("fallback"));
        assert_eq!(out.document, Value::from(json!({"foo": 9000})));
    }

    #[test]
    fn scenario_deep_set_materializes() {
        let out = scenario("(set! .a.b.c 7)", json!({}));
        assert_eq!(out.value, Value::Int(7));
        assert_eq!(out.document, Value::from(json!({"a": {"b": {"c": 7}}})));
    }

    #[test]
    fn scenario_coalescer_scopes() {
        let out = scenario("(humanely (eq? 1 \"1\"))", json!(null));
        assert_eq!(out.value, Value::Bool(true));

        let program = parse("scenario", "(strictly (eq? 1 \"1\"))").expect("parse");
        let err = program
            .run(Value::Null, Variables::new(), builtin::all(), None)
            .unwrap_err();
        assert_eq!(err.kind, EvalErrorKind::TypeMismatch);
    }

    #[test]
    fn non_bang_calls_do_not_mutate_the_document() {
        let out = scenario("(+ .a 1) .a", json!({"a": 5}));
        assert_eq!(out.value, Value::Int(5));
        assert_eq!(out.document, Value::from(json!({"a": 5})));
    }

    #[test]
    fn runs_are_deterministic() {
        let source = "(map . [$k $v] (concat \"=\" $k (to-string $v)))";
        let first = scenario(source, json!({"b": 2, "a": 1}));
        let second = scenario(source, json!({"b": 2, "a": 1}));
        assert_eq!(first, second);
    }

    #[test]
    fn literal_values_round_trip_through_formatting() {
        for value in [
            Value::Null,
            Value::Bool(true),
            Value::Int(-12),
            Value::Float(2.0),
            Value::Float(0.25),
            Value::from("a \"quoted\"\nline"),
            Value::from(json!([1, [2.5, "x"], {"k": null}])),
        ] {
            let out = run_script(&value.to_string(), Value::Null).expect("round trip");
            assert_eq!(out.value, value);
        }
    }

    #[test]
    fn empty_program_yields_null() {
        let out = run_script("", Value::Null).unwrap();
        assert_eq!(out.value, Value::Null);
    }

    #[test]
    fn default_coalescer_is_strict() {
        let out = scenario("(eq? 1 1.0)", json!(null));
        assert_eq!(out.value, Value::Bool(true));

        let program = parse("scenario", "(eq? 1 1.0)").expect("parse");
        let err = program
            .run(Value::Null, Variables::new(), builtin::all(), Some(coalescing::pedantic()))
            .unwrap_err();
        assert_eq!(err.kind, EvalErrorKind::TypeMismatch);
    }

    #[test]
    fn top_level_set_introduces_root_variables() {
        let out = scenario("(set! $fresh 5) (+ $fresh $myvar)", json!(null));
        assert_eq!(out.value, Value::Int(47));
    }

    #[test]
    fn parse_errors_carry_the_script_name() {
        let err = parse("myscript", "(do").unwrap_err();
        assert!(err.to_string().starts_with("myscript:1:1"));
    }
}
