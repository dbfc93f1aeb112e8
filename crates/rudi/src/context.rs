//! Evaluation context: the document handle, the variable scope, the
//! function registry and the active coalescer.
//!
//! A `Context` is logically immutable — `with_variable`/`with_coalescer`
//! build a derived context sharing the same document handle. The document
//! is the only piece mutated in place; variables live in a chain of
//! scopes that derived contexts extend without touching the caller's.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::ast::Expression;
use crate::coalescing::{strict, Coalescer};
use crate::error::EvalError;
use crate::value::Value;

/// Handle on the single mutable value a script operates on.
///
/// The handle is reference-shared: every context derived during one run
/// sees writes made through any other.
#[derive(Clone, Default)]
pub struct Document {
    data: Rc<RefCell<Value>>,
}

impl Document {
    pub fn new(data: Value) -> Self {
        Self {
            data: Rc::new(RefCell::new(data)),
        }
    }

    /// Snapshot of the current root value.
    pub fn get(&self) -> Value {
        self.data.borrow().clone()
    }

    /// Replace the root value.
    pub fn set(&self, data: Value) {
        *self.data.borrow_mut() = data;
    }
}

/// Named values addressed by `$name`, held as a chain of lexical scopes.
///
/// `with` pushes a child scope holding one shadowing binding — how
/// iteration functions bind their loop variables without touching the
/// caller's names. `set` rebinds in the nearest scope that defines the
/// name, falling back to the root scope for new names; a binding made
/// inside a loop body therefore outlives the loop unless the loop itself
/// shadows it.
#[derive(Clone, Default)]
pub struct Variables {
    scope: Rc<Scope>,
}

#[derive(Default)]
struct Scope {
    bindings: RefCell<HashMap<String, Value>>,
    parent: Option<Rc<Scope>>,
}

impl Variables {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        let mut scope = Some(&self.scope);
        while let Some(current) = scope {
            if let Some(value) = current.bindings.borrow().get(name) {
                return Some(value.clone());
            }
            scope = current.parent.as_ref();
        }
        None
    }

    pub fn has(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Rebind in the nearest scope that defines the name, or bind at the
    /// root scope if no scope does.
    pub fn set(&self, name: impl Into<String>, value: Value) -> &Self {
        let name = name.into();
        let mut scope = &self.scope;
        loop {
            if scope.bindings.borrow().contains_key(&name) {
                break;
            }
            match &scope.parent {
                Some(parent) => scope = parent,
                None => break,
            }
        }
        scope.bindings.borrow_mut().insert(name, value);
        self
    }

    /// A derived scope chain with one extra shadowing binding.
    pub fn with(&self, name: impl Into<String>, value: Value) -> Variables {
        let child = Scope {
            bindings: RefCell::new(HashMap::from([(name.into(), value)])),
            parent: Some(self.scope.clone()),
        };
        Variables {
            scope: Rc::new(child),
        }
    }
}

impl FromIterator<(String, Value)> for Variables {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Variables {
            scope: Rc::new(Scope {
                bindings: RefCell::new(iter.into_iter().collect()),
                parent: None,
            }),
        }
    }
}

/// A callable registered under a name.
///
/// Arguments arrive unevaluated so the function decides which to
/// evaluate, and in which context — this is what makes `if`, `and`/`or`,
/// `try`, `map` and the coalescer scopes possible.
pub trait Function {
    fn evaluate(&self, ctx: &Context, args: &[Expression]) -> Result<Value, EvalError>;

    /// Short, one-line description of the function.
    fn description(&self) -> &str;

    /// Custom behavior for the `!` modifier. `None` (the default) makes
    /// the evaluator apply the generic protocol: write the result back
    /// into the first argument's target.
    fn evaluate_bang(&self, _ctx: &Context, _args: &[Expression]) -> Option<Result<Value, EvalError>> {
        None
    }
}

/// Plain function signature for the common case.
pub type TupleFn = fn(&Context, &[Expression]) -> Result<Value, EvalError>;

/// Wraps a bare `fn` plus a description into a [`Function`].
pub struct BasicFunction {
    f: TupleFn,
    desc: &'static str,
}

impl BasicFunction {
    pub fn new(f: TupleFn, desc: &'static str) -> Self {
        Self { f, desc }
    }
}

impl Function for BasicFunction {
    fn evaluate(&self, ctx: &Context, args: &[Expression]) -> Result<Value, EvalError> {
        (self.f)(ctx, args)
    }

    fn description(&self) -> &str {
        self.desc
    }
}

/// Name → callable mapping. Registries compose by set union; later
/// additions override earlier ones with the same name.
#[derive(Clone, Default)]
pub struct Functions {
    funcs: HashMap<String, Rc<dyn Function>>,
}

impl Functions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<Rc<dyn Function>> {
        self.funcs.get(name).cloned()
    }

    /// Set/replace a function.
    pub fn set(&mut self, name: impl Into<String>, function: impl Function + 'static) -> &mut Self {
        self.funcs.insert(name.into(), Rc::new(function));
        self
    }

    /// Remove a single function by name.
    pub fn delete(&mut self, name: &str) -> &mut Self {
        self.funcs.remove(name);
        self
    }

    /// Add all functions from `other`, overriding on name collisions.
    pub fn add(&mut self, other: &Functions) -> &mut Self {
        for (name, function) in &other.funcs {
            self.funcs.insert(name.clone(), function.clone());
        }
        self
    }

    /// Remove every function that is also part of `other`, enabling
    /// constructs like `all.remove(&math)`.
    pub fn remove(&mut self, other: &Functions) -> &mut Self {
        for name in other.funcs.keys() {
            self.funcs.remove(name);
        }
        self
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.funcs.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.funcs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.funcs.is_empty()
    }
}

/// Bundle passed to every evaluation site.
#[derive(Clone)]
pub struct Context {
    document: Document,
    variables: Variables,
    functions: Rc<Functions>,
    coalescer: Rc<dyn Coalescer>,
}

impl Context {
    pub fn new(
        document: Document,
        variables: Variables,
        functions: Functions,
        coalescer: Option<Rc<dyn Coalescer>>,
    ) -> Self {
        Self {
            document,
            variables,
            functions: Rc::new(functions),
            coalescer: coalescer.unwrap_or_else(strict),
        }
    }

    /// Named to make the frequent call sites read fluently, e.g.
    /// `ctx.coalesce().to_bool(&v)`.
    pub fn coalesce(&self) -> &dyn Coalescer {
        self.coalescer.as_ref()
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn variable(&self, name: &str) -> Option<Value> {
        self.variables.get(name)
    }

    pub fn variables(&self) -> &Variables {
        &self.variables
    }

    pub fn function(&self, name: &str) -> Option<Rc<dyn Function>> {
        self.functions.get(name)
    }

    pub fn functions(&self) -> &Functions {
        &self.functions
    }

    /// Rebind in the nearest scope. Used by the `!` write-back on
    /// variable targets.
    pub(crate) fn set_variable(&self, name: &str, value: Value) {
        self.variables.set(name, value);
    }

    /// Derived context with one extra binding in a child scope.
    pub fn with_variable(&self, name: impl Into<String>, value: Value) -> Context {
        Context {
            document: self.document.clone(),
            variables: self.variables.with(name, value),
            functions: self.functions.clone(),
            coalescer: self.coalescer.clone(),
        }
    }

    /// Derived context with another coalescer; everything else shared.
    pub fn with_coalescer(&self, coalescer: Rc<dyn Coalescer>) -> Context {
        Context {
            document: self.document.clone(),
            variables: self.variables.clone(),
            functions: self.functions.clone(),
            coalescer,
        }
    }
}
