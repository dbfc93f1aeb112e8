//! Type conversion rules used during comparisons, arithmetic and boolean
//! tests.
//!
//! Three named modes, in increasing permissiveness:
//!
//! | Mode | Bool ⇄ Number | Number ⇄ String | Null ⇄ X |
//! |---|---|---|---|
//! | [`Pedantic`] | forbidden | forbidden | forbidden |
//! | [`Strict`] | forbidden | forbidden | Null is distinct; Int ⇄ Float when integral |
//! | [`Humane`] | permitted | permitted | Null converts to the empty value |
//!
//! A forbidden conversion is an evaluation error, not a `false`.

use std::cmp::Ordering;
use std::rc::Rc;

use crate::error::EvalError;
use crate::value::{format_float, Value};

/// Strategy object deciding when a value of one variant may be treated as
/// another.
pub trait Coalescer {
    fn to_bool(&self, v: &Value) -> Result<bool, EvalError>;
    fn to_integer(&self, v: &Value) -> Result<i64, EvalError>;
    fn to_float(&self, v: &Value) -> Result<f64, EvalError>;
    fn to_string(&self, v: &Value) -> Result<String, EvalError>;
    fn equal(&self, a: &Value, b: &Value) -> Result<bool, EvalError>;
    /// Numeric or lexicographic ordering only; everything else is a type
    /// mismatch.
    fn ordering(&self, a: &Value, b: &Value) -> Result<Ordering, EvalError>;

    /// Mode-independent emptiness test.
    fn empty(&self, v: &Value) -> bool {
        v.is_empty_ish()
    }
}

pub fn pedantic() -> Rc<dyn Coalescer> {
    Rc::new(Pedantic)
}

pub fn strict() -> Rc<dyn Coalescer> {
    Rc::new(Strict)
}

pub fn humane() -> Rc<dyn Coalescer> {
    Rc::new(Humane)
}

fn conversion_error(v: &Value, target: &str) -> EvalError {
    EvalError::type_mismatch(format!("cannot coalesce {} into {target}", v.type_name()))
}

fn comparison_error(a: &Value, b: &Value) -> EvalError {
    EvalError::type_mismatch(format!(
        "cannot compare {} with {}",
        a.type_name(),
        b.type_name()
    ))
}

fn vectors_equal(c: &dyn Coalescer, a: &[Value], b: &[Value]) -> Result<bool, EvalError> {
    if a.len() != b.len() {
        return Ok(false);
    }
    for (x, y) in a.iter().zip(b) {
        if !c.equal(x, y)? {
            return Ok(false);
        }
    }
    Ok(true)
}

fn objects_equal(
    c: &dyn Coalescer,
    a: &std::collections::BTreeMap<String, Value>,
    b: &std::collections::BTreeMap<String, Value>,
) -> Result<bool, EvalError> {
    if a.len() != b.len() {
        return Ok(false);
    }
    for (key, x) in a {
        match b.get(key) {
            Some(y) if c.equal(x, y)? => {}
            _ => return Ok(false),
        }
    }
    Ok(true)
}

fn order_floats(a: f64, b: f64, va: &Value, vb: &Value) -> Result<Ordering, EvalError> {
    a.partial_cmp(&b).ok_or_else(|| comparison_error(va, vb))
}

/// Null only matches Null; no conversion whatsoever.
#[derive(Debug, Clone, Copy, Default)]
pub struct Pedantic;

impl Coalescer for Pedantic {
    fn to_bool(&self, v: &Value) -> Result<bool, EvalError> {
        match v {
            Value::Bool(b) => Ok(*b),
            other => Err(conversion_error(other, "bool")),
        }
    }

    fn to_integer(&self, v: &Value) -> Result<i64, EvalError> {
        match v {
            Value::Int(n) => Ok(*n),
            other => Err(conversion_error(other, "int")),
        }
    }

    fn to_float(&self, v: &Value) -> Result<f64, EvalError> {
        match v {
            Value::Float(f) => Ok(*f),
            other => Err(conversion_error(other, "float")),
        }
    }

    fn to_string(&self, v: &Value) -> Result<String, EvalError> {
        match v {
            Value::String(s) => Ok(s.clone()),
            other => Err(conversion_error(other, "string")),
        }
    }

    fn equal(&self, a: &Value, b: &Value) -> Result<bool, EvalError> {
        match (a, b) {
            (Value::Null, Value::Null) => Ok(true),
            (Value::Bool(x), Value::Bool(y)) => Ok(x == y),
            (Value::Int(x), Value::Int(y)) => Ok(x == y),
            (Value::Float(x), Value::Float(y)) => Ok(x == y),
            (Value::String(x), Value::String(y)) => Ok(x == y),
            (Value::Vector(x), Value::Vector(y)) => vectors_equal(self, x, y),
            (Value::Object(x), Value::Object(y)) => objects_equal(self, x, y),
            _ => Err(comparison_error(a, b)),
        }
    }

    fn ordering(&self, a: &Value, b: &Value) -> Result<Ordering, EvalError> {
        match (a, b) {
            (Value::Int(x), Value::Int(y)) => Ok(x.cmp(y)),
            (Value::Float(x), Value::Float(y)) => order_floats(*x, *y, a, b),
            (Value::String(x), Value::String(y)) => Ok(x.cmp(y)),
            _ => Err(comparison_error(a, b)),
        }
    }
}

/// The default mode: Int ⇄ Float where the value survives unchanged, Null
/// equal only to itself, everything else variant-exact.
#[derive(Debug, Clone, Copy, Default)]
pub struct Strict;

impl Coalescer for Strict {
    fn to_bool(&self, v: &Value) -> Result<bool, EvalError> {
        match v {
            Value::Bool(b) => Ok(*b),
            other => Err(conversion_error(other, "bool")),
        }
    }

    fn to_integer(&self, v: &Value) -> Result<i64, EvalError> {
        match v {
            Value::Int(n) => Ok(*n),
            Value::Float(f) if f.fract() == 0.0 && f.is_finite() => Ok(*f as i64),
            other => Err(conversion_error(other, "int")),
        }
    }

    fn to_float(&self, v: &Value) -> Result<f64, EvalError> {
        match v {
            Value::Int(n) => Ok(*n as f64),
            Value::Float(f) => Ok(*f),
            other => Err(conversion_error(other, "float")),
        }
    }

    fn to_string(&self, v: &Value) -> Result<String, EvalError> {
        match v {
            Value::String(s) => Ok(s.clone()),
            other => Err(conversion_error(other, "string")),
        }
    }

    fn equal(&self, a: &Value, b: &Value) -> Result<bool, EvalError> {
        match (a, b) {
            (Value::Null, Value::Null) => Ok(true),
            (Value::Null, _) | (_, Value::Null) => Ok(false),
            (Value::Bool(x), Value::Bool(y)) => Ok(x == y),
            (Value::Int(x), Value::Int(y)) => Ok(x == y),
            (Value::Float(x), Value::Float(y)) => Ok(x == y),
            (Value::Int(x), Value::Float(y)) => Ok(*x as f64 == *y),
            (Value::Float(x), Value::Int(y)) => Ok(*x == *y as f64),
            (Value::String(x), Value::String(y)) => Ok(x == y),
            (Value::Vector(x), Value::Vector(y)) => vectors_equal(self, x, y),
            (Value::Object(x), Value::Object(y)) => objects_equal(self, x, y),
            _ => Err(comparison_error(a, b)),
        }
    }

    fn ordering(&self, a: &Value, b: &Value) -> Result<Ordering, EvalError> {
        match (a, b) {
            (Value::Int(x), Value::Int(y)) => Ok(x.cmp(y)),
            (Value::Int(_) | Value::Float(_), Value::Int(_) | Value::Float(_)) => {
                order_floats(self.to_float(a)?, self.to_float(b)?, a, b)
            }
            (Value::String(x), Value::String(y)) => Ok(x.cmp(y)),
            _ => Err(comparison_error(a, b)),
        }
    }
}

/// Converts across bool/number/string the way a person reading the script
/// would expect. `""`, `"0"`, `"false"`, `"no"` and `"off"` count as
/// false; any other string is true.
#[derive(Debug, Clone, Copy, Default)]
pub struct Humane;

impl Humane {
    fn scalar_to_f64(&self, v: &Value) -> Option<f64> {
        match v {
            Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            Value::Int(n) => Some(*n as f64),
            Value::Float(f) => Some(*f),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        }
    }
}

impl Coalescer for Humane {
    fn to_bool(&self, v: &Value) -> Result<bool, EvalError> {
        match v {
            Value::Null => Ok(false),
            Value::Bool(b) => Ok(*b),
            Value::Int(n) => Ok(*n != 0),
            Value::Float(f) => Ok(*f != 0.0),
            Value::String(s) => {
                let norm = s.trim().to_ascii_lowercase();
                Ok(!matches!(norm.as_str(), "" | "0" | "false" | "no" | "off"))
            }
            Value::Vector(elements) => Ok(!elements.is_empty()),
            Value::Object(entries) => Ok(!entries.is_empty()),
        }
    }

    fn to_integer(&self, v: &Value) -> Result<i64, EvalError> {
        match v {
            Value::Null => Ok(0),
            Value::Bool(b) => Ok(i64::from(*b)),
            Value::Int(n) => Ok(*n),
            Value::Float(f) if f.fract() == 0.0 && f.is_finite() => Ok(*f as i64),
            Value::String(s) => {
                let trimmed = s.trim();
                if let Ok(n) = trimmed.parse::<i64>() {
                    return Ok(n);
                }
                match trimmed.parse::<f64>() {
                    Ok(f) if f.fract() == 0.0 && f.is_finite() => Ok(f as i64),
                    _ => Err(conversion_error(v, "int")),
                }
            }
            other => Err(conversion_error(other, "int")),
        }
    }

    fn to_float(&self, v: &Value) -> Result<f64, EvalError> {
        match v {
            Value::Null => Ok(0.0),
            other => self
                .scalar_to_f64(other)
                .ok_or_else(|| conversion_error(other, "float")),
        }
    }

    fn to_string(&self, v: &Value) -> Result<String, EvalError> {
        match v {
            Value::Null => Ok(String::new()),
            Value::Bool(b) => Ok(b.to_string()),
            Value::Int(n) => Ok(n.to_string()),
            Value::Float(f) => Ok(format_float(*f)),
            Value::String(s) => Ok(s.clone()),
            other => Err(conversion_error(other, "string")),
        }
    }

    fn equal(&self, a: &Value, b: &Value) -> Result<bool, EvalError> {
        match (a, b) {
            (Value::Null, Value::Null) => Ok(true),
            (Value::Null, _) | (_, Value::Null) => Ok(false),
            (Value::Vector(x), Value::Vector(y)) => vectors_equal(self, x, y),
            (Value::Object(x), Value::Object(y)) => objects_equal(self, x, y),
            (Value::Vector(_) | Value::Object(_), _) | (_, Value::Vector(_) | Value::Object(_)) => {
                Ok(false)
            }
            _ => match (self.scalar_to_f64(a), self.scalar_to_f64(b)) {
                (Some(x), Some(y)) => Ok(x == y),
                _ => Ok(self.to_string(a)? == self.to_string(b)?),
            },
        }
    }

    fn ordering(&self, a: &Value, b: &Value) -> Result<Ordering, EvalError> {
        if let (Some(x), Some(y)) = (self.scalar_to_f64(a), self.scalar_to_f64(b)) {
            return order_floats(x, y, a, b);
        }
        Ok(self.to_string(a)?.cmp(&self.to_string(b)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pedantic_rejects_cross_variant_equality() {
        let c = Pedantic;
        assert!(c.equal(&Value::Int(1), &Value::Float(1.0)).is_err());
        assert!(c.equal(&Value::Int(1), &Value::from("1")).is_err());
        assert!(c.equal(&Value::Null, &Value::Bool(false)).is_err());
        assert_eq!(c.equal(&Value::Int(1), &Value::Int(1)), Ok(true));
    }

    #[test]
    fn strict_spans_int_and_float_only() {
        let c = Strict;
        assert_eq!(c.equal(&Value::Int(1), &Value::Float(1.0)), Ok(true));
        assert_eq!(c.equal(&Value::Int(1), &Value::Float(1.5)), Ok(false));
        assert_eq!(c.equal(&Value::Null, &Value::Int(0)), Ok(false));
        assert!(c.equal(&Value::Int(1), &Value::from("1")).is_err());
        assert!(c.to_bool(&Value::Int(1)).is_err());
        assert_eq!(c.to_integer(&Value::Float(3.0)), Ok(3));
        assert!(c.to_integer(&Value::Float(3.5)).is_err());
    }

    #[test]
    fn humane_crosses_numbers_strings_and_bools() {
        let c = Humane;
        assert_eq!(c.equal(&Value::Int(1), &Value::from("1")), Ok(true));
        assert_eq!(c.equal(&Value::Bool(true), &Value::Int(1)), Ok(true));
        assert_eq!(c.equal(&Value::from("1.0"), &Value::Int(1)), Ok(true));
        assert_eq!(c.equal(&Value::from("abc"), &Value::Int(1)), Ok(false));
        assert_eq!(c.equal(&Value::Null, &Value::Int(0)), Ok(false));
        assert_eq!(c.to_bool(&Value::from("no")), Ok(false));
        assert_eq!(c.to_bool(&Value::from("anything")), Ok(true));
        assert_eq!(c.to_integer(&Value::from(" 12 ")), Ok(12));
    }

    #[test]
    fn ordering_is_numeric_or_lexicographic() {
        let c = Strict;
        assert_eq!(c.ordering(&Value::Int(2), &Value::Float(2.5)), Ok(Ordering::Less));
        assert_eq!(c.ordering(&Value::from("a"), &Value::from("b")), Ok(Ordering::Less));
        assert!(c.ordering(&Value::Bool(true), &Value::Bool(false)).is_err());
        assert!(c.ordering(&Value::Int(1), &Value::from("2")).is_err());

        let h = Humane;
        assert_eq!(h.ordering(&Value::Int(10), &Value::from("9")), Ok(Ordering::Greater));
    }

    #[test]
    fn nested_equality_uses_the_same_mode() {
        let strict = Strict;
        let a = Value::Vector(vec![Value::Int(1)]);
        let b = Value::Vector(vec![Value::Float(1.0)]);
        assert_eq!(strict.equal(&a, &b), Ok(true));
        assert!(Pedantic.equal(&a, &b).is_err());
    }
}
