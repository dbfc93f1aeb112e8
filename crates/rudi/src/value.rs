//! Canonical in-memory representation of the data a script manipulates.
//!
//! `Int` and `Float` are distinct variants; conversion between them (and
//! every other cross-variant operation) is governed by the active
//! [`Coalescer`](crate::coalescing::Coalescer). Equality at this layer is
//! purely structural.

use serde::de::{Deserialize, Deserializer};
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};
use serde_json::{Map as JsonMap, Number, Value as Json};
use std::collections::BTreeMap;
use std::fmt;

/// A JSON-shaped value: the document root, every variable, and every
/// intermediate result are `Value`s.
///
/// Objects use a `BTreeMap`, so key order is sorted and iteration is
/// stable across the whole process.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Vector(Vec<Value>),
    Object(BTreeMap<String, Value>),
}

impl Value {
    /// Lowercase variant name, as reported by the `type-of` builtin.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::Vector(_) => "vector",
            Value::Object(_) => "object",
        }
    }

    /// True for `null`, `false`, `0`, `0.0`, `""`, `[]` and `{}`.
    ///
    /// This is the mode-independent emptiness test behind `empty?` and
    /// `default`.
    pub fn is_empty_ish(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Bool(b) => !b,
            Value::Int(n) => *n == 0,
            Value::Float(f) => *f == 0.0,
            Value::String(s) => s.is_empty(),
            Value::Vector(v) => v.is_empty(),
            Value::Object(o) => o.is_empty(),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_vector(&self) -> Option<&[Value]> {
        match self {
            Value::Vector(v) => Some(v.as_slice()),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Value::Object(o) => Some(o),
            _ => None,
        }
    }
}

/// Renders a float so that it reads back as a float (`2.0`, not `2`).
pub(crate) fn format_float(f: f64) -> String {
    if f.fract() == 0.0 && f.is_finite() && f.abs() < 1e15 {
        format!("{f:.1}")
    } else {
        f.to_string()
    }
}

fn write_escaped(out: &mut fmt::Formatter<'_>, s: &str) -> fmt::Result {
    out.write_str("\"")?;
    for c in s.chars() {
        match c {
            '"' => out.write_str("\\\"")?,
            '\\' => out.write_str("\\\\")?,
            '\n' => out.write_str("\\n")?,
            '\t' => out.write_str("\\t")?,
            c if (c as u32) < 0x20 => write!(out, "\\u{:04x}", c as u32)?,
            c => write!(out, "{c}")?,
        }
    }
    out.write_str("\"")
}

/// Formats the value as source-language literal text, so that
/// `parse(format(v))` evaluates back to `v` for literal-representable
/// values.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(n) => write!(f, "{n}"),
            Value::Float(x) => f.write_str(&format_float(*x)),
            Value::String(s) => write_escaped(f, s),
            Value::Vector(elements) => {
                f.write_str("[")?;
                for (i, element) in elements.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{element}")?;
                }
                f.write_str("]")
            }
            Value::Object(entries) => {
                f.write_str("{")?;
                for (i, (key, value)) in entries.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write_escaped(f, key)?;
                    write!(f, " {value}")?;
                }
                f.write_str("}")
            }
        }
    }
}

impl Default for Value {
    fn default() -> Self {
        Value::Null
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Value::Vector(v)
    }
}

impl From<BTreeMap<String, Value>> for Value {
    fn from(o: BTreeMap<String, Value>) -> Self {
        Value::Object(o)
    }
}

impl From<Json> for Value {
    fn from(v: Json) -> Self {
        match v {
            Json::Null => Value::Null,
            Json::Bool(b) => Value::Bool(b),
            Json::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Int(i)
                } else if let Some(f) = n.as_f64() {
                    Value::Float(f)
                } else {
                    Value::Null
                }
            }
            Json::String(s) => Value::String(s),
            Json::Array(arr) => Value::Vector(arr.into_iter().map(Value::from).collect()),
            Json::Object(obj) => {
                Value::Object(obj.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
            }
        }
    }
}

impl From<Value> for Json {
    fn from(v: Value) -> Self {
        match v {
            Value::Null => Json::Null,
            Value::Bool(b) => Json::Bool(b),
            Value::Int(n) => Json::Number(Number::from(n)),
            Value::Float(f) => Number::from_f64(f).map(Json::Number).unwrap_or(Json::Null),
            Value::String(s) => Json::String(s),
            Value::Vector(elements) => {
                Json::Array(elements.into_iter().map(Json::from).collect())
            }
            Value::Object(entries) => {
                let map: JsonMap<String, Json> =
                    entries.into_iter().map(|(k, v)| (k, Json::from(v))).collect();
                Json::Object(map)
            }
        }
    }
}

impl From<&Value> for Json {
    fn from(v: &Value) -> Self {
        v.clone().into()
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Int(n) => serializer.serialize_i64(*n),
            Value::Float(f) => serializer.serialize_f64(*f),
            Value::String(s) => serializer.serialize_str(s),
            Value::Vector(elements) => {
                let mut seq = serializer.serialize_seq(Some(elements.len()))?;
                for element in elements {
                    seq.serialize_element(element)?;
                }
                seq.end()
            }
            Value::Object(entries) => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (key, value) in entries {
                    map.serialize_entry(key, value)?;
                }
                map.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(Json::deserialize(deserializer)?.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn json_round_trip() {
        let json = json!({
            "name": "rudi",
            "count": 3,
            "ratio": 0.5,
            "tags": ["a", "b", null],
            "nested": {"ok": true}
        });
        let value = Value::from(json.clone());
        assert_eq!(Json::from(value), json);
    }

    #[test]
    fn int_and_float_are_distinct_variants() {
        assert_ne!(Value::Int(1), Value::Float(1.0));
        assert_eq!(Value::from(json!(1)), Value::Int(1));
        assert_eq!(Value::from(json!(1.0)), Value::Float(1.0));
    }

    #[test]
    fn object_equality_ignores_key_order() {
        let a = Value::from(json!({"a": 1, "b": 2}));
        let b = Value::from(json!({"b": 2, "a": 1}));
        assert_eq!(a, b);
    }

    #[test]
    fn emptiness() {
        assert!(Value::Null.is_empty_ish());
        assert!(Value::Bool(false).is_empty_ish());
        assert!(Value::Int(0).is_empty_ish());
        assert!(Value::Float(0.0).is_empty_ish());
        assert!(Value::String(String::new()).is_empty_ish());
        assert!(Value::Vector(vec![]).is_empty_ish());
        assert!(!Value::Int(1).is_empty_ish());
        assert!(!Value::String(" ".into()).is_empty_ish());
    }

    #[test]
    fn literal_formatting() {
        assert_eq!(Value::Null.to_string(), "null");
        assert_eq!(Value::Int(42).to_string(), "42");
        assert_eq!(Value::Float(2.0).to_string(), "2.0");
        assert_eq!(Value::Float(2.5).to_string(), "2.5");
        assert_eq!(Value::from("a\"b\nc").to_string(), "\"a\\\"b\\nc\"");
        assert_eq!(
            Value::Vector(vec![Value::Int(1), Value::from("x")]).to_string(),
            "[1 \"x\"]"
        );
        assert_eq!(Value::from(json!({"k": 1})).to_string(), "{\"k\" 1}");
    }

    #[test]
    fn serde_serializes_natively() {
        let value = Value::from(json!({"a": [1, 2.5, "x", null, false]}));
        let text = serde_json::to_string(&value).unwrap();
        assert_eq!(text, r#"{"a":[1,2.5,"x",null,false]}"#);
        let back: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(back, value);
    }
}
