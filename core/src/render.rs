//! Human-readable rendering of mismatch values.
//!
//! Values render as compact JSON. Two exceptions:
//!
//! - a set at the top of an expected/got slot renders as `Set<[...]>`
//! - a [`Shown::Literal`] renders as its raw text, unquoted
//!
//! Undefined values and class descriptors have no JSON form: they render as
//! `undefined` at the top, are dropped from mappings, and become `null` inside
//! sequences. Nested sets render as `{}`.

use std::fmt;

use crate::Value;

/// What a mismatch shows in its expected/got slots.
#[derive(Debug, Clone, PartialEq)]
pub enum Shown {
    /// A value, rendered as JSON.
    Value(Value),
    /// Pre-formatted text, rendered as-is.
    Literal(String),
}

/// Wrap pre-formatted text for an expected/got slot.
///
/// ```
/// use shapecheck::{lit, Shown, Value};
///
/// assert_eq!(lit("length 2").to_string(), "length 2");
/// assert_eq!(Shown::Value(Value::from("length 2")).to_string(), "\"length 2\"");
/// ```
pub fn lit(text: impl Into<String>) -> Shown {
    Shown::Literal(text.into())
}

impl Shown {
    /// Returns the literal text, if this is a literal.
    #[must_use]
    pub fn as_literal(&self) -> Option<&str> {
        match self {
            Self::Literal(s) => Some(s),
            Self::Value(_) => None,
        }
    }

    /// Returns the value, if this is a value.
    #[must_use]
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Self::Value(v) => Some(v),
            Self::Literal(_) => None,
        }
    }
}

impl From<Value> for Shown {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}

impl fmt::Display for Shown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(s) => f.write_str(s),
            Self::Value(Value::Set(set)) => {
                let items: Vec<String> = set.iter().map(json_in_sequence).collect();
                write!(f, "Set<[{}]>", items.join(","))
            }
            Self::Value(v) => f.write_str(&to_json(v).unwrap_or_else(|| "undefined".to_owned())),
        }
    }
}

/// Compact JSON text for `value`, or `None` if it has no JSON form.
///
/// ```
/// use shapecheck::{to_json, Value};
///
/// let v = Value::mapping([("a", Value::from(1)), ("b", Value::Undefined)]);
/// assert_eq!(to_json(&v).as_deref(), Some(r#"{"a":1}"#));
/// assert_eq!(to_json(&Value::Undefined), None);
/// ```
#[must_use]
pub fn to_json(value: &Value) -> Option<String> {
    let text = match value {
        Value::Undefined | Value::Class(_) => return None,
        Value::Null => "null".to_owned(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => number(*n),
        Value::String(s) => quote(s),
        Value::Sequence(items) => {
            let items: Vec<String> = items.iter().map(json_in_sequence).collect();
            format!("[{}]", items.join(","))
        }
        Value::Set(_) => "{}".to_owned(),
        Value::Mapping(_) | Value::Instance(_) => {
            let fields = value.as_fields().into_iter().flatten();
            let members: Vec<String> = fields
                .filter_map(|(k, v)| to_json(v).map(|json| format!("{}:{json}", quote(k))))
                .collect();
            format!("{{{}}}", members.join(","))
        }
    };
    Some(text)
}

fn json_in_sequence(value: &Value) -> String {
    to_json(value).unwrap_or_else(|| "null".to_owned())
}

fn quote(s: &str) -> String {
    serde_json::Value::String(s.to_owned()).to_string()
}

fn number(n: f64) -> String {
    if !n.is_finite() {
        "null".to_owned()
    } else if n == 0.0 {
        // covers -0
        "0".to_owned()
    } else if n.abs() >= 1e21 || n.abs() < 1e-6 {
        // exponent form, sign always written: 1e+21, 1.5e-7
        let text = format!("{n:e}");
        match text.split_once('e') {
            Some((mantissa, exp)) if !exp.starts_with('-') => format!("{mantissa}e+{exp}"),
            _ => text,
        }
    } else {
        n.to_string()
    }
}
