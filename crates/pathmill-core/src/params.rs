//! Typed parameter values shared by shape schemas and tools.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Ordered mapping of parameter key to value.
pub type ParamMap = BTreeMap<String, ParamValue>;

/// A single parameter value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl ParamValue {
    /// Get the value as a float, widening integers.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ParamValue::Float(v) => Some(*v),
            ParamValue::Int(v) => Some(*v as f64),
            _ => None,
        }
    }

    /// Get the value as an integer (floats are not truncated).
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ParamValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Get the value as a string slice.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParamValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Get the value as a boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ParamValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// The kind this value naturally belongs to.
    pub fn kind(&self) -> ParamKind {
        match self {
            ParamValue::Bool(_) => ParamKind::Bool,
            ParamValue::Int(_) => ParamKind::Int,
            ParamValue::Float(_) => ParamKind::Float,
            ParamValue::Text(_) => ParamKind::Text,
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::Bool(b) => write!(f, "{}", b),
            ParamValue::Int(v) => write!(f, "{}", v),
            ParamValue::Float(v) => write!(f, "{}", v),
            ParamValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<f64> for ParamValue {
    fn from(v: f64) -> Self {
        ParamValue::Float(v)
    }
}

impl From<i64> for ParamValue {
    fn from(v: i64) -> Self {
        ParamValue::Int(v)
    }
}

impl From<i32> for ParamValue {
    fn from(v: i32) -> Self {
        ParamValue::Int(v.into())
    }
}

impl From<bool> for ParamValue {
    fn from(v: bool) -> Self {
        ParamValue::Bool(v)
    }
}

impl From<&str> for ParamValue {
    fn from(v: &str) -> Self {
        ParamValue::Text(v.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(v: String) -> Self {
        ParamValue::Text(v)
    }
}

/// Declared type of a schema parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamKind {
    Float,
    Int,
    Bool,
    Text,
}

impl ParamKind {
    /// Coerce a value into this kind.
    ///
    /// Integers widen to floats; floats narrow to integers only when they
    /// carry no fractional part. Booleans and text never convert.
    pub fn coerce(self, value: &ParamValue) -> Option<ParamValue> {
        match (self, value) {
            (ParamKind::Float, ParamValue::Float(v)) => Some(ParamValue::Float(*v)),
            (ParamKind::Float, ParamValue::Int(v)) => Some(ParamValue::Float(*v as f64)),
            (ParamKind::Int, ParamValue::Int(v)) => Some(ParamValue::Int(*v)),
            (ParamKind::Int, ParamValue::Float(v))
                if v.fract() == 0.0 && *v >= i64::MIN as f64 && *v <= i64::MAX as f64 =>
            {
                Some(ParamValue::Int(*v as i64))
            }
            (ParamKind::Bool, ParamValue::Bool(b)) => Some(ParamValue::Bool(*b)),
            (ParamKind::Text, ParamValue::Text(s)) => Some(ParamValue::Text(s.clone())),
            _ => None,
        }
    }

    /// Parse text entered by the user into a value of this kind.
    pub fn parse(self, text: &str) -> Option<ParamValue> {
        let text = text.trim();
        match self {
            ParamKind::Float => text.parse::<f64>().ok().filter(|v| v.is_finite()).map(ParamValue::Float),
            ParamKind::Int => text.parse::<i64>().ok().map(ParamValue::Int),
            ParamKind::Bool => match text.to_ascii_lowercase().as_str() {
                "true" | "yes" | "on" | "1" => Some(ParamValue::Bool(true)),
                "false" | "no" | "off" | "0" => Some(ParamValue::Bool(false)),
                _ => None,
            },
            ParamKind::Text => Some(ParamValue::Text(text.to_string())),
        }
    }
}
