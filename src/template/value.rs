use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Values bound to (or extracted from) named template fields.
pub type Bindings = BTreeMap<String, Value>;

/// A value of a template field.
///
/// Fields formatted with `d` hold integers, fields with `f` hold floats and everything else is
/// kept as text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Int(i64),
    Float(f64),
    Str(String),
}

impl Value {
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Str(s) => f.write_str(s),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v.into())
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

/// Build [`Bindings`] from `name => value` pairs.
///
/// ```
/// use jasmin_tracks::bindings;
///
/// let b = bindings! { "year" => 1979, "hemisphere" => "NH" };
/// assert_eq!(b.len(), 2);
/// ```
#[macro_export]
macro_rules! bindings {
    () => { $crate::template::Bindings::new() };
    ($($name:expr => $value:expr),+ $(,)?) => {{
        let mut b = $crate::template::Bindings::new();
        $( b.insert(String::from($name), $crate::template::Value::from($value)); )+
        b
    }};
}
