//! Resolved response values: the output of [`crate::executor`] value
//! completion, as opposed to [`crate::ast::InputValue`] which is the literal
//! form a value takes in source text.

mod object;

pub use self::object::Object;

use std::fmt;

use arcstr::ArcStr;
use serde::{Serialize, Serializer};

/// A built-in scalar leaf value. Custom scalar representations are not part
/// of this crate's scope; every built-in scalar (`Int`, `Float`, `String`,
/// `Boolean`, `ID`) reduces to one of these four shapes.
#[derive(Clone, Debug, PartialEq)]
pub enum ScalarValue {
    Int(i64),
    Float(f64),
    String(ArcStr),
    Boolean(bool),
}

impl ScalarValue {
    pub fn as_int(&self) -> Option<i64> {
        match self {
            ScalarValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            ScalarValue::Int(v) => Some(*v as f64),
            ScalarValue::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ScalarValue::String(v) => Some(v.as_str()),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ScalarValue::Boolean(v) => Some(*v),
            _ => None,
        }
    }
}

impl From<i64> for ScalarValue {
    fn from(v: i64) -> Self {
        ScalarValue::Int(v)
    }
}
impl From<i32> for ScalarValue {
    fn from(v: i32) -> Self {
        ScalarValue::Int(v as i64)
    }
}
impl From<f64> for ScalarValue {
    fn from(v: f64) -> Self {
        ScalarValue::Float(v)
    }
}
impl From<bool> for ScalarValue {
    fn from(v: bool) -> Self {
        ScalarValue::Boolean(v)
    }
}
impl From<String> for ScalarValue {
    fn from(v: String) -> Self {
        ScalarValue::String(ArcStr::from(v))
    }
}
impl From<&str> for ScalarValue {
    fn from(v: &str) -> Self {
        ScalarValue::String(ArcStr::from(v))
    }
}
impl From<ArcStr> for ScalarValue {
    fn from(v: ArcStr) -> Self {
        ScalarValue::String(v)
    }
}

impl fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScalarValue::Int(v) => write!(f, "{v}"),
            ScalarValue::Float(v) => write!(f, "{v}"),
            ScalarValue::String(v) => write!(f, "{v:?}"),
            ScalarValue::Boolean(v) => write!(f, "{v}"),
        }
    }
}

impl Serialize for ScalarValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            ScalarValue::Int(v) => serializer.serialize_i64(*v),
            ScalarValue::Float(v) => serializer.serialize_f64(*v),
            ScalarValue::String(v) => serializer.serialize_str(v),
            ScalarValue::Boolean(v) => serializer.serialize_bool(*v),
        }
    }
}

/// A fully resolved GraphQL response value.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Null,
    Scalar(ScalarValue),
    List(Vec<Value>),
    Object(Object),
}

impl Value {
    pub fn null() -> Self {
        Value::Null
    }

    pub fn scalar(v: impl Into<ScalarValue>) -> Self {
        Value::Scalar(v.into())
    }

    pub fn list(v: Vec<Value>) -> Self {
        Value::List(v)
    }

    pub fn object(v: Object) -> Self {
        Value::Object(v)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_object(&self) -> Option<&Object> {
        match self {
            Value::Object(o) => Some(o),
            _ => None,
        }
    }

    pub fn as_object_mut(&mut self) -> Option<&mut Object> {
        match self {
            Value::Object(o) => Some(o),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_scalar(&self) -> Option<&ScalarValue> {
        match self {
            Value::Scalar(v) => Some(v),
            _ => None,
        }
    }
}

impl From<Object> for Value {
    fn from(o: Object) -> Self {
        Value::Object(o)
    }
}

impl<T: Into<ScalarValue>> From<T> for Value {
    fn from(v: T) -> Self {
        Value::Scalar(v.into())
    }
}

impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Value::Null => serializer.serialize_none(),
            Value::Scalar(s) => s.serialize(serializer),
            Value::List(items) => items.serialize(serializer),
            Value::Object(o) => o.serialize(serializer),
        }
    }
}
