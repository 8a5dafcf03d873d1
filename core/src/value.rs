//! The generic dynamically-typed value model.
//!
//! Both the data being validated and the prototype describing it are
//! expressed as [`Value`] trees. The model mirrors what a JSON parser
//! produces (null, booleans, numbers, strings, arrays, string-keyed
//! mappings) plus two kinds JSON itself cannot carry: native dates and
//! opaque typed handles used for class-constraint checks.
//!
//! # Examples
//!
//! ```
//! use json_prototype_core::Value;
//! use serde_json::json;
//!
//! let value = Value::from(json!({ "name": "Ada", "age": 36 }));
//! assert_eq!(value.type_name(), "struct");
//! assert_eq!(value.as_struct().unwrap()["name"].as_str(), Some("Ada"));
//! ```

use std::collections::BTreeMap;

use chrono::NaiveDateTime;

/// A string-keyed mapping of values.
///
/// Key iteration order is deterministic (sorted), which keeps wildcard
/// field processing and unspecified-key pass-through reproducible.
pub type StructMap = BTreeMap<String, Value>;

/// An opaque, typed handle wrapping a value payload.
///
/// Used by class-mode validation: the handle's `type_name` is compared
/// against the prototype's class allow-list, and normalize/denormalize
/// hooks convert between the handle's payload and a plain [`Value`] tree.
#[derive(Debug, Clone, PartialEq)]
pub struct OpaqueValue {
    /// Runtime type name, possibly namespace-qualified (e.g. `billing.Money`).
    pub type_name: String,
    /// The wrapped payload.
    pub value: Box<Value>,
}

impl OpaqueValue {
    /// Creates an opaque handle with the given type name and payload.
    pub fn new(type_name: impl Into<String>, value: Value) -> Self {
        Self {
            type_name: type_name.into(),
            value: Box::new(value),
        }
    }
}

/// A dynamically-typed value as produced by parsing a JSON document.
///
/// This is a closed sum type: every type handler in the validation engine
/// matches on it exhaustively, so adding a kind is a compile-time visible
/// change.
///
/// # Examples
///
/// ```
/// use json_prototype_core::Value;
///
/// assert_eq!(Value::from(2.5).type_name(), "number");
/// assert_eq!(Value::from("hi").type_name(), "string");
/// assert_eq!(Value::Null.type_name(), "null");
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// The absent/null value.
    #[default]
    Null,
    /// A boolean.
    Bool(bool),
    /// A number; comparisons and bounds work in the f64 domain.
    Number(f64),
    /// A string.
    String(String),
    /// A native date-time.
    Date(NaiveDateTime),
    /// An ordered sequence.
    Array(Vec<Value>),
    /// A string-keyed mapping.
    Struct(StructMap),
    /// An opaque typed handle (see [`OpaqueValue`]).
    Opaque(OpaqueValue),
}

impl Value {
    /// Returns the runtime kind name used in class checks and messages.
    ///
    /// Opaque handles report their own type name; every other kind
    /// reports a fixed bare name.
    pub fn type_name(&self) -> &str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Date(_) => "date",
            Value::Array(_) => "array",
            Value::Struct(_) => "struct",
            Value::Opaque(o) => &o.type_name,
        }
    }

    /// Returns `true` for [`Value::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns the boolean if this is a [`Value::Bool`].
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the number if this is a [`Value::Number`].
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the string slice if this is a [`Value::String`].
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the date if this is a [`Value::Date`].
    pub fn as_date(&self) -> Option<NaiveDateTime> {
        match self {
            Value::Date(d) => Some(*d),
            _ => None,
        }
    }

    /// Returns the elements if this is a [`Value::Array`].
    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Returns the mapping if this is a [`Value::Struct`].
    pub fn as_struct(&self) -> Option<&StructMap> {
        match self {
            Value::Struct(map) => Some(map),
            _ => None,
        }
    }

    /// Converts to a [`serde_json::Value`] for serialization.
    ///
    /// Dates render as ISO-8601 strings; opaque handles render their
    /// payload (the type name is a runtime property, not data).
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Number(n) => serde_json::Number::from_f64(*n)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::Date(d) => {
                serde_json::Value::String(d.format("%Y-%m-%dT%H:%M:%S").to_string())
            }
            Value::Array(items) => {
                serde_json::Value::Array(items.iter().map(Value::to_json).collect())
            }
            Value::Struct(map) => serde_json::Value::Object(
                map.iter().map(|(k, v)| (k.clone(), v.to_json())).collect(),
            ),
            Value::Opaque(o) => o.value.to_json(),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
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

impl From<NaiveDateTime> for Value {
    fn from(d: NaiveDateTime) -> Self {
        Value::Date(d)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Array(items)
    }
}

impl From<StructMap> for Value {
    fn from(map: StructMap) -> Self {
        Value::Struct(map)
    }
}

impl From<OpaqueValue> for Value {
    fn from(o: OpaqueValue) -> Self {
        Value::Opaque(o)
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::Array(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => Value::Struct(
                map.into_iter().map(|(k, v)| (k, Value::from(v))).collect(),
            ),
        }
    }
}
