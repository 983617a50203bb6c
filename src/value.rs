//! Values bound as statement parameters and read back from result rows.
//!
//! [`Value`] is a closed set of the shapes a relational driver hands over.
//! The query builder uses [`Value::is_present`] to decide whether a filter
//! applies at all, so search forms can pass possibly-unset fields straight
//! through without per-call null checks.

use std::collections::BTreeMap;
use std::fmt;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Named parameters of a rendered statement.
pub type Params = BTreeMap<String, Value>;

/// Identifier stored in the database for an id-backed enum.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EnumId {
    Int(i64),
    Text(String),
}

impl EnumId {
    /// The value bound for this identifier.
    pub fn to_value(&self) -> Value {
        match self {
            EnumId::Int(i) => Value::Int(*i),
            EnumId::Text(s) => Value::Text(s.clone()),
        }
    }
}

/// An enum variant carried as a value: its name plus an optional stored id.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumValue {
    pub name: String,
    pub id: Option<EnumId>,
}

impl EnumValue {
    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            id: None,
        }
    }

    pub fn with_id(name: &str, id: EnumId) -> Self {
        Self {
            name: name.to_string(),
            id: Some(id),
        }
    }

    /// Value bound for this variant: the id when present, else the name.
    pub fn bind_value(&self) -> Value {
        match &self.id {
            Some(id) => id.to_value(),
            None => Value::Text(self.name.clone()),
        }
    }
}

/// Implemented by application enums that are stored by name or by id.
pub trait SqlEnum {
    fn variant_name(&self) -> &'static str;

    fn id(&self) -> Option<EnumId> {
        None
    }

    fn to_enum_value(&self) -> EnumValue {
        EnumValue {
            name: self.variant_name().to_string(),
            id: self.id(),
        }
    }
}

/// A parameter or column value.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Decimal(Decimal),
    Text(String),
    Bytes(Vec<u8>),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    Time(NaiveTime),
    Enum(EnumValue),
    List(Vec<Value>),
    Json(serde_json::Value),
}

impl Value {
    /// Build a list value from anything convertible.
    pub fn list<I, T>(items: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Value>,
    {
        Value::List(items.into_iter().map(Into::into).collect())
    }

    pub fn from_enum<E: SqlEnum>(e: &E) -> Self {
        Value::Enum(e.to_enum_value())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Whether a filter on this value should be emitted.
    ///
    /// Numeric zero, blank text, empty bytes, JSON null and null are absent.
    /// A list is absent when every element is null or blank text.
    pub fn is_present(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Int(i) => *i != 0,
            Value::Float(f) => *f != 0.0,
            Value::Decimal(d) => !d.is_zero(),
            Value::Text(s) => !s.trim().is_empty(),
            Value::Bytes(b) => !b.is_empty(),
            Value::List(items) => items.iter().any(|v| !v.is_null_or_blank()),
            Value::Json(j) => !j.is_null(),
            Value::Bool(_)
            | Value::Date(_)
            | Value::DateTime(_)
            | Value::Time(_)
            | Value::Enum(_) => true,
        }
    }

    pub(crate) fn is_null_or_blank(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            Value::Decimal(d) => d.to_i64(),
            Value::Float(f) => Some(*f as i64),
            Value::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Form of this value handed to the gateway as a bound parameter.
    pub(crate) fn bind_form(&self, uppercase: bool) -> Value {
        match self {
            Value::Text(s) if uppercase => Value::Text(s.to_uppercase()),
            Value::Enum(e) => e.bind_value(),
            other => other.clone(),
        }
    }

    /// Render as JSON for struct conversion.
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::Value as Json;
        match self {
            Value::Null => Json::Null,
            Value::Bool(b) => Json::Bool(*b),
            Value::Int(i) => Json::from(*i),
            Value::Float(f) => serde_json::Number::from_f64(*f)
                .map(Json::Number)
                .unwrap_or(Json::Null),
            Value::Decimal(d) => Json::String(d.to_string()),
            Value::Text(s) => Json::String(s.clone()),
            Value::Bytes(b) => Json::String(BASE64.encode(b)),
            Value::Date(d) => Json::String(d.format("%Y-%m-%d").to_string()),
            Value::DateTime(dt) => Json::String(dt.format("%Y-%m-%dT%H:%M:%S%.f").to_string()),
            Value::Time(t) => Json::String(t.format("%H:%M:%S%.f").to_string()),
            Value::Enum(e) => Json::String(e.name.clone()),
            Value::List(items) => Json::Array(items.iter().map(Value::to_json).collect()),
            Value::Json(j) => j.clone(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", x),
            Value::Decimal(d) => write!(f, "{}", d),
            Value::Text(s) => write!(f, "{}", s),
            Value::Bytes(b) => write!(f, "{}", BASE64.encode(b)),
            Value::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Value::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S")),
            Value::Time(t) => write!(f, "{}", t.format("%H:%M:%S")),
            Value::Enum(e) => write!(f, "{}", e.name),
            Value::List(_) | Value::Json(_) => write!(f, "{}", self.to_json()),
        }
    }
}

// =============================================================================
// Conversions
// =============================================================================

macro_rules! impl_from_int {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Value {
                fn from(v: $t) -> Self {
                    Value::Int(v as i64)
                }
            }
        )*
    };
}

impl_from_int!(i8, i16, i32, i64, u8, u16, u32);

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(v as f64)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<Decimal> for Value {
    fn from(v: Decimal) -> Self {
        Value::Decimal(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<&String> for Value {
    fn from(v: &String) -> Self {
        Value::Text(v.clone())
    }
}

impl From<NaiveDate> for Value {
    fn from(v: NaiveDate) -> Self {
        Value::Date(v)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(v: NaiveDateTime) -> Self {
        Value::DateTime(v)
    }
}

impl From<NaiveTime> for Value {
    fn from(v: NaiveTime) -> Self {
        Value::Time(v)
    }
}

impl From<EnumValue> for Value {
    fn from(v: EnumValue) -> Self {
        Value::Enum(v)
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        Value::Json(v)
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Value::List(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}
