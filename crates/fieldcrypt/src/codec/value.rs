//! Flat record model: field name → tagged [`FieldValue`].

use std::collections::btree_map::{self, BTreeMap};

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use thiserror::Error;

/// A single field value. Nested arrays and objects are not representable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Null,
    Bool(bool),
    /// Integer or float; integers keep their integer representation.
    Number(Number),
    String(String),
}

impl FieldValue {
    /// A float value, or `None` for NaN and infinities.
    pub fn from_f64(v: f64) -> Option<Self> {
        Number::from_f64(v).map(FieldValue::Number)
    }

    /// Returns `true` for JSON `null`.
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    /// The string payload, if this is a string value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::String(s) => Some(s),
            _ => None,
        }
    }
}

impl From<bool> for FieldValue {
    fn from(v: bool) -> Self {
        FieldValue::Bool(v)
    }
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        FieldValue::Number(v.into())
    }
}

impl From<u64> for FieldValue {
    fn from(v: u64) -> Self {
        FieldValue::Number(v.into())
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        FieldValue::String(v.to_owned())
    }
}

impl From<String> for FieldValue {
    fn from(v: String) -> Self {
        FieldValue::String(v)
    }
}

impl From<FieldValue> for Value {
    fn from(v: FieldValue) -> Self {
        match v {
            FieldValue::Null => Value::Null,
            FieldValue::Bool(b) => Value::Bool(b),
            FieldValue::Number(n) => Value::Number(n),
            FieldValue::String(s) => Value::String(s),
        }
    }
}

/// Errors converting loosely-typed JSON into a [`Record`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RecordError {
    /// The JSON value is not an object.
    #[error("record must be a JSON object")]
    NotAnObject,

    /// A field holds an array or object.
    #[error("field {field} holds a nested value, which records cannot carry")]
    UnsupportedValue { field: String },
}

/// One entity as a flat map from field name to value.
///
/// Used both for plaintext records and for their encrypted form, where each
/// sensitive field holds a CipherField token string. Serialises as a flat
/// JSON object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(BTreeMap<String, FieldValue>);

impl Record {
    /// An empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Value of `field`, if present.
    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.0.get(field)
    }

    /// Mutable access to the value of `field`.
    pub fn get_mut(&mut self, field: &str) -> Option<&mut FieldValue> {
        self.0.get_mut(field)
    }

    /// Set `field`, returning the previous value.
    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<FieldValue>) -> Option<FieldValue> {
        self.0.insert(field.into(), value.into())
    }

    /// Returns `true` if `field` is present, even when it holds `null`.
    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the record has no fields.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Fields in name order.
    pub fn iter(&self) -> btree_map::Iter<'_, String, FieldValue> {
        self.0.iter()
    }

    /// Convert a JSON object into a record.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::NotAnObject`] for non-objects and
    /// [`RecordError::UnsupportedValue`] for nested arrays or objects.
    pub fn from_json(value: Value) -> Result<Self, RecordError> {
        let Value::Object(map) = value else {
            return Err(RecordError::NotAnObject);
        };
        map.into_iter()
            .map(|(field, v)| {
                let fv = match v {
                    Value::Null => FieldValue::Null,
                    Value::Bool(b) => FieldValue::Bool(b),
                    Value::Number(n) => FieldValue::Number(n),
                    Value::String(s) => FieldValue::String(s),
                    Value::Array(_) | Value::Object(_) => {
                        return Err(RecordError::UnsupportedValue { field })
                    }
                };
                Ok((field, fv))
            })
            .collect::<Result<BTreeMap<_, _>, _>>()
            .map(Record)
    }

    /// Convert into a JSON object.
    pub fn into_json(self) -> Value {
        Value::Object(self.0.into_iter().map(|(k, v)| (k, v.into())).collect())
    }
}

impl<K: Into<String>, V: Into<FieldValue>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Record(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl IntoIterator for Record {
    type Item = (String, FieldValue);
    type IntoIter = btree_map::IntoIter<String, FieldValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
