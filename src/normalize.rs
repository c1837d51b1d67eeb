// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2026 nervosys

//! Response normalization
//!
//! The remote layer hands back objects in a handful of encodings. They are
//! captured by the closed [`RemoteObject`] type at the client boundary and
//! flattened here into plain records (`serde_json::Map`). The client picks one
//! [`ObjectFamily`] when it is constructed and tags every payload with it, so
//! nothing downstream has to guess the encoding.

use crate::error::{Result, SwanError};
use serde_json::{Map, Value};

/// Plain key/value record
pub type Record = Map<String, Value>;

/// A remote object in one of the known encodings
#[derive(Debug, Clone, PartialEq)]
pub enum RemoteObject {
    /// Already a mapping
    Mapping(Record),
    /// JSON text that should decode to a mapping
    JsonText(String),
    /// Structured export of a model object
    Structured(Value),
    /// Attribute bag, in declaration order
    Attributes(Vec<(String, Value)>),
    /// Sequence of `[key, value]` pairs
    Pairs(Vec<Value>),
}

/// Encoding family used by a remote source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ObjectFamily {
    /// Items are JSON objects
    #[default]
    Plain,
    /// Items are `{"data": ...}` envelopes around the exported model
    Enveloped,
    /// Items are JSON strings holding an encoded object
    Encoded,
    /// Items are arrays of `[key, value]` pairs
    Pairs,
}

impl ObjectFamily {
    /// Tag a raw payload item with this family's encoding
    pub fn adapt(self, raw: Value) -> RemoteObject {
        match (self, raw) {
            (ObjectFamily::Plain, Value::Object(map)) => RemoteObject::Mapping(map),
            (ObjectFamily::Enveloped, Value::Object(mut map)) => match map.remove("data") {
                Some(inner) => RemoteObject::Structured(inner),
                None => RemoteObject::Mapping(map),
            },
            (ObjectFamily::Encoded, Value::String(text)) => RemoteObject::JsonText(text),
            (ObjectFamily::Pairs, Value::Array(items)) => RemoteObject::Pairs(items),
            (_, other) => RemoteObject::Structured(other),
        }
    }

    /// Tag every item of a list payload
    pub fn adapt_all(self, items: Vec<Value>) -> Vec<RemoteObject> {
        items.into_iter().map(|item| self.adapt(item)).collect()
    }
}

impl RemoteObject {
    /// Flatten into a plain record
    pub fn into_record(self) -> Result<Record> {
        match self {
            RemoteObject::Mapping(map) => Ok(map),
            RemoteObject::JsonText(text) => decode_text(&text),
            RemoteObject::Structured(Value::Object(map)) => Ok(map),
            RemoteObject::Structured(Value::String(text)) => decode_text(&text),
            RemoteObject::Structured(other) => Err(unsupported(&other)),
            RemoteObject::Attributes(attrs) => Ok(attrs.into_iter().collect()),
            RemoteObject::Pairs(items) => pairs_to_record(items),
        }
    }
}

fn decode_text(text: &str) -> Result<Record> {
    match serde_json::from_str::<Value>(text)? {
        Value::Object(map) => Ok(map),
        other => Err(unsupported(&other)),
    }
}

fn pairs_to_record(items: Vec<Value>) -> Result<Record> {
    let mut record = Record::new();
    for item in items {
        match item {
            Value::Array(pair) if pair.len() == 2 => {
                let mut it = pair.into_iter();
                match (it.next(), it.next()) {
                    (Some(Value::String(key)), Some(value)) => {
                        record.insert(key, value);
                    }
                    (key, _) => {
                        return Err(SwanError::UnsupportedShape(format!(
                            "Expected string keys, got {}.",
                            key.as_ref().map(type_name).unwrap_or("nothing")
                        )))
                    }
                }
            }
            other => {
                return Err(SwanError::UnsupportedShape(format!(
                    "Expected [key, value] pairs, got {}.",
                    type_name(&other)
                )))
            }
        }
    }
    Ok(record)
}

fn unsupported(value: &Value) -> SwanError {
    SwanError::UnsupportedShape(format!(
        "Expected dictionary-like data, got {}.",
        type_name(value)
    ))
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "dict",
    }
}

/// Normalize one remote object into a record
pub fn to_record(obj: RemoteObject) -> Result<Record> {
    obj.into_record()
}

/// Normalize remote objects element-wise, preserving order
pub fn to_record_list<I>(items: I) -> Result<Vec<Record>>
where
    I: IntoIterator<Item = RemoteObject>,
{
    items.into_iter().map(RemoteObject::into_record).collect()
}

// Field coercion used by the model constructors. None of these fail.

/// Textual form of a scalar; null becomes the empty string
pub fn coerce_str(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Optional textual form; null and absent stay absent
pub fn coerce_opt_str(value: Option<&Value>) -> Option<String> {
    match value {
        None | Some(Value::Null) => None,
        v => Some(coerce_str(v)),
    }
}

/// List of strings; a lone scalar becomes a single element
pub fn coerce_str_list(value: Option<&Value>) -> Vec<String> {
    match value {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::String(s)) if s.is_empty() => Vec::new(),
        Some(Value::Array(items)) => items.iter().map(|v| coerce_str(Some(v))).collect(),
        v => vec![coerce_str(v)],
    }
}

/// Mapping; anything that is not a mapping becomes empty
pub fn coerce_map(value: Option<&Value>) -> Record {
    match value {
        Some(Value::Object(map)) => map.clone(),
        _ => Record::new(),
    }
}

/// Nested mapping for optional sub-records; non-mappings are treated as absent
pub fn coerce_opt_map(value: Option<&Value>) -> Option<&Record> {
    match value {
        Some(Value::Object(map)) => Some(map),
        _ => None,
    }
}

/// Boolean with a default for absent or non-boolean values
pub fn coerce_bool(value: Option<&Value>, default: bool) -> bool {
    value.and_then(Value::as_bool).unwrap_or(default)
}

/// First present key among aliases
pub fn field<'a>(record: &'a Record, names: &[&str]) -> Option<&'a Value> {
    names.iter().find_map(|n| record.get(*n))
}
