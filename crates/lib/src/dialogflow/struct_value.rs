//! Decoding of protobuf `google.protobuf.Struct` trees into plain JSON.
//!
//! gRPC-style clients deliver parameters as `{"fields": {"city": {"stringValue": "Paris"}}}`;
//! the REST API delivers `{"city": "Paris"}`. [`decode_parameters`] returns the plain form
//! for either; when the source is known to be REST, the shape is not inspected at all.

use serde_json::{Map, Value};

const KINDS: [&str; 6] = [
    "nullValue",
    "numberValue",
    "stringValue",
    "boolValue",
    "structValue",
    "listValue",
];

/// Wire form of a `parameters` tree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ParameterFormat {
    /// Unknown source: a non-empty `{"fields": {...}}` of typed values is decoded as a
    /// `Struct`, anything else is taken as plain JSON.
    #[default]
    Detect,
    /// Plain JSON (REST API); passed through unchanged.
    Plain,
}

/// Decode `parameters` according to their wire form. Non-object input yields an empty map.
pub fn decode_parameters(value: &Value, format: ParameterFormat) -> Map<String, Value> {
    match format {
        ParameterFormat::Detect => decode_struct(value),
        ParameterFormat::Plain => value.as_object().cloned().unwrap_or_default(),
    }
}

/// Decode a parameter tree of unknown form into a plain JSON object.
/// Non-object input yields an empty map.
pub fn decode_struct(value: &Value) -> Map<String, Value> {
    if is_struct(value) {
        return decode_fields(value);
    }
    match value {
        Value::Object(map) => map.clone(),
        _ => Map::new(),
    }
}

/// Decode one typed `Value` (`{"stringValue": ...}` etc.) into plain JSON.
/// Anything that is not a typed value is returned unchanged.
pub fn decode_value(value: &Value) -> Value {
    let Some(obj) = value.as_object() else {
        return value.clone();
    };
    let Some(kind) = value_kind(obj) else {
        return value.clone();
    };
    let inner = obj.get(kind).unwrap_or(&Value::Null);
    match kind {
        "nullValue" => Value::Null,
        "structValue" => Value::Object(decode_fields(inner)),
        "listValue" => Value::Array(
            inner
                .get("values")
                .and_then(Value::as_array)
                .map(|vs| vs.iter().map(decode_value).collect())
                .unwrap_or_default(),
        ),
        _ => inner.clone(),
    }
}

/// True for a non-empty `{"fields": {...}}` where every field is a typed value.
/// An empty `fields` map is ambiguous with a plain parameter named `fields`, so it stays plain.
fn is_struct(value: &Value) -> bool {
    let Some(obj) = value.as_object() else {
        return false;
    };
    if obj.len() != 1 {
        return false;
    }
    match obj.get("fields") {
        Some(Value::Object(fields)) => {
            !fields.is_empty()
                && fields
                    .values()
                    .all(|v| v.as_object().and_then(value_kind).is_some())
        }
        _ => false,
    }
}

fn decode_fields(value: &Value) -> Map<String, Value> {
    value
        .get("fields")
        .and_then(Value::as_object)
        .map(|fields| {
            fields
                .iter()
                .map(|(k, v)| (k.clone(), decode_value(v)))
                .collect()
        })
        .unwrap_or_default()
}

/// The kind of a typed value. protobufjs adds an explicit `"kind"` discriminator; plain
/// proto3 JSON carries only the populated field.
fn value_kind(obj: &Map<String, Value>) -> Option<&'static str> {
    if let Some(k) = obj.get("kind").and_then(Value::as_str) {
        return KINDS.iter().copied().find(|kind| *kind == k);
    }
    KINDS.iter().copied().find(|kind| obj.contains_key(*kind))
}
