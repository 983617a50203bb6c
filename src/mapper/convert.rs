//! Column converters and widening coercions.
//!
//! `decode` turns a raw row value into the field value, `encode` turns a field
//! value back into what gets bound for that column.

use chrono::NaiveTime;
use rust_decimal::prelude::ToPrimitive;

use crate::crypto::TextCipher;
use crate::error::{DataError, DataResult};
use crate::metadata::{ColumnDescriptor, ConverterKind, EnumMapping, EnumVariant, FieldType};
use crate::value::{EnumValue, Value};

/// Decode a raw row value for `column` of `entity`.
pub fn decode(
    entity: &str,
    column: &ColumnDescriptor,
    raw: Value,
    cipher: Option<&TextCipher>,
) -> DataResult<Value> {
    let Some(converter) = &column.converter else {
        return Ok(coerce(raw, column.field_type));
    };

    match converter {
        ConverterKind::EnumById(mapping) => {
            if raw.is_null() {
                return Ok(Value::Null);
            }
            Ok(mapping.by_id(&raw).map(enum_value).unwrap_or(Value::Null))
        }
        ConverterKind::EnumByName(mapping) => Ok(match &raw {
            Value::Text(name) => mapping.by_name(name).map(enum_value).unwrap_or(Value::Null),
            _ => Value::Null,
        }),
        ConverterKind::Json => match raw {
            Value::Null => Ok(Value::Null),
            other => parse_json(entity, column, &other),
        },
        ConverterKind::JsonList => match raw {
            Value::Null => Ok(Value::Json(serde_json::Value::Array(Vec::new()))),
            other => parse_json_list(entity, column, &other),
        },
        ConverterKind::ByteaJson => match raw {
            Value::Null => Ok(Value::Null),
            other => parse_json(entity, column, &latin1_text(other)),
        },
        ConverterKind::ByteaJsonList => match raw {
            Value::Null => Ok(Value::Json(serde_json::Value::Array(Vec::new()))),
            other => parse_json_list(entity, column, &latin1_text(other)),
        },
        ConverterKind::Encrypted => match raw {
            Value::Null => Ok(Value::Null),
            Value::Text(stored) => {
                let cipher = require_cipher(column, cipher)?;
                cipher
                    .decrypt_text(&stored)
                    .map(Value::Text)
                    .map_err(|_| DataError::Decryption {
                        entity: entity.to_string(),
                        column: column.name.clone(),
                    })
            }
            other => Err(DataError::conversion(
                entity,
                format!("encrypted column {} holds non-text value {}", column.name, other),
            )),
        },
    }
}

/// Encode a field value into the bound form for `column`.
pub fn encode(
    column: &ColumnDescriptor,
    value: &Value,
    cipher: Option<&TextCipher>,
) -> DataResult<Value> {
    let Some(converter) = &column.converter else {
        return Ok(value.bind_form(false));
    };

    match (converter, value) {
        (_, Value::Null) => Ok(Value::Null),
        (ConverterKind::EnumById(mapping), _) => Ok(encode_enum_id(mapping, value)),
        (ConverterKind::EnumByName(_), Value::Enum(e)) => Ok(Value::Text(e.name.clone())),
        (ConverterKind::EnumByName(_), other) => Ok(other.clone()),
        (ConverterKind::Json | ConverterKind::JsonList, other) => {
            Ok(Value::Text(other.to_json().to_string()))
        }
        (ConverterKind::ByteaJson | ConverterKind::ByteaJsonList, other) => {
            Ok(Value::Bytes(latin1_bytes(&other.to_json().to_string())))
        }
        (ConverterKind::Encrypted, other) => {
            let cipher = require_cipher(column, cipher)?;
            Ok(Value::Text(cipher.encrypt_text(&other.to_string())?))
        }
    }
}

/// Widen a raw value towards the declared field type.
pub fn coerce(raw: Value, field_type: FieldType) -> Value {
    match (field_type, raw) {
        (FieldType::Integer, Value::Decimal(d)) => d.to_i64().map(Value::Int).unwrap_or(Value::Decimal(d)),
        (FieldType::Integer, Value::Float(f)) if f.fract() == 0.0 => Value::Int(f as i64),
        (FieldType::Float, Value::Decimal(d)) => d.to_f64().map(Value::Float).unwrap_or(Value::Decimal(d)),
        (FieldType::Float, Value::Int(i)) => Value::Float(i as f64),
        (FieldType::Bool, Value::Int(i)) => Value::Bool(i != 0),
        (FieldType::Date, Value::DateTime(dt)) => Value::Date(dt.date()),
        (FieldType::DateTime, Value::Date(d)) => Value::DateTime(d.and_time(NaiveTime::default())),
        (FieldType::Text, Value::Bytes(b)) => Value::Text(latin1_decode(&b)),
        (_, other) => other,
    }
}

fn enum_value(variant: &EnumVariant) -> Value {
    Value::Enum(EnumValue::with_id(&variant.name, variant.id.clone()))
}

fn encode_enum_id(mapping: &EnumMapping, value: &Value) -> Value {
    let name = match value {
        Value::Enum(EnumValue { id: Some(id), .. }) => return id.to_value(),
        Value::Enum(e) => e.name.as_str(),
        Value::Text(s) => s.as_str(),
        other => return other.clone(),
    };
    mapping
        .by_name(name)
        .map(|v| v.id.to_value())
        .unwrap_or_else(|| Value::Text(name.to_string()))
}

fn require_cipher<'a>(
    column: &ColumnDescriptor,
    cipher: Option<&'a TextCipher>,
) -> DataResult<&'a TextCipher> {
    cipher.ok_or_else(|| {
        DataError::config(format!(
            "column {} is encrypted but no cipher key is configured",
            column.name
        ))
    })
}

fn parse_json(entity: &str, column: &ColumnDescriptor, raw: &Value) -> DataResult<Value> {
    match raw {
        Value::Json(j) => Ok(Value::Json(j.clone())),
        Value::Text(text) => serde_json::from_str(text).map(Value::Json).map_err(|e| {
            DataError::conversion(entity, format!("column {} is not valid JSON: {}", column.name, e))
        }),
        other => Err(DataError::conversion(
            entity,
            format!("column {} cannot be read as JSON from {}", column.name, other),
        )),
    }
}

fn parse_json_list(entity: &str, column: &ColumnDescriptor, raw: &Value) -> DataResult<Value> {
    let parsed = parse_json(entity, column, raw)?;
    match parsed {
        Value::Json(serde_json::Value::Array(_)) => Ok(parsed),
        _ => Err(DataError::conversion(
            entity,
            format!("column {} does not hold a JSON array", column.name),
        )),
    }
}

fn latin1_text(raw: Value) -> Value {
    match raw {
        Value::Bytes(b) => Value::Text(latin1_decode(&b)),
        other => other,
    }
}

fn latin1_decode(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| b as char).collect()
}

fn latin1_bytes(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?'))
        .collect()
}
