//! Conversion between records and index payloads.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::AppError;
use crate::index::{Payload, Record};

/// Serializes a record into a flat payload object.
pub fn encode<T: Serialize>(record: &T) -> Result<Payload, AppError> {
    match serde_json::to_value(record)? {
        Value::Object(map) => Ok(map),
        other => Err(AppError::Validation(format!(
            "Record must serialize to an object, got {}",
            other
        ))),
    }
}

/// Decodes a stored point back into a record.
///
/// The point id wins over a missing `id` key in the payload.
pub fn decode<T: DeserializeOwned>(record: Record) -> Result<T, AppError> {
    let Record { id, mut payload } = record;
    payload.entry("id").or_insert(Value::String(id));
    Ok(serde_json::from_value(Value::Object(payload))?)
}
