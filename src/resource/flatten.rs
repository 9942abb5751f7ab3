//! Shape Transformer
//!
//! Hoists the members of one designated nested object to the top level of a
//! JSON document. Regrouping in the other direction is schema-driven and lives
//! with the write models in [`super::subnet`].

use serde_json::{Map, Value};
use thiserror::Error;

/// Key under which the provider nests identity and audit fields
pub const METADATA_KEY: &str = "metadata";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FlattenError {
    #[error("document is not a JSON object")]
    NotAnObject,
    #[error("value under '{0}' is not a JSON object")]
    KeyNotAnObject(String),
}

/// Merge the object stored under `key` into the top level of `doc`
///
/// The hoisted members take the place of `key`, so every other member keeps
/// its relative position. A document without `key` is returned unchanged.
pub fn flatten_object(doc: Value, key: &str) -> Result<Value, FlattenError> {
    let Value::Object(map) = doc else {
        return Err(FlattenError::NotAnObject);
    };

    match map.get(key) {
        None => return Ok(Value::Object(map)),
        Some(Value::Object(_)) => {}
        Some(_) => return Err(FlattenError::KeyNotAnObject(key.to_string())),
    }

    let mut flattened = Map::with_capacity(map.len());
    for (name, value) in map {
        if name == key {
            if let Value::Object(inner) = value {
                flattened.extend(inner);
            }
        } else {
            flattened.insert(name, value);
        }
    }

    Ok(Value::Object(flattened))
}
