pub mod course;
pub mod student;

pub use course::{Course, CoursePatch};
pub use student::{Student, StudentPatch};

use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt::Debug;

/// Errors raised while turning request JSON into typed records
#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error("Invalid JSON format: {0}")]
    InvalidJson(String),
    #[error("Request body must be a JSON object")]
    NotAnObject,
    #[error("Invalid record id: {0}")]
    InvalidId(String),
    #[error("Invalid fields: {0:?}")]
    InvalidFields(HashMap<String, String>),
}

/// A record type stored both in the primary database and in the fallback document.
///
/// `COLLECTION` doubles as the table name, the fallback document key and the
/// route segment, so one implementation is enough to register a resource.
pub trait Entity: Serialize + DeserializeOwned + Clone + Debug + Send + Sync + Unpin + 'static {
    /// Non-key fields, all optional, used by PUT.
    type Patch: Serialize + DeserializeOwned + Clone + Debug + Default + Send + Sync + 'static;

    const COLLECTION: &'static str;
    /// Singular label used in client-facing messages.
    const LABEL: &'static str;
    /// Non-key fields in storage order. Every one is a required, non-empty string.
    const FIELDS: &'static [&'static str];

    fn id(&self) -> i64;

    /// Overwrite the fields present in `patch`; `id` never changes.
    fn apply(&mut self, patch: Self::Patch);

    /// Validate a full record body (POST).
    fn from_json(value: Value) -> Result<Self, RecordError> {
        let Value::Object(object) = value else {
            return Err(RecordError::NotAnObject);
        };

        let mut field_errors = HashMap::new();
        let mut normalized = Map::new();

        match object.get("id").map(id_from_value) {
            Some(Some(id)) => {
                normalized.insert("id".to_string(), Value::from(id));
            }
            Some(None) => {
                field_errors.insert("id".to_string(), "Deve ser um número inteiro".to_string());
            }
            None => {
                field_errors.insert("id".to_string(), "Campo obrigatório".to_string());
            }
        }

        for field in Self::FIELDS {
            match object.get(*field) {
                Some(Value::String(s)) if !s.trim().is_empty() => {
                    normalized.insert(field.to_string(), Value::String(s.clone()));
                }
                Some(Value::String(_)) | None | Some(Value::Null) => {
                    field_errors.insert(field.to_string(), "Campo obrigatório".to_string());
                }
                Some(_) => {
                    field_errors.insert(field.to_string(), "Deve ser um texto".to_string());
                }
            }
        }

        if !field_errors.is_empty() {
            return Err(RecordError::InvalidFields(field_errors));
        }

        serde_json::from_value(Value::Object(normalized)).map_err(|e| RecordError::InvalidJson(e.to_string()))
    }
}

/// Validate a partial body (PUT). Unknown keys and `id` are dropped.
pub fn parse_patch<E: Entity>(value: Value) -> Result<E::Patch, RecordError> {
    let Value::Object(object) = value else {
        return Err(RecordError::NotAnObject);
    };

    let mut field_errors = HashMap::new();
    let mut supplied = Map::new();

    for field in E::FIELDS {
        match object.get(*field) {
            None => {}
            Some(Value::String(s)) if !s.trim().is_empty() => {
                supplied.insert(field.to_string(), Value::String(s.clone()));
            }
            Some(Value::String(_)) | Some(Value::Null) => {
                field_errors.insert(field.to_string(), "Não pode ficar vazio".to_string());
            }
            Some(_) => {
                field_errors.insert(field.to_string(), "Deve ser um texto".to_string());
            }
        }
    }

    if !field_errors.is_empty() {
        return Err(RecordError::InvalidFields(field_errors));
    }

    serde_json::from_value(Value::Object(supplied)).map_err(|e| RecordError::InvalidJson(e.to_string()))
}

/// Parse an id taken from a URL path segment.
pub fn parse_id(raw: &str) -> Result<i64, RecordError> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| RecordError::InvalidId(raw.to_string()))
}

// Accepts integer numbers and integer strings, the way form fields arrive.
fn id_from_value(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
