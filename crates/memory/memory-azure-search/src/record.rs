//! Search index document and its conversion to and from [`MemoryRecord`].
//!
//! The document is read from and written to JSON through the field table in
//! [`crate::fields`]. Optional text fields are always written as strings (never null),
//! and null or missing fields read back as empty values.

use memory_core::{MemoryError, MemoryRecord};
use serde_json::{Map, Value};

use crate::fields;
use crate::id_codec::{decode_id, encode_id};

/// A memory record shaped for the search index schema. `id` holds the encoded key.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AzureSearchRecord {
    pub id: String,
    pub text: String,
    pub embedding: Vec<f32>,
    pub description: String,
    pub additional_metadata: String,
    pub external_source_name: String,
    pub is_reference: bool,
}

impl AzureSearchRecord {
    /// Builds a document from a record, encoding its id.
    ///
    /// A missing or empty embedding is stored as an empty vector, so `Some(vec![])` reads
    /// back as `None`.
    pub fn from_memory_record(record: &MemoryRecord) -> Self {
        Self {
            id: encode_id(&record.id),
            text: record.text.clone(),
            embedding: record.embedding.clone().unwrap_or_default(),
            description: record.description.clone(),
            additional_metadata: record.additional_metadata.clone(),
            external_source_name: record.external_source_name.clone(),
            is_reference: record.is_reference,
        }
    }

    /// Converts the document back into a record, decoding its id.
    ///
    /// The embedding is copied only when `include_embedding` is true; an empty
    /// vector is reported as no embedding.
    pub fn to_memory_record(&self, include_embedding: bool) -> MemoryRecord {
        let embedding = if include_embedding && !self.embedding.is_empty() {
            Some(self.embedding.clone())
        } else {
            None
        };
        MemoryRecord {
            id: decode_id(&self.id),
            text: self.text.clone(),
            description: self.description.clone(),
            external_source_name: self.external_source_name.clone(),
            additional_metadata: self.additional_metadata.clone(),
            is_reference: self.is_reference,
            embedding,
            key: Some(self.id.clone()),
        }
    }

    /// Consuming variant of [`to_memory_record`](Self::to_memory_record) that avoids
    /// copying the text and vector.
    pub fn into_memory_record(self, include_embedding: bool) -> MemoryRecord {
        let embedding = (include_embedding && !self.embedding.is_empty()).then_some(self.embedding);
        MemoryRecord {
            id: decode_id(&self.id),
            text: self.text,
            description: self.description,
            external_source_name: self.external_source_name,
            additional_metadata: self.additional_metadata,
            is_reference: self.is_reference,
            embedding,
            key: Some(self.id),
        }
    }

    /// Serializes the document to a JSON object keyed by index field names.
    /// An empty embedding is left out so a merge does not overwrite a stored vector.
    pub fn to_json(&self) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert(fields::ID.to_string(), Value::from(self.id.as_str()));
        map.insert(fields::TEXT.to_string(), Value::from(self.text.as_str()));
        if !self.embedding.is_empty() {
            map.insert(fields::EMBEDDING.to_string(), Value::from(self.embedding.clone()));
        }
        map.insert(
            fields::EXTERNAL_SOURCE_NAME.to_string(),
            Value::from(self.external_source_name.as_str()),
        );
        map.insert(fields::DESCRIPTION.to_string(), Value::from(self.description.as_str()));
        map.insert(
            fields::ADDITIONAL_METADATA.to_string(),
            Value::from(self.additional_metadata.as_str()),
        );
        map.insert(fields::IS_REFERENCE.to_string(), Value::from(self.is_reference));
        map
    }

    /// Parses a document from a JSON object. Unknown keys and `@` annotations are ignored.
    pub fn from_json(value: &Value) -> Result<Self, MemoryError> {
        let map = value
            .as_object()
            .ok_or_else(|| MemoryError::Serialization("document is not a JSON object".to_string()))?;

        Ok(Self {
            id: string_field(map, fields::ID)?,
            text: string_field(map, fields::TEXT)?,
            embedding: vector_field(map, fields::EMBEDDING)?,
            description: string_field(map, fields::DESCRIPTION)?,
            additional_metadata: string_field(map, fields::ADDITIONAL_METADATA)?,
            external_source_name: string_field(map, fields::EXTERNAL_SOURCE_NAME)?,
            is_reference: bool_field(map, fields::IS_REFERENCE)?,
        })
    }
}

fn string_field(map: &Map<String, Value>, name: &str) -> Result<String, MemoryError> {
    match map.get(name) {
        None | Some(Value::Null) => Ok(String::new()),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(other) => Err(type_error(name, "a string", other)),
    }
}

fn bool_field(map: &Map<String, Value>, name: &str) -> Result<bool, MemoryError> {
    match map.get(name) {
        None | Some(Value::Null) => Ok(false),
        Some(Value::Bool(b)) => Ok(*b),
        Some(other) => Err(type_error(name, "a boolean", other)),
    }
}

fn vector_field(map: &Map<String, Value>, name: &str) -> Result<Vec<f32>, MemoryError> {
    match map.get(name) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| {
                item.as_f64()
                    .map(|x| x as f32)
                    .ok_or_else(|| type_error(name, "an array of numbers", item))
            })
            .collect(),
        Some(other) => Err(type_error(name, "an array of numbers", other)),
    }
}

fn type_error(name: &str, expected: &str, got: &Value) -> MemoryError {
    MemoryError::Serialization(format!("field {:?} should be {}, got {}", name, expected, got))
}

#[cfg(test)]
#[path = "record_test.rs"]
mod record_test;
