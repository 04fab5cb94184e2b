//! # Core Types
//!
//! This module defines the core types for semantic memory.
//!
//! ## MemoryRecord
//!
//! A unit of storable content: text, optional embedding and descriptive metadata.
//! Optional text fields use the empty string for "not set" so that records survive
//! a trip through a backend schema without null/empty ambiguity.
//!
//! ## MemoryQueryResult
//!
//! A record returned by a search together with its backend-assigned relevance.

use serde::{Deserialize, Serialize};

/// A single memory record.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MemoryRecord {
    /// Caller-assigned identifier, unique within a collection. Any Unicode text.
    pub id: String,
    /// Content body. May be empty (e.g. for references).
    pub text: String,
    /// Short human-readable label, e.g. a title or file path.
    pub description: String,
    /// Origin of the content (URL, file path, ...).
    pub external_source_name: String,
    /// Caller-defined payload, typically serialized JSON.
    pub additional_metadata: String,
    /// True when the record only points at external content.
    pub is_reference: bool,
    /// Vector embedding of the content. `None` when not loaded.
    pub embedding: Option<Vec<f32>>,
    /// Backend key of a record read back from a store.
    pub key: Option<String>,
}

impl MemoryRecord {
    /// Creates a record whose content is stored inline.
    pub fn local(
        id: impl Into<String>,
        text: impl Into<String>,
        description: impl Into<String>,
        additional_metadata: impl Into<String>,
        embedding: Option<Vec<f32>>,
    ) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            description: description.into(),
            external_source_name: String::new(),
            additional_metadata: additional_metadata.into(),
            is_reference: false,
            embedding,
            key: None,
        }
    }

    /// Creates a record that references content held by an external source.
    pub fn reference(
        external_id: impl Into<String>,
        external_source_name: impl Into<String>,
        description: impl Into<String>,
        additional_metadata: impl Into<String>,
        embedding: Option<Vec<f32>>,
    ) -> Self {
        Self {
            id: external_id.into(),
            text: String::new(),
            description: description.into(),
            external_source_name: external_source_name.into(),
            additional_metadata: additional_metadata.into(),
            is_reference: true,
            embedding,
            key: None,
        }
    }
}

/// A search hit: the matching record and its relevance score.
///
/// Higher relevance means a better match. The scale belongs to the backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MemoryQueryResult {
    pub record: MemoryRecord,
    pub relevance: f64,
}

impl MemoryQueryResult {
    pub fn new(record: MemoryRecord, relevance: f64) -> Self {
        Self { record, relevance }
    }
}
