//! Field identifiers of the search index schema.
//!
//! These names are a compatibility contract with the index definition: once an index
//! exists its fields cannot be renamed, so they must never change.

/// Document key (encoded record id).
pub const ID: &str = "id";
/// Record text.
pub const TEXT: &str = "content";
/// Record embedding.
pub const EMBEDDING: &str = "contentVector";
/// External source name.
pub const EXTERNAL_SOURCE_NAME: &str = "url";
/// Record description.
pub const DESCRIPTION: &str = "filepath";
/// Caller-defined metadata payload.
pub const ADDITIONAL_METADATA: &str = "AdditionalMetadata";
/// Reference flag.
pub const IS_REFERENCE: &str = "IsReference";

/// Relevance score annotation on search results.
pub const SCORE_ANNOTATION: &str = "@search.score";

/// Every schema field, in index definition order.
pub const ALL: [&str; 7] = [
    ID,
    TEXT,
    EMBEDDING,
    EXTERNAL_SOURCE_NAME,
    DESCRIPTION,
    ADDITIONAL_METADATA,
    IS_REFERENCE,
];

/// Comma-separated `select` list; the vector field only when requested.
pub fn select_list(include_vectors: bool) -> String {
    ALL.iter()
        .copied()
        .filter(|name| include_vectors || *name != EMBEDDING)
        .collect::<Vec<_>>()
        .join(",")
}

/// Whether `c` may appear in a document key: letters, digits, dash, underscore, equals.
pub fn is_key_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '=')
}

/// Whether every character of `key` is allowed in a document key.
pub fn is_valid_key(key: &str) -> bool {
    key.chars().all(is_key_char)
}
