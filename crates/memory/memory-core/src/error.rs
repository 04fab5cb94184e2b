//! Memory error types.
//!
//! Shared by stores, the semantic memory pipeline and their callers.

use std::fmt;

use thiserror::Error;

/// External service a [`MemoryError::DependencyFailure`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dependency {
    /// Text embedding provider.
    Embedding,
    /// Search index backend.
    SearchBackend,
}

impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dependency::Embedding => f.write_str("embedding service"),
            Dependency::SearchBackend => f.write_str("search backend"),
        }
    }
}

/// Errors that can occur when using memory operations.
#[derive(Error, Debug)]
pub enum MemoryError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Collection not found: {0}")]
    CollectionNotFound(String),

    #[error("{dependency} failure: {source}")]
    DependencyFailure {
        dependency: Dependency,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl MemoryError {
    /// Wraps an error raised by an external service.
    pub fn dependency(
        dependency: Dependency,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        MemoryError::DependencyFailure {
            dependency,
            source: source.into(),
        }
    }

    /// Which dependency failed, if this is a dependency failure.
    pub fn failed_dependency(&self) -> Option<Dependency> {
        match self {
            MemoryError::DependencyFailure { dependency, .. } => Some(*dependency),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, MemoryError>;
