//! # Memory Core
//!
//! Core types and traits for semantic memory storage.
//! Used by the store implementations and the `semantic-memory` crate.
//!
//! ## Modules
//!
//! - [`types`] - MemoryRecord, MemoryQueryResult
//! - [`store`] - MemoryStore trait and stream aliases
//! - [`error`] - MemoryError, Dependency

pub mod error;
pub mod store;
pub mod types;

pub use error::*;
pub use store::*;
pub use types::*;
