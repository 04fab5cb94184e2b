//! # Memory Azure Search
//!
//! Azure Cognitive Search implementation of [`memory_core::MemoryStore`].
//!
//! ## Modules
//!
//! - [`fields`] - index schema field names
//! - [`id_codec`] - record id <-> document key conversion
//! - [`record`] - AzureSearchRecord and its JSON mapping
//! - [`backend`] - SearchBackend trait over documents
//! - [`client`] - REST client for the search service
//! - [`store`] - AzureSearchMemoryStore
//! - [`config`] - AzureSearchConfig
//!
//! ## Example
//!
//! ```rust,ignore
//! use memory_azure_search::{AzureSearchConfig, AzureSearchMemoryStore};
//! use memory_core::MemoryStore;
//!
//! let config = AzureSearchConfig::from_env()?;
//! let store = AzureSearchMemoryStore::from_config(&config)?;
//! let mut results = store
//!     .get_nearest_matches("docs-2024", &embedding, None, 2, 0.5, false)
//!     .await?;
//! ```

pub mod backend;
pub mod client;
pub mod config;
pub mod fields;
pub mod id_codec;
pub mod record;
pub mod store;

pub use backend::{NameStream, ScoredDocument, ScoredDocumentStream, SearchBackend, SearchRequest};
pub use client::AzureSearchClient;
pub use config::AzureSearchConfig;
pub use id_codec::{decode_id, encode_id, try_decode_id, try_encode_id, IdConversion, IdConversionError};
pub use record::AzureSearchRecord;
pub use store::AzureSearchMemoryStore;
