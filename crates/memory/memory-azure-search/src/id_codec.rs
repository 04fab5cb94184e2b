//! Record id <-> document key conversion.
//!
//! Document keys may only contain letters, digits, dash, underscore and equals sign, while
//! record ids are arbitrary Unicode. Ids are therefore stored as URL-safe base64 (with
//! padding) of their UTF-8 bytes.
//!
//! Conversion never fails for callers: when an id cannot be converted the original text is
//! passed through unchanged. The `try_*` functions keep the two outcomes explicit so the
//! fallback can be observed and tested; `encode_id` / `decode_id` collapse them and log the
//! fallback.

use base64::{engine::general_purpose::URL_SAFE, Engine as _};
use thiserror::Error;
use tracing::warn;

use crate::fields;

/// Why an id was passed through unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdConversionError {
    #[error("encoded key contains disallowed character {0:?}")]
    DisallowedKeyCharacter(char),
    #[error("key is not valid base64: {0}")]
    InvalidEncoding(String),
    #[error("decoded key is not valid UTF-8: {0}")]
    InvalidUtf8(String),
}

/// Outcome of an id conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdConversion {
    /// The id was converted.
    Converted(String),
    /// Conversion failed; `id` is the unchanged input.
    PassedThrough {
        id: String,
        reason: IdConversionError,
    },
}

impl IdConversion {
    /// The resulting id, whichever branch was taken.
    pub fn into_inner(self) -> String {
        match self {
            IdConversion::Converted(id) => id,
            IdConversion::PassedThrough { id, .. } => id,
        }
    }

    pub fn is_passed_through(&self) -> bool {
        matches!(self, IdConversion::PassedThrough { .. })
    }
}

/// Encodes a record id into a document key.
///
/// URL-safe base64 only emits key characters, so the `PassedThrough` branch is a defensive
/// guard and is not expected to be taken.
pub fn try_encode_id(real_id: &str) -> IdConversion {
    let encoded = URL_SAFE.encode(real_id.as_bytes());
    match encoded.chars().find(|c| !fields::is_key_char(*c)) {
        None => IdConversion::Converted(encoded),
        Some(c) => IdConversion::PassedThrough {
            id: real_id.to_string(),
            reason: IdConversionError::DisallowedKeyCharacter(c),
        },
    }
}

/// Decodes a document key back into the record id.
///
/// Keys that were never encoded (e.g. documents inserted by other tools) usually fail to
/// decode and are returned unchanged.
pub fn try_decode_id(encoded_id: &str) -> IdConversion {
    let bytes = match URL_SAFE.decode(encoded_id.as_bytes()) {
        Ok(bytes) => bytes,
        Err(e) => {
            return IdConversion::PassedThrough {
                id: encoded_id.to_string(),
                reason: IdConversionError::InvalidEncoding(e.to_string()),
            }
        }
    };
    match String::from_utf8(bytes) {
        Ok(id) => IdConversion::Converted(id),
        Err(e) => IdConversion::PassedThrough {
            id: encoded_id.to_string(),
            reason: IdConversionError::InvalidUtf8(e.to_string()),
        },
    }
}

/// Encodes a record id, passing it through unchanged if it cannot be encoded.
pub fn encode_id(real_id: &str) -> String {
    match try_encode_id(real_id) {
        IdConversion::Converted(key) => key,
        IdConversion::PassedThrough { id, reason } => {
            warn!(id = %id, reason = %reason, "id encoding failed, using id as document key");
            id
        }
    }
}

/// Decodes a document key, passing it through unchanged if it cannot be decoded.
pub fn decode_id(encoded_id: &str) -> String {
    match try_decode_id(encoded_id) {
        IdConversion::Converted(id) => id,
        IdConversion::PassedThrough { id, reason } => {
            warn!(key = %id, reason = %reason, "id decoding failed, using document key as id");
            id
        }
    }
}

#[cfg(test)]
#[path = "id_codec_test.rs"]
mod id_codec_test;
