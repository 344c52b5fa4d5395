use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::errors::JsgError;
use crate::serde::to_canonical_json_bytes;

/// Computes a stable hexadecimal hash for the provided serializable payload.
pub fn stable_hash_string<T: Serialize>(value: &T) -> Result<String, JsgError> {
    let bytes = to_canonical_json_bytes(value)?;
    Ok(hash_bytes(&bytes))
}

/// SHA-256 of raw bytes as lowercase hex.
pub fn hash_bytes(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}
