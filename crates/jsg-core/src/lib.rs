#![deny(missing_docs)]
#![doc = "Shared error surface and canonical serialisation helpers for jsg crates."]

pub mod errors;
/// Content hashing helpers.
pub mod hash;
/// Canonical JSON helpers.
pub mod serde;

pub use errors::{codes, ErrorInfo, JsgError};
pub use hash::{hash_bytes, stable_hash_string};
pub use crate::serde::{from_json_slice, to_canonical_json_bytes, to_canonical_json_pretty};
