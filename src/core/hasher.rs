//! Canonical hashing of ledger values
//!
//! A value is rendered as key-sorted compact JSON and the SHA-256 of those
//! bytes is returned as lowercase hex. Blocks are linked by this digest and
//! the genesis block is seeded with the digest of [`GENESIS_SEED`].

use crate::error::Result;
use crate::utils::{canonical_json, sha256_digest};
use data_encoding::HEXLOWER;
use serde::Serialize;

/// Sentinel hashed in place of a real predecessor for the genesis block
pub const GENESIS_SEED: &str = "blok pertama";

/// Length of a rendered digest in hex characters
pub const DIGEST_HEX_LEN: usize = 64;

/// SHA-256 of the value's canonical JSON, as lowercase hex
pub fn digest<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    let serialized = canonical_json(value)?;
    Ok(HEXLOWER.encode(&sha256_digest(serialized.as_bytes())))
}
