// Canonical JSON rendering used for hashing and for the proof-of-work string
use crate::error::Result;
use serde::Serialize;

/// Serialize `data` to compact JSON with every object's keys in sorted order.
///
/// Going through `serde_json::Value` first means field order comes from the
/// map (a `BTreeMap`) rather than from struct declaration or insertion
/// order, so structurally equal values always render byte-identically.
pub fn canonical_json<T: Serialize + ?Sized>(data: &T) -> Result<String> {
    let value = serde_json::to_value(data)?;
    Ok(serde_json::to_string(&value)?)
}
