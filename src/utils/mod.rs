//! Utility functions and helpers
//!
//! This module contains the hashing primitive, the wall clock, and the
//! canonical serializer used throughout the ledger.

pub mod crypto;
pub mod serialization;

pub use crypto::{current_timestamp, sha256_digest};

pub use serialization::canonical_json;
