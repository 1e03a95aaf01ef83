//! Peer-facing networking
//!
//! This module holds the peer set, the client used to fetch peer chains
//! during reconciliation, and the HTTP server every node runs.

pub mod client;
pub mod node;
pub mod server;

pub use client::{HttpPeerClient, PeerClient, CHAIN_PATH};
pub use node::{normalize_address, Node, Nodes};
pub use server::{Server, SharedLedger};
