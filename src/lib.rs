//! # pow-ledger
//!
//! A single-process ledger node: an append-only chain of blocks kept in
//! memory, a buffer of pending transactions, brute-force proof-of-work
//! mining, and longest-valid-chain reconciliation with peer nodes.
//!
//! ## How the code is organised
//! - `core/`: blocks, transactions, hashing, proof-of-work, the chain
//!   store, the validator, reconciliation, and the `Ledger` facade
//! - `network/`: the peer set, the peer chain client, the HTTP server
//! - `config/`: node settings from TOML and the environment
//! - `utils/`: SHA-256, wall clock, canonical JSON
//! - `cli/`: command-line parsing for the node binary
//!
//! ## Where to start
//! 1. `core/ledger.rs` for the operations the HTTP layer calls
//! 2. `core/proof_of_work.rs` for the mining predicate
//! 3. `core/validator.rs` and `core/consensus.rs` for chain replacement

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod network;
pub mod utils;

// Re-export commonly used types for convenience
pub use cli::{Command, Opt};
pub use config::Config;
pub use core::{
    digest, valid_chain, validate_chain, Block, Blockchain, ChainResponse, Ledger, ProofOfWork,
    Transaction, TransactionRequest, GENESIS_SEED,
};
pub use error::{BlockchainError, Result};
pub use network::{normalize_address, HttpPeerClient, Nodes, PeerClient, Server};
pub use utils::{canonical_json, current_timestamp, sha256_digest};
