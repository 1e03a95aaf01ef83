//! Core ledger functionality
//!
//! This module contains the ledger engine: blocks and transactions,
//! canonical hashing, proof-of-work, the chain store, chain validation,
//! and longest-chain reconciliation.

pub mod block;
pub mod blockchain;
pub mod consensus;
pub mod hasher;
pub mod ledger;
pub mod proof_of_work;
pub mod transaction;
pub mod validator;

pub use block::Block;
pub use blockchain::{BlockTemplate, Blockchain};
pub use consensus::{fetch_peer_chains, resolve_conflicts, select_longest_chain, ChainResponse};
pub use hasher::{digest, GENESIS_SEED};
pub use ledger::Ledger;
pub use proof_of_work::{ProofOfWork, DEFAULT_DIFFICULTY_TARGET};
pub use transaction::{Transaction, TransactionRequest, REWARD_SENDER};
pub use validator::{valid_chain, validate_chain};
