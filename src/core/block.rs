use crate::core::{hasher, Transaction};
use crate::error::Result;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    index: u64,
    timestamp: f64,
    transactions: Vec<Transaction>,
    nonce: u64,
    previous_hash: String,
}

impl Block {
    pub fn new(
        index: u64,
        timestamp: f64,
        transactions: Vec<Transaction>,
        nonce: u64,
        previous_hash: String,
    ) -> Block {
        Block {
            index,
            timestamp,
            transactions,
            nonce,
            previous_hash,
        }
    }

    pub fn get_index(&self) -> u64 {
        self.index
    }

    pub fn get_timestamp(&self) -> f64 {
        self.timestamp
    }

    pub fn get_transactions(&self) -> &[Transaction] {
        self.transactions.as_slice()
    }

    pub fn get_nonce(&self) -> u64 {
        self.nonce
    }

    pub fn get_previous_hash(&self) -> &str {
        self.previous_hash.as_str()
    }

    /// Canonical digest of the whole block, as stored in its successor
    pub fn hash(&self) -> Result<String> {
        hasher::digest(self)
    }
}
