// A transaction is a plain value transfer record: no inputs, no signatures.
// It sits in the pending buffer until the next block is mined and is then
// moved into that block wholesale.

use crate::error::{BlockchainError, Result};
use serde::{Deserialize, Serialize};

/// Sender used for mining reward transactions
pub const REWARD_SENDER: &str = "0";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    sender: String,
    recipient: String,
    amount: f64,
}

impl Transaction {
    pub fn new(sender: impl Into<String>, recipient: impl Into<String>, amount: f64) -> Transaction {
        Transaction {
            sender: sender.into(),
            recipient: recipient.into(),
            amount,
        }
    }

    /// The fixed-reward transaction crediting a miner for a new block
    pub fn new_reward(recipient: impl Into<String>, amount: f64) -> Transaction {
        Transaction::new(REWARD_SENDER, recipient, amount)
    }

    pub fn get_sender(&self) -> &str {
        self.sender.as_str()
    }

    pub fn get_recipient(&self) -> &str {
        self.recipient.as_str()
    }

    pub fn get_amount(&self) -> f64 {
        self.amount
    }
}

/// An incoming submission whose fields have not been checked yet
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransactionRequest {
    pub sender: Option<String>,
    pub recipient: Option<String>,
    pub amount: Option<f64>,
}

impl TransactionRequest {
    /// Turn the request into a transaction, rejecting it if any field is absent
    pub fn into_transaction(self) -> Result<Transaction> {
        let mut missing = Vec::new();
        if self.sender.is_none() {
            missing.push("sender");
        }
        if self.recipient.is_none() {
            missing.push("recipient");
        }
        if self.amount.is_none() {
            missing.push("amount");
        }

        match (self.sender, self.recipient, self.amount) {
            (Some(sender), Some(recipient), Some(amount)) => {
                Ok(Transaction::new(sender, recipient, amount))
            }
            _ => Err(BlockchainError::MalformedRequest(format!(
                "Missing fields: {}",
                missing.join(", ")
            ))),
        }
    }
}
