//! End-to-end chain validation
//!
//! A candidate chain is walked from its second block onward. Each block
//! must sit at the position its index claims, link to the digest of its
//! predecessor, and carry a nonce that satisfies the proof-of-work target
//! for its own stored fields. Validation looks at nothing but the chain it
//! is handed.

use crate::core::{Block, ProofOfWork};
use crate::error::{BlockchainError, Result};

/// Check a chain, reporting the first block that breaks it
pub fn validate_chain(chain: &[Block], pow: &ProofOfWork) -> Result<()> {
    for (position, pair) in chain.windows(2).enumerate() {
        let (previous, block) = (&pair[0], &pair[1]);
        let position = position as u64 + 1;

        if block.get_index() != position {
            return Err(BlockchainError::InvalidChain(format!(
                "Block at position {position} claims index {}",
                block.get_index()
            )));
        }

        let expected_hash = previous.hash()?;
        if block.get_previous_hash() != expected_hash {
            return Err(BlockchainError::InvalidChain(format!(
                "Block {position} links to {} but its predecessor hashes to {expected_hash}",
                block.get_previous_hash()
            )));
        }

        if !pow.verify(
            block.get_index(),
            block.get_previous_hash(),
            block.get_transactions(),
            block.get_nonce(),
        ) {
            return Err(BlockchainError::InvalidChain(format!(
                "Block {position} nonce {} does not meet target {:?}",
                block.get_nonce(),
                pow.get_target()
            )));
        }
    }
    Ok(())
}

pub fn valid_chain(chain: &[Block], pow: &ProofOfWork) -> bool {
    validate_chain(chain, pow).is_ok()
}
