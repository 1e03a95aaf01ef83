use crate::core::hasher::DIGEST_HEX_LEN;
use crate::core::Transaction;
use crate::error::{BlockchainError, Result};
use crate::utils::{canonical_json, sha256_digest};
use data_encoding::HEXLOWER;
use log::{debug, info};
use std::sync::atomic::{AtomicBool, Ordering};

/// Four leading zero hex characters
pub const DEFAULT_DIFFICULTY_TARGET: &str = "0000";

const MAX_TARGET_LEN: usize = DIGEST_HEX_LEN;

/// The proof-of-work predicate and the nonce search that satisfies it.
///
/// A nonce is valid when the SHA-256 hex digest of
/// `"{index}{previous_hash}{transactions}{nonce}"` starts with the target
/// prefix, where `transactions` is the canonical JSON rendering of the
/// list. Every input comes from fields a block stores, so a validator can
/// rebuild the string without knowing anything about the original search.
#[derive(Debug, Clone, PartialEq)]
pub struct ProofOfWork {
    target: String,
}

impl Default for ProofOfWork {
    fn default() -> Self {
        ProofOfWork {
            target: DEFAULT_DIFFICULTY_TARGET.to_string(),
        }
    }
}

impl ProofOfWork {
    pub fn new(target: impl Into<String>) -> Result<ProofOfWork> {
        let target = target.into();
        Self::check_target(&target)?;
        Ok(ProofOfWork { target })
    }

    /// A target is a lowercase hex prefix no longer than a digest
    pub fn check_target(target: &str) -> Result<()> {
        if target.len() > MAX_TARGET_LEN {
            return Err(BlockchainError::Config(format!(
                "Difficulty target longer than {MAX_TARGET_LEN} characters"
            )));
        }
        if !target
            .chars()
            .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c))
        {
            return Err(BlockchainError::Config(format!(
                "Difficulty target must be lowercase hex: {target}"
            )));
        }
        Ok(())
    }

    pub fn get_target(&self) -> &str {
        self.target.as_str()
    }

    /// Scan nonces upward from zero until one satisfies the target
    pub fn search(
        &self,
        index: u64,
        previous_hash: &str,
        transactions: &[Transaction],
    ) -> Result<u64> {
        let never = AtomicBool::new(false);
        self.search_with_cancel(index, previous_hash, transactions, &never)?
            .ok_or_else(|| BlockchainError::Mining("Search stopped without a result".to_string()))
    }

    /// Same scan as [`ProofOfWork::search`], giving up with `Ok(None)` as soon
    /// as `cancel` is observed set.
    pub fn search_with_cancel(
        &self,
        index: u64,
        previous_hash: &str,
        transactions: &[Transaction],
        cancel: &AtomicBool,
    ) -> Result<Option<u64>> {
        let prefix = Self::prepare_prefix(index, previous_hash, transactions)?;
        info!(
            "Starting proof-of-work for block {index} with {} transactions (target: {:?})",
            transactions.len(),
            self.target
        );

        let mut nonce: u64 = 0;
        loop {
            if cancel.load(Ordering::Relaxed) {
                info!("Proof-of-work for block {index} cancelled at nonce {nonce}");
                return Ok(None);
            }
            if self.meets_target(&prefix, nonce) {
                info!("Proof-of-work completed for block {index}: nonce {nonce}");
                return Ok(Some(nonce));
            }
            nonce = nonce.checked_add(1).ok_or_else(|| {
                BlockchainError::Mining(format!("Nonce space exhausted for block {index}"))
            })?;
        }
    }

    pub fn verify(
        &self,
        index: u64,
        previous_hash: &str,
        transactions: &[Transaction],
        nonce: u64,
    ) -> bool {
        match Self::prepare_prefix(index, previous_hash, transactions) {
            Ok(prefix) => self.meets_target(&prefix, nonce),
            Err(e) => {
                debug!("Could not render transactions for block {index}: {e}");
                false
            }
        }
    }

    // Everything but the nonce, rendered once per search
    fn prepare_prefix(
        index: u64,
        previous_hash: &str,
        transactions: &[Transaction],
    ) -> Result<String> {
        let rendered = canonical_json(transactions)?;
        Ok(format!("{index}{previous_hash}{rendered}"))
    }

    fn meets_target(&self, prefix: &str, nonce: u64) -> bool {
        let content = format!("{prefix}{nonce}");
        let hash = HEXLOWER.encode(&sha256_digest(content.as_bytes()));
        hash.starts_with(self.target.as_str())
    }
}
