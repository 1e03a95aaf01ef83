// The chain store: the ordered blocks plus the pending transaction buffer.
// Everything lives in memory; the chain only ever grows by append or gets
// swapped out wholesale after reconciliation.
//
// Mining happens in two short steps around a long search: `block_template`
// copies out what the search needs, `commit_block` appends the result only
// if the chain tip is still the one the template was built on.

use crate::core::{hasher, Block, ProofOfWork, Transaction};
use crate::error::{BlockchainError, Result};
use crate::utils::current_timestamp;
use log::info;

#[derive(Debug, Clone)]
pub struct Blockchain {
    chain: Vec<Block>,
    current_transactions: Vec<Transaction>,
}

/// Snapshot of the next block to mine, taken from the store
#[derive(Debug, Clone, PartialEq)]
pub struct BlockTemplate {
    index: u64,
    previous_hash: String,
    transactions: Vec<Transaction>,
    // How many leading transactions came out of the pending buffer
    queued: usize,
}

impl BlockTemplate {
    pub fn get_index(&self) -> u64 {
        self.index
    }

    pub fn get_previous_hash(&self) -> &str {
        self.previous_hash.as_str()
    }

    pub fn get_transactions(&self) -> &[Transaction] {
        self.transactions.as_slice()
    }
}

impl Blockchain {
    /// Create a chain holding only the genesis block.
    ///
    /// Genesis links to the digest of [`hasher::GENESIS_SEED`] and carries a
    /// nonce searched against index 0 and an empty transaction list.
    pub fn new(pow: &ProofOfWork) -> Result<Blockchain> {
        let mut blockchain = Blockchain {
            chain: Vec::new(),
            current_transactions: Vec::new(),
        };

        let genesis_hash = hasher::digest(hasher::GENESIS_SEED)?;
        info!("Creating genesis block linked to seed digest {genesis_hash}");
        let nonce = pow.search(0, &genesis_hash, &[])?;
        blockchain.append_block(nonce, genesis_hash)?;

        Ok(blockchain)
    }

    /// Seal the whole pending buffer into a new block at the end of the chain.
    ///
    /// The proof-of-work is not re-checked here; the caller searched for
    /// `nonce` against `previous_hash` and the current buffer.
    pub fn append_block(&mut self, nonce: u64, previous_hash: String) -> Result<Block> {
        let transactions = std::mem::take(&mut self.current_transactions);
        self.push_block(nonce, previous_hash, transactions)
    }

    /// Copy out the next block to mine: the pending buffer plus `reward`,
    /// on top of the current tip.
    pub fn block_template(&self, reward: Transaction) -> Result<BlockTemplate> {
        let previous_hash = self.hash_last_block()?;
        let mut transactions = self.current_transactions.clone();
        let queued = transactions.len();
        transactions.push(reward);

        Ok(BlockTemplate {
            index: self.next_index(),
            previous_hash,
            transactions,
            queued,
        })
    }

    /// Append a block mined from `template`.
    ///
    /// Fails with `StaleBlock` if the tip moved since the template was taken.
    /// Transactions queued after the template stay pending for the next block.
    pub fn commit_block(&mut self, template: BlockTemplate, nonce: u64) -> Result<Block> {
        if self.next_index() != template.index || self.hash_last_block()? != template.previous_hash
        {
            return Err(BlockchainError::StaleBlock(format!(
                "Chain tip moved while mining block {}",
                template.index
            )));
        }
        if !self
            .current_transactions
            .starts_with(&template.transactions[..template.queued])
        {
            return Err(BlockchainError::StaleBlock(format!(
                "Pending transactions changed while mining block {}",
                template.index
            )));
        }

        self.current_transactions.drain(..template.queued);
        self.push_block(nonce, template.previous_hash, template.transactions)
    }

    fn push_block(
        &mut self,
        nonce: u64,
        previous_hash: String,
        transactions: Vec<Transaction>,
    ) -> Result<Block> {
        let block = Block::new(
            self.next_index(),
            current_timestamp()?,
            transactions,
            nonce,
            previous_hash,
        );
        self.chain.push(block.clone());

        info!(
            "Appended block {} with {} transactions (nonce: {})",
            block.get_index(),
            block.get_transactions().len(),
            block.get_nonce()
        );
        Ok(block)
    }

    /// Queue a transaction and return the index of the block it should land in
    pub fn add_transaction(&mut self, transaction: Transaction) -> Result<u64> {
        let target_index = self.last_block()?.get_index() + 1;
        self.current_transactions.push(transaction);
        Ok(target_index)
    }

    pub fn last_block(&self) -> Result<&Block> {
        self.chain.last().ok_or(BlockchainError::EmptyChain)
    }

    pub fn hash_last_block(&self) -> Result<String> {
        self.last_block()?.hash()
    }

    /// Index the next appended block will take
    pub fn next_index(&self) -> u64 {
        self.chain.len() as u64
    }

    pub fn get_chain(&self) -> &[Block] {
        self.chain.as_slice()
    }

    pub fn get_current_transactions(&self) -> &[Transaction] {
        self.current_transactions.as_slice()
    }

    pub fn len(&self) -> usize {
        self.chain.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chain.is_empty()
    }

    /// Swap in a whole new chain. The pending buffer is left as it is.
    pub fn replace_chain(&mut self, chain: Vec<Block>) -> Result<()> {
        if chain.is_empty() {
            return Err(BlockchainError::EmptyChain);
        }
        info!(
            "Replacing local chain of length {} with chain of length {}",
            self.chain.len(),
            chain.len()
        );
        self.chain = chain;
        Ok(())
    }
}
