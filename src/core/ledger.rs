// The ledger is what the service layer talks to. It owns the chain store
// behind one mutex, plus the peer set, the proof-of-work settings and this
// node's identity. The chain lock is only ever held for short steps; a nonce
// search runs against a snapshot with the lock released.

use crate::config::Config;
use crate::core::{
    consensus, Block, Blockchain, ChainResponse, ProofOfWork, Transaction, TransactionRequest,
};
use crate::error::{BlockchainError, Result};
use crate::network::{Nodes, PeerClient};
use log::info;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

pub struct Ledger {
    blockchain: Mutex<Blockchain>,
    // One search at a time
    mining: Mutex<()>,
    nodes: Nodes,
    pow: ProofOfWork,
    node_identifier: String,
    mining_reward: f64,
    peer_client: Box<dyn PeerClient>,
    cancel_mining: AtomicBool,
}

impl Ledger {
    /// Build the genesis chain and register the configured bootstrap peers
    pub fn new(config: &Config, peer_client: Box<dyn PeerClient>) -> Result<Ledger> {
        let pow = ProofOfWork::new(config.get_difficulty_target())?;
        Self::with_chain(config, Blockchain::new(&pow)?, peer_client)
    }

    /// Wrap an existing chain store; blocks mined from here on use the
    /// configured target
    pub fn with_chain(
        config: &Config,
        blockchain: Blockchain,
        peer_client: Box<dyn PeerClient>,
    ) -> Result<Ledger> {
        let ledger = Ledger {
            blockchain: Mutex::new(blockchain),
            mining: Mutex::new(()),
            nodes: Nodes::new(),
            pow: ProofOfWork::new(config.get_difficulty_target())?,
            node_identifier: config.get_node_identifier().to_string(),
            mining_reward: config.get_mining_reward(),
            peer_client,
            cancel_mining: AtomicBool::new(false),
        };
        ledger.register_peers(config.get_peers())?;

        info!("Ledger ready, node identifier {}", ledger.node_identifier);
        Ok(ledger)
    }

    fn lock_chain(&self) -> Result<MutexGuard<'_, Blockchain>> {
        self.blockchain
            .lock()
            .map_err(|e| BlockchainError::Lock(format!("Failed to acquire chain lock: {e}")))
    }

    /// Read-only copy of the chain and its length
    pub fn get_chain(&self) -> Result<ChainResponse> {
        let blockchain = self.lock_chain()?;
        Ok(ChainResponse::from_blocks(blockchain.get_chain()))
    }

    /// Credit this node, search for a nonce over the pending buffer and append.
    ///
    /// The search runs on a snapshot of the tip and the buffer without
    /// holding the chain, so reads and submissions go through meanwhile.
    /// Transactions submitted during the search land in the following block.
    /// If the tip moves before the result is appended (another block or a
    /// reconciliation), the search starts over on the new tip. If
    /// [`Ledger::cancel_mining`] fires first, nothing is appended.
    pub fn mine(&self) -> Result<Block> {
        let _mining = self
            .mining
            .lock()
            .map_err(|e| BlockchainError::Lock(format!("Failed to acquire mining lock: {e}")))?;
        let reward = Transaction::new_reward(self.node_identifier.as_str(), self.mining_reward);

        loop {
            let template = self.lock_chain()?.block_template(reward.clone())?;
            let nonce = self
                .pow
                .search_with_cancel(
                    template.get_index(),
                    template.get_previous_hash(),
                    template.get_transactions(),
                    &self.cancel_mining,
                )?
                .ok_or_else(|| BlockchainError::Mining("Mining was cancelled".to_string()))?;

            let committed = self.lock_chain()?.commit_block(template, nonce);
            match committed {
                Ok(block) => {
                    info!("New block {} is mined!", block.get_index());
                    return Ok(block);
                }
                Err(BlockchainError::StaleBlock(reason)) => {
                    info!("{reason}, mining again on the new tip");
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Queue a submitted transaction; returns the index of the block it targets
    pub fn submit_transaction(&self, request: TransactionRequest) -> Result<u64> {
        let transaction = request.into_transaction()?;
        let index = self.lock_chain()?.add_transaction(transaction)?;
        info!("Transaction queued for block {index}");
        Ok(index)
    }

    /// Normalise and store a peer endpoint; returns its canonical form
    pub fn register_peer(&self, address: &str) -> Result<String> {
        self.nodes.add_node(address)
    }

    /// Register several peers and return the full peer list afterwards
    pub fn register_peers(&self, addresses: &[String]) -> Result<Vec<String>> {
        for address in addresses {
            self.register_peer(address)?;
        }
        self.get_peers()
    }

    pub fn get_peers(&self) -> Result<Vec<String>> {
        self.nodes.get_addrs()
    }

    /// Replace the local chain with the longest valid peer chain, if any is
    /// strictly longer. Peers are fetched without holding the chain lock.
    pub fn reconcile(&self) -> Result<bool> {
        let peers = self.get_peers()?;
        let candidates = consensus::fetch_peer_chains(&peers, self.peer_client.as_ref());

        let mut blockchain = self.lock_chain()?;
        consensus::resolve_conflicts(&mut blockchain, candidates, &self.pow)
    }

    pub fn get_pending_transactions(&self) -> Result<Vec<Transaction>> {
        Ok(self.lock_chain()?.get_current_transactions().to_vec())
    }

    pub fn get_node_identifier(&self) -> &str {
        self.node_identifier.as_str()
    }

    pub fn get_proof_of_work(&self) -> &ProofOfWork {
        &self.pow
    }

    /// Stop any running search and refuse to mine from now on (shutdown)
    pub fn cancel_mining(&self) {
        self.cancel_mining.store(true, Ordering::Relaxed);
    }
}
