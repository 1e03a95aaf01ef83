//! Longest-valid-chain reconciliation
//!
//! Peers are asked for their chains; a peer's chain is only a candidate if
//! its length is strictly greater than the best seen so far (starting from
//! the local length) and it validates end to end. Equal lengths never win.
//! Unreachable peers and invalid chains are skipped, never fatal.

use crate::core::{validator, Block, Blockchain, ProofOfWork};
use crate::error::Result;
use crate::network::PeerClient;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

/// A full chain as reported by a node, and the length it claims
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainResponse {
    pub chain: Vec<Block>,
    pub length: usize,
}

impl ChainResponse {
    pub fn from_blocks(chain: &[Block]) -> ChainResponse {
        ChainResponse {
            chain: chain.to_vec(),
            length: chain.len(),
        }
    }
}

/// Fetch every peer's chain, skipping the peers that cannot be reached
pub fn fetch_peer_chains(
    peers: &[String],
    client: &dyn PeerClient,
) -> Vec<(String, ChainResponse)> {
    let mut responses = Vec::with_capacity(peers.len());
    for peer in peers {
        match client.fetch_chain(peer) {
            Ok(response) => {
                debug!("Peer {peer} reported a chain of length {}", response.length);
                responses.push((peer.clone(), response));
            }
            Err(e) => warn!("Skipping peer {peer}: {e}"),
        }
    }
    responses
}

/// Pick the longest valid candidate strictly longer than `local_length`
pub fn select_longest_chain(
    local_length: usize,
    candidates: Vec<(String, ChainResponse)>,
    pow: &ProofOfWork,
) -> Option<Vec<Block>> {
    let mut max_length = local_length;
    let mut best = None;

    for (peer, response) in candidates {
        if response.length <= max_length {
            debug!(
                "Ignoring chain from {peer}: length {} does not beat {max_length}",
                response.length
            );
            continue;
        }
        if response.length != response.chain.len() {
            warn!(
                "Rejecting chain from {peer}: reported length {} but sent {} blocks",
                response.length,
                response.chain.len()
            );
            continue;
        }
        if let Err(e) = validator::validate_chain(&response.chain, pow) {
            warn!("Rejecting chain from {peer}: {e}");
            continue;
        }

        info!("Chain from {peer} is the new candidate (length {})", response.length);
        max_length = response.length;
        best = Some(response.chain);
    }

    best
}

/// Swap `blockchain` for the longest valid candidate, if one beats it.
///
/// Candidates are fetched beforehand with [`fetch_peer_chains`] so that no
/// network call runs while the caller holds the chain. Returns true iff the
/// local chain was replaced.
pub fn resolve_conflicts(
    blockchain: &mut Blockchain,
    candidates: Vec<(String, ChainResponse)>,
    pow: &ProofOfWork,
) -> Result<bool> {
    match select_longest_chain(blockchain.len(), candidates, pow) {
        Some(chain) => {
            blockchain.replace_chain(chain)?;
            Ok(true)
        }
        None => {
            info!("Local chain of length {} kept", blockchain.len());
            Ok(false)
        }
    }
}
