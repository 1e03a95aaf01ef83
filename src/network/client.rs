//! Fetching chains from peers.
//!
//! Every node serves `GET /blockchain` returning `{"chain": [...],
//! "length": n}`. Any transport failure, timeout, non-success status or
//! undecodable body counts as the peer being unavailable.

use std::time::Duration;

use log::debug;
use reqwest::blocking::Client;
use reqwest::StatusCode;

use crate::core::ChainResponse;
use crate::error::{BlockchainError, Result};

/// Path every node serves its chain on
pub const CHAIN_PATH: &str = "/blockchain";

/// Source of peer chains for reconciliation.
///
/// Implementations must be shareable across threads; the ledger calls
/// them from whichever thread runs the reconciliation.
pub trait PeerClient: Send + Sync {
    fn fetch_chain(&self, peer: &str) -> Result<ChainResponse>;
}

/// Blocking HTTP client with a bounded per-request timeout.
///
/// Build it outside of any async runtime; callers inside Tokio should run
/// reconciliation on `spawn_blocking`.
pub struct HttpPeerClient {
    client: Client,
    timeout: Duration,
}

impl HttpPeerClient {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| BlockchainError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client, timeout })
    }

    pub fn get_timeout(&self) -> Duration {
        self.timeout
    }

    fn endpoint(peer: &str) -> String {
        format!("http://{}{CHAIN_PATH}", peer.trim_end_matches('/'))
    }
}

/// Turn a peer's answer into a chain, or into `PeerUnreachable`
fn decode_chain(url: &str, status: StatusCode, body: &str) -> Result<ChainResponse> {
    if !status.is_success() {
        return Err(BlockchainError::PeerUnreachable(format!(
            "GET {url} returned HTTP status {status}"
        )));
    }

    serde_json::from_str(body).map_err(|e| {
        BlockchainError::PeerUnreachable(format!("failed to parse chain from {url}: {e}"))
    })
}

impl PeerClient for HttpPeerClient {
    fn fetch_chain(&self, peer: &str) -> Result<ChainResponse> {
        let url = Self::endpoint(peer);
        debug!("Fetching chain from {url}");

        let resp = self
            .client
            .get(&url)
            .send()
            .map_err(|e| BlockchainError::PeerUnreachable(format!("GET {url} failed: {e}")))?;

        let status = resp.status();
        let body = resp.text().map_err(|e| {
            BlockchainError::PeerUnreachable(format!("failed to read body from {url}: {e}"))
        })?;
        decode_chain(&url, status, &body)
    }
}
