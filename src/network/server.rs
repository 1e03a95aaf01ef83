//! HTTP shell around the ledger
//!
//! Routes:
//! - `GET /blockchain` full chain and length (also what peers fetch)
//! - `GET /mine` mine the pending buffer into a new block
//! - `POST /transactions/new` queue a transaction
//! - `POST /nodes/add_nodes` register peers
//! - `GET /nodes/sync` reconcile with registered peers
//!
//! Every ledger call takes a `std` lock, and mining and reconciliation block
//! for much longer, so handlers hand all ledger work to Tokio's blocking pool.

use crate::core::{Block, ChainResponse, Ledger, Transaction, TransactionRequest};
use crate::error::{BlockchainError, Result};
use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use log::{error, info, warn};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::signal;

pub type SharedLedger = Arc<Ledger>;

type HandlerError = (StatusCode, String);

pub struct Server {
    ledger: SharedLedger,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MineResponse {
    pub message: String,
    pub index: u64,
    pub previous_hash: String,
    pub transactions: Vec<Transaction>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct AddNodesRequest {
    pub nodes: Option<Vec<String>>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AddNodesResponse {
    pub message: String,
    pub nodes: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SyncResponse {
    pub message: String,
    pub blockchain: Vec<Block>,
}

impl Server {
    pub fn new(ledger: SharedLedger) -> Self {
        Self { ledger }
    }

    pub fn router(&self) -> Router {
        Router::new()
            .route("/blockchain", get(full_chain))
            .route("/mine", get(mine_block))
            .route("/transactions/new", post(new_transaction))
            .route("/nodes/add_nodes", post(add_nodes))
            .route("/nodes/sync", get(sync))
            .with_state(Arc::clone(&self.ledger))
    }

    /// Serve until Ctrl-C; an in-flight search is cancelled on the way out
    pub async fn run(self, addr: &str) -> Result<()> {
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| BlockchainError::Network(format!("Failed to bind to {addr}: {e}")))?;

        info!("Server listening on {addr}");

        let ledger = Arc::clone(&self.ledger);
        axum::serve(listener, self.router())
            .with_graceful_shutdown(async move {
                let _ = signal::ctrl_c().await;
                info!("Shutdown signal received");
                ledger.cancel_mining();
            })
            .await
            .map_err(|e| BlockchainError::Network(format!("Server error: {e}")))
    }
}

fn to_response_error(err: BlockchainError) -> HandlerError {
    match err {
        BlockchainError::MalformedRequest(_) | BlockchainError::InvalidAddress(_) => {
            warn!("Rejected request: {err}");
            (StatusCode::BAD_REQUEST, err.to_string())
        }
        BlockchainError::Mining(_) => (StatusCode::SERVICE_UNAVAILABLE, err.to_string()),
        _ => {
            error!("Request failed: {err}");
            (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
        }
    }
}

async fn run_blocking<T, F>(ledger: SharedLedger, work: F) -> std::result::Result<T, HandlerError>
where
    T: Send + 'static,
    F: FnOnce(&Ledger) -> Result<T> + Send + 'static,
{
    tokio::task::spawn_blocking(move || work(ledger.as_ref()))
        .await
        .map_err(|e| {
            error!("Blocking task failed: {e}");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        })?
        .map_err(to_response_error)
}

/// `GET /blockchain`
pub async fn full_chain(
    State(ledger): State<SharedLedger>,
) -> std::result::Result<Json<ChainResponse>, HandlerError> {
    run_blocking(ledger, |ledger| ledger.get_chain())
        .await
        .map(Json)
}

/// `GET /mine`
pub async fn mine_block(
    State(ledger): State<SharedLedger>,
) -> std::result::Result<Json<MineResponse>, HandlerError> {
    let block = run_blocking(ledger, |ledger| ledger.mine()).await?;
    Ok(Json(MineResponse {
        message: "New block mined".to_string(),
        index: block.get_index(),
        previous_hash: block.get_previous_hash().to_string(),
        transactions: block.get_transactions().to_vec(),
    }))
}

/// `POST /transactions/new`
pub async fn new_transaction(
    State(ledger): State<SharedLedger>,
    Json(body): Json<TransactionRequest>,
) -> std::result::Result<(StatusCode, Json<MessageResponse>), HandlerError> {
    let index = run_blocking(ledger, move |ledger| ledger.submit_transaction(body)).await?;
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: format!("Transaction will be added to block {index}"),
        }),
    ))
}

/// `POST /nodes/add_nodes`
pub async fn add_nodes(
    State(ledger): State<SharedLedger>,
    Json(body): Json<AddNodesRequest>,
) -> std::result::Result<Json<AddNodesResponse>, HandlerError> {
    let nodes = body.nodes.ok_or_else(|| {
        (
            StatusCode::BAD_REQUEST,
            "Error, missing node(s) info".to_string(),
        )
    })?;
    let nodes = run_blocking(ledger, move |ledger| ledger.register_peers(&nodes)).await?;
    Ok(Json(AddNodesResponse {
        message: "New nodes have been added".to_string(),
        nodes,
    }))
}

/// `GET /nodes/sync`
pub async fn sync(
    State(ledger): State<SharedLedger>,
) -> std::result::Result<Json<SyncResponse>, HandlerError> {
    let (replaced, chain) = run_blocking(ledger, |ledger| {
        let replaced = ledger.reconcile()?;
        Ok((replaced, ledger.get_chain()?))
    })
    .await?;
    let message = if replaced {
        "Blockchain has been replaced with a longer chain"
    } else {
        "Blockchain is already up to date"
    };
    Ok(Json(SyncResponse {
        message: message.to_string(),
        blockchain: chain.chain,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::core::{Blockchain, ProofOfWork};
    use crate::network::PeerClient;
    use std::time::Duration;

    struct NoPeers;

    impl PeerClient for NoPeers {
        fn fetch_chain(&self, peer: &str) -> Result<ChainResponse> {
            Err(BlockchainError::PeerUnreachable(peer.to_string()))
        }
    }

    fn test_ledger() -> SharedLedger {
        let mut config = Config::default();
        config.set_difficulty_target("0");
        config.set_node_identifier("http-node");
        Arc::new(Ledger::new(&config, Box::new(NoPeers)).unwrap())
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_chain_served_while_mining() {
        // A target no search will meet before it is cancelled
        let mut config = Config::default();
        config.set_difficulty_target("0".repeat(16));
        let genesis = Blockchain::new(&ProofOfWork::new("0").unwrap()).unwrap();
        let ledger = Arc::new(Ledger::with_chain(&config, genesis, Box::new(NoPeers)).unwrap());

        let miner = tokio::spawn(mine_block(State(Arc::clone(&ledger))));
        tokio::time::sleep(Duration::from_millis(200)).await;

        let served = tokio::time::timeout(
            Duration::from_secs(1),
            full_chain(State(Arc::clone(&ledger))),
        )
        .await;
        ledger.cancel_mining();

        let Json(chain) = served.expect("chain request waited on mining").unwrap();
        assert_eq!(chain.length, 1);
        let err = miner.await.unwrap().unwrap_err();
        assert_eq!(err.0, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_full_chain_starts_with_genesis() {
        let Json(chain) = full_chain(State(test_ledger())).await.unwrap();
        assert_eq!(chain.length, 1);
        assert_eq!(chain.chain[0].get_index(), 0);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_submit_then_mine() {
        let ledger = test_ledger();
        let (status, Json(reply)) = new_transaction(
            State(Arc::clone(&ledger)),
            Json(TransactionRequest {
                sender: Some("alice".to_string()),
                recipient: Some("bob".to_string()),
                amount: Some(3.0),
            }),
        )
        .await
        .unwrap();
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(reply.message, "Transaction will be added to block 1");

        let Json(mined) = mine_block(State(Arc::clone(&ledger))).await.unwrap();
        assert_eq!(mined.index, 1);
        assert_eq!(mined.transactions.len(), 2);
        assert_eq!(mined.transactions[1].get_recipient(), "http-node");
    }

    #[tokio::test]
    async fn test_missing_field_is_bad_request() {
        let ledger = test_ledger();
        let err = new_transaction(
            State(Arc::clone(&ledger)),
            Json(TransactionRequest {
                sender: Some("alice".to_string()),
                recipient: None,
                amount: Some(3.0),
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.0, StatusCode::BAD_REQUEST);
        assert!(ledger.get_pending_transactions().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_add_nodes() {
        let ledger = test_ledger();
        let err = add_nodes(State(Arc::clone(&ledger)), Json(AddNodesRequest::default()))
            .await
            .unwrap_err();
        assert_eq!(err.0, StatusCode::BAD_REQUEST);

        let Json(reply) = add_nodes(
            State(Arc::clone(&ledger)),
            Json(AddNodesRequest {
                nodes: Some(vec![
                    "http://127.0.0.1:5001".to_string(),
                    "127.0.0.1:5001".to_string(),
                ]),
            }),
        )
        .await
        .unwrap();
        assert_eq!(reply.nodes, vec!["127.0.0.1:5001"]);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_sync_without_reachable_peers_keeps_chain() {
        let ledger = test_ledger();
        ledger.register_peer("127.0.0.1:5999").unwrap();

        let Json(reply) = sync(State(Arc::clone(&ledger))).await.unwrap();
        assert_eq!(reply.message, "Blockchain is already up to date");
        assert_eq!(reply.blockchain.len(), 1);
    }
}
