//! Ledger integration tests
//!
//! Exercises the engine through its public API: genesis, mining,
//! validation and reconciliation against in-memory peers.

use pow_ledger::core::{Block, Blockchain, ChainResponse, Ledger, ProofOfWork, Transaction};
use pow_ledger::{
    digest, valid_chain, BlockchainError, Config, PeerClient, Result, TransactionRequest,
    GENESIS_SEED,
};
use std::collections::HashMap;

const EASY_TARGET: &str = "00";

struct StaticPeers {
    chains: HashMap<String, ChainResponse>,
}

impl PeerClient for StaticPeers {
    fn fetch_chain(&self, peer: &str) -> Result<ChainResponse> {
        self.chains
            .get(peer)
            .cloned()
            .ok_or_else(|| BlockchainError::PeerUnreachable(format!("{peer} did not answer")))
    }
}

fn easy_pow() -> ProofOfWork {
    ProofOfWork::new(EASY_TARGET).unwrap()
}

fn test_config(node: &str) -> Config {
    let mut config = Config::default();
    config.set_difficulty_target(EASY_TARGET);
    config.set_node_identifier(node);
    config
}

fn chain_of_length(pow: &ProofOfWork, length: usize) -> Vec<Block> {
    let mut blockchain = Blockchain::new(pow).unwrap();
    while blockchain.len() < length {
        blockchain
            .add_transaction(Transaction::new("alice", "bob", blockchain.len() as f64))
            .unwrap();
        let template = blockchain
            .block_template(Transaction::new_reward("peer", 1.0))
            .unwrap();
        let nonce = pow
            .search(
                template.get_index(),
                template.get_previous_hash(),
                template.get_transactions(),
            )
            .unwrap();
        blockchain.commit_block(template, nonce).unwrap();
    }
    blockchain.get_chain().to_vec()
}

fn request(sender: &str, recipient: &str, amount: f64) -> TransactionRequest {
    TransactionRequest {
        sender: Some(sender.to_string()),
        recipient: Some(recipient.to_string()),
        amount: Some(amount),
    }
}

#[test]
fn test_genesis_block_properties() {
    let pow = easy_pow();
    let blockchain = Blockchain::new(&pow).unwrap();
    let genesis = &blockchain.get_chain()[0];
    let seed_hash = digest(GENESIS_SEED).unwrap();

    assert_eq!(genesis.get_index(), 0);
    assert_eq!(genesis.get_previous_hash(), seed_hash);
    assert!(pow.verify(0, &seed_hash, &[], genesis.get_nonce()));
}

#[test]
fn test_search_output_always_verifies() {
    let pow = easy_pow();
    let cases = vec![
        (0, "seed".to_string(), vec![]),
        (1, "ab".repeat(32), vec![Transaction::new("a", "b", 1.0)]),
        (
            7,
            "cd".repeat(32),
            vec![
                Transaction::new("a", "b", 1.5),
                Transaction::new("a", "b", 1.5),
                Transaction::new_reward("miner", 1.0),
            ],
        ),
    ];
    for (index, previous_hash, transactions) in cases {
        let nonce = pow.search(index, &previous_hash, &transactions).unwrap();
        assert!(pow.verify(index, &previous_hash, &transactions, nonce));
    }
}

#[test]
fn test_add_then_mine_moves_exactly_the_new_transactions() {
    let ledger = Ledger::new(&test_config("miner-1"), Box::new(StaticPeers {
        chains: HashMap::new(),
    }))
    .unwrap();

    ledger.submit_transaction(request("alice", "bob", 1.0)).unwrap();
    ledger.mine().unwrap();

    assert_eq!(ledger.submit_transaction(request("carol", "dave", 2.0)).unwrap(), 2);
    assert_eq!(ledger.submit_transaction(request("erin", "frank", 3.0)).unwrap(), 2);
    let block = ledger.mine().unwrap();

    assert!(ledger.get_pending_transactions().unwrap().is_empty());
    assert_eq!(
        block.get_transactions(),
        &[
            Transaction::new("carol", "dave", 2.0),
            Transaction::new("erin", "frank", 3.0),
            Transaction::new_reward("miner-1", 1.0),
        ]
    );

    let chain = ledger.get_chain().unwrap();
    assert_eq!(chain.length, 3);
    assert!(valid_chain(&chain.chain, ledger.get_proof_of_work()));
}

#[test]
fn test_missing_field_rejected_without_mutation() {
    let ledger = Ledger::new(&test_config("miner-2"), Box::new(StaticPeers {
        chains: HashMap::new(),
    }))
    .unwrap();
    ledger.submit_transaction(request("alice", "bob", 1.0)).unwrap();

    let result = ledger.submit_transaction(TransactionRequest {
        sender: None,
        recipient: Some("bob".to_string()),
        amount: Some(1.0),
    });

    assert!(matches!(result, Err(BlockchainError::MalformedRequest(_))));
    assert_eq!(
        ledger.get_pending_transactions().unwrap(),
        vec![Transaction::new("alice", "bob", 1.0)]
    );
}

#[test]
fn test_corrupted_chains_fail_validation() {
    let pow = easy_pow();
    let chain = chain_of_length(&pow, 4);
    assert!(valid_chain(&chain, &pow));

    let target = &chain[2];
    let mut relinked = chain.clone();
    relinked[2] = Block::new(
        target.get_index(),
        target.get_timestamp(),
        target.get_transactions().to_vec(),
        target.get_nonce(),
        "ee".repeat(32),
    );
    assert!(!valid_chain(&relinked, &pow));

    let bad_nonce = (0..)
        .find(|n| {
            !pow.verify(
                target.get_index(),
                target.get_previous_hash(),
                target.get_transactions(),
                *n,
            )
        })
        .unwrap();
    let mut renonced = chain.clone();
    renonced[2] = Block::new(
        target.get_index(),
        target.get_timestamp(),
        target.get_transactions().to_vec(),
        bad_nonce,
        target.get_previous_hash().to_string(),
    );
    assert!(!valid_chain(&renonced, &pow));
}

#[test]
fn test_reconcile_picks_only_longer_valid_chain() {
    let pow = easy_pow();

    // Peer B: length 5, but block 4 no longer links to block 3
    let mut broken = chain_of_length(&pow, 5);
    let fourth = broken[4].clone();
    broken[4] = Block::new(
        fourth.get_index(),
        fourth.get_timestamp(),
        fourth.get_transactions().to_vec(),
        fourth.get_nonce(),
        "ff".repeat(32),
    );
    let peer_c = chain_of_length(&pow, 4);

    let mut chains = HashMap::new();
    chains.insert(
        "peer-a:5000".to_string(),
        ChainResponse::from_blocks(&chain_of_length(&pow, 2)),
    );
    chains.insert("peer-b:5000".to_string(), ChainResponse::from_blocks(&broken));
    chains.insert("peer-c:5000".to_string(), ChainResponse::from_blocks(&peer_c));

    let mut config = test_config("local");
    for peer in ["http://peer-a:5000", "http://peer-b:5000", "peer-c:5000", "peer-d:5000"] {
        config.add_peer(peer);
    }
    let ledger = Ledger::new(&config, Box::new(StaticPeers { chains })).unwrap();
    ledger.mine().unwrap();
    ledger.mine().unwrap();
    assert_eq!(ledger.get_chain().unwrap().length, 3);

    assert!(ledger.reconcile().unwrap());

    let chain = ledger.get_chain().unwrap();
    assert_eq!(chain.length, 4);
    assert_eq!(chain.chain, peer_c);
}

#[test]
fn test_reconcile_keeps_local_chain_on_tie() {
    let pow = easy_pow();
    let mut chains = HashMap::new();
    chains.insert(
        "peer-a:5000".to_string(),
        ChainResponse::from_blocks(&chain_of_length(&pow, 2)),
    );

    let mut config = test_config("local");
    config.add_peer("peer-a:5000");
    let ledger = Ledger::new(&config, Box::new(StaticPeers { chains })).unwrap();
    ledger.mine().unwrap();
    let before = ledger.get_chain().unwrap();

    assert!(!ledger.reconcile().unwrap());
    assert_eq!(ledger.get_chain().unwrap(), before);
}

#[test]
fn test_two_nodes_converge() {
    let pow = easy_pow();
    let node_a = Ledger::new(&test_config("node-a"), Box::new(StaticPeers {
        chains: HashMap::new(),
    }))
    .unwrap();
    for _ in 0..3 {
        node_a.mine().unwrap();
    }

    let mut chains = HashMap::new();
    chains.insert("node-a:5000".to_string(), node_a.get_chain().unwrap());
    let node_b = Ledger::new(&test_config("node-b"), Box::new(StaticPeers { chains })).unwrap();
    node_b.register_peer("http://node-a:5000").unwrap();
    node_b
        .submit_transaction(request("alice", "bob", 9.0))
        .unwrap();

    assert!(node_b.reconcile().unwrap());
    assert_eq!(node_b.get_chain().unwrap(), node_a.get_chain().unwrap());
    // The pending buffer survives the swap and lands on top of the new chain
    let block = node_b.mine().unwrap();
    assert_eq!(block.get_index(), 4);
    assert!(valid_chain(&node_b.get_chain().unwrap().chain, &pow));
}
