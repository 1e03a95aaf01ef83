use crate::core::{ProofOfWork, DEFAULT_DIFFICULTY_TARGET};
use crate::error::{BlockchainError, Result};
use log::info;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;
use std::time::Duration;
use uuid::Uuid;

static DEFAULT_NODE_ADDR: &str = "0.0.0.0:5000";

const NODE_ADDRESS_KEY: &str = "NODE_ADDRESS";
const NODE_ID_KEY: &str = "NODE_ID";

const DEFAULT_MINING_REWARD: f64 = 1.0;
const DEFAULT_PEER_TIMEOUT_MS: u64 = 5000;

/// Node settings: TOML file first, then environment, then command line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    listen_addr: String,
    node_identifier: String,
    difficulty_target: String,
    mining_reward: f64,
    peer_timeout_ms: u64,
    peers: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            listen_addr: String::from(DEFAULT_NODE_ADDR),
            node_identifier: Uuid::new_v4().simple().to_string(),
            difficulty_target: String::from(DEFAULT_DIFFICULTY_TARGET),
            mining_reward: DEFAULT_MINING_REWARD,
            peer_timeout_ms: DEFAULT_PEER_TIMEOUT_MS,
            peers: Vec::new(),
        }
    }
}

impl Config {
    /// Load from an optional TOML file and apply environment overrides
    pub fn load(path: Option<&Path>) -> Result<Config> {
        let mut config = match path {
            Some(path) => {
                info!("Loading configuration from {}", path.display());
                let contents = fs::read_to_string(path).map_err(|e| {
                    BlockchainError::Config(format!("Failed to read {}: {e}", path.display()))
                })?;
                Self::from_toml_str(&contents)?
            }
            None => Config::default(),
        };
        config.apply_overrides(|key| env::var(key).ok());
        Ok(config)
    }

    pub fn from_toml_str(contents: &str) -> Result<Config> {
        Ok(toml::from_str(contents)?)
    }

    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string(self)?)
    }

    /// Apply `NODE_ADDRESS` / `NODE_ID` style overrides from `lookup`
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(addr) = lookup(NODE_ADDRESS_KEY) {
            self.listen_addr = addr;
        }
        if let Some(node_id) = lookup(NODE_ID_KEY) {
            self.node_identifier = node_id;
        }
    }

    pub fn validate(&self) -> Result<()> {
        ProofOfWork::check_target(&self.difficulty_target)?;
        if self.node_identifier.trim().is_empty() {
            return Err(BlockchainError::Config(
                "Node identifier must not be empty".to_string(),
            ));
        }
        if self.peer_timeout_ms == 0 {
            return Err(BlockchainError::Config(
                "Peer timeout must be greater than zero".to_string(),
            ));
        }
        if !self.mining_reward.is_finite() {
            return Err(BlockchainError::Config(
                "Mining reward must be a finite number".to_string(),
            ));
        }
        Ok(())
    }

    pub fn get_listen_addr(&self) -> &str {
        self.listen_addr.as_str()
    }

    /// Keep the configured host, listen on `port` instead
    pub fn set_port(&mut self, port: u16) {
        let host = match self.listen_addr.rsplit_once(':') {
            Some((host, _)) => host,
            None => self.listen_addr.as_str(),
        };
        self.listen_addr = format!("{host}:{port}");
    }

    pub fn get_node_identifier(&self) -> &str {
        self.node_identifier.as_str()
    }

    pub fn set_node_identifier(&mut self, node_identifier: impl Into<String>) {
        self.node_identifier = node_identifier.into();
    }

    pub fn get_difficulty_target(&self) -> &str {
        self.difficulty_target.as_str()
    }

    pub fn set_difficulty_target(&mut self, target: impl Into<String>) {
        self.difficulty_target = target.into();
    }

    pub fn get_mining_reward(&self) -> f64 {
        self.mining_reward
    }

    pub fn get_peer_timeout(&self) -> Duration {
        Duration::from_millis(self.peer_timeout_ms)
    }

    pub fn get_peers(&self) -> &[String] {
        self.peers.as_slice()
    }

    pub fn add_peer(&mut self, peer: impl Into<String>) {
        self.peers.push(peer.into());
    }
}
