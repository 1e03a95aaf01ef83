use crate::error::{BlockchainError, Result};
use log::info;
use reqwest::Url;
use std::sync::RwLock;

#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    addr: String,
}

impl Node {
    fn new(addr: String) -> Node {
        Node { addr }
    }

    pub fn get_addr(&self) -> String {
        self.addr.clone()
    }
}

/// Reduce a peer endpoint to its canonical `host:port` form.
///
/// Accepts `http://host:port/anything`, `host:port` or a bare `host`; a
/// missing port falls back to the scheme default.
pub fn normalize_address(address: &str) -> Result<String> {
    let trimmed = address.trim();
    if trimmed.is_empty() {
        return Err(BlockchainError::InvalidAddress(
            "empty peer address".to_string(),
        ));
    }

    let with_scheme = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("http://{trimmed}")
    };
    let url = Url::parse(&with_scheme)
        .map_err(|e| BlockchainError::InvalidAddress(format!("{trimmed}: {e}")))?;

    let host = url
        .host_str()
        .filter(|host| !host.is_empty())
        .ok_or_else(|| BlockchainError::InvalidAddress(format!("{trimmed}: no host")))?;
    let port = url
        .port_or_known_default()
        .ok_or_else(|| BlockchainError::InvalidAddress(format!("{trimmed}: no port")))?;

    Ok(format!("{host}:{port}"))
}

/// The set of registered peers, deduplicated by canonical address
pub struct Nodes {
    inner: RwLock<Vec<Node>>,
}

impl Default for Nodes {
    fn default() -> Self {
        Self::new()
    }
}

impl Nodes {
    pub fn new() -> Nodes {
        Nodes {
            inner: RwLock::new(vec![]),
        }
    }

    /// Register a peer; returns its canonical address whether or not it was new
    pub fn add_node(&self, address: &str) -> Result<String> {
        let addr = normalize_address(address)?;
        let mut inner = self
            .inner
            .write()
            .map_err(|e| BlockchainError::Lock(format!("Failed to acquire peer lock: {e}")))?;
        if !inner.iter().any(|x| x.get_addr().eq(addr.as_str())) {
            info!("Registered peer {addr}");
            inner.push(Node::new(addr.clone()));
        }
        Ok(addr)
    }

    pub fn get_nodes(&self) -> Result<Vec<Node>> {
        let inner = self
            .inner
            .read()
            .map_err(|e| BlockchainError::Lock(format!("Failed to acquire peer lock: {e}")))?;
        Ok(inner.to_vec())
    }

    pub fn get_addrs(&self) -> Result<Vec<String>> {
        Ok(self.get_nodes()?.iter().map(Node::get_addr).collect())
    }
}
