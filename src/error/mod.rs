//! Error handling for the ledger node
//!
//! This module provides the error types shared by the engine, the peer
//! client and the HTTP shell.

use std::fmt;

/// Result type alias for ledger operations
pub type Result<T> = std::result::Result<T, BlockchainError>;

/// Error types for ledger operations
#[derive(Debug, Clone, PartialEq)]
pub enum BlockchainError {
    /// A transaction submission is missing a required field
    MalformedRequest(String),
    /// A peer could not be reached or answered with a non-success status
    PeerUnreachable(String),
    /// A candidate chain failed validation
    InvalidChain(String),
    /// No genesis block present where one was expected
    EmptyChain,
    /// Peer endpoint that cannot be normalised to host:port
    InvalidAddress(String),
    /// Mining errors
    Mining(String),
    /// A mined block whose chain tip moved before it could be appended
    StaleBlock(String),
    /// Configuration errors
    Config(String),
    /// Serialization/deserialization errors
    Serialization(String),
    /// Network communication errors
    Network(String),
    /// File I/O errors
    Io(String),
    /// Poisoned lock around shared node state
    Lock(String),
}

impl fmt::Display for BlockchainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlockchainError::MalformedRequest(msg) => write!(f, "Malformed request: {msg}"),
            BlockchainError::PeerUnreachable(msg) => write!(f, "Peer unreachable: {msg}"),
            BlockchainError::InvalidChain(msg) => write!(f, "Invalid chain: {msg}"),
            BlockchainError::EmptyChain => write!(f, "Chain has no genesis block"),
            BlockchainError::InvalidAddress(addr) => write!(f, "Invalid address: {addr}"),
            BlockchainError::Mining(msg) => write!(f, "Mining error: {msg}"),
            BlockchainError::StaleBlock(msg) => write!(f, "Stale block: {msg}"),
            BlockchainError::Config(msg) => write!(f, "Configuration error: {msg}"),
            BlockchainError::Serialization(msg) => write!(f, "Serialization error: {msg}"),
            BlockchainError::Network(msg) => write!(f, "Network error: {msg}"),
            BlockchainError::Io(msg) => write!(f, "I/O error: {msg}"),
            BlockchainError::Lock(msg) => write!(f, "Lock error: {msg}"),
        }
    }
}

impl std::error::Error for BlockchainError {}

impl From<std::io::Error> for BlockchainError {
    fn from(err: std::io::Error) -> Self {
        BlockchainError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for BlockchainError {
    fn from(err: serde_json::Error) -> Self {
        BlockchainError::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for BlockchainError {
    fn from(err: toml::de::Error) -> Self {
        BlockchainError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for BlockchainError {
    fn from(err: toml::ser::Error) -> Self {
        BlockchainError::Serialization(err.to_string())
    }
}

impl From<reqwest::Error> for BlockchainError {
    fn from(err: reqwest::Error) -> Self {
        BlockchainError::PeerUnreachable(err.to_string())
    }
}
