//! Configuration management
//!
//! This module handles the settings of a ledger node: listen address,
//! node identity, difficulty target, mining reward and peer fetching.

pub mod settings;

pub use settings::Config;
