use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "pow-ledger")]
pub struct Opt {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    #[command(name = "startnode", about = "Start a ledger node")]
    StartNode {
        #[arg(help = "Port to listen on (overrides the configured address)")]
        port: Option<u16>,
        #[arg(long = "config", help = "Path to a TOML configuration file")]
        config: Option<PathBuf>,
        #[arg(long = "peer", help = "Peer to register at startup (repeatable)")]
        peers: Vec<String>,
    },
    #[command(name = "printconfig", about = "Print the effective configuration")]
    PrintConfig {
        #[arg(long = "config", help = "Path to a TOML configuration file")]
        config: Option<PathBuf>,
    },
}
