// Entry point for the ledger node binary
use clap::Parser;
use log::{error, info, LevelFilter};
use pow_ledger::{Command, Config, HttpPeerClient, Ledger, Opt, Server};
use std::process;
use std::sync::Arc;

fn main() {
    // Info by default, RUST_LOG still wins when set
    env_logger::builder()
        .filter_level(LevelFilter::Info)
        .parse_default_env()
        .init();

    let opt = Opt::parse();

    if let Err(e) = run_command(opt.command) {
        error!("Error: {e}");
        process::exit(1);
    }
}

fn run_command(command: Command) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Command::StartNode {
            port,
            config,
            peers,
        } => {
            let mut settings = Config::load(config.as_deref())?;
            if let Some(port) = port {
                settings.set_port(port);
            }
            for peer in peers {
                settings.add_peer(peer);
            }
            settings.validate()?;

            // The blocking HTTP client has to be built outside the runtime
            let peer_client = HttpPeerClient::new(settings.get_peer_timeout())?;
            info!("Peer requests time out after {:?}", peer_client.get_timeout());
            let ledger = Arc::new(Ledger::new(&settings, Box::new(peer_client))?);
            info!(
                "Node {} mining with target {:?}",
                ledger.get_node_identifier(),
                ledger.get_proof_of_work().get_target()
            );

            let runtime = tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()?;
            let server = Server::new(Arc::clone(&ledger));
            runtime.block_on(server.run(settings.get_listen_addr()))?;

            // Drop the runtime before the last ledger handle so the blocking
            // client is torn down outside of it
            drop(runtime);
            drop(ledger);
        }
        Command::PrintConfig { config } => {
            let settings = Config::load(config.as_deref())?;
            settings.validate()?;
            print!("{}", settings.to_toml()?);
        }
    }
    Ok(())
}
