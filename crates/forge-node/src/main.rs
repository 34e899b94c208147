mod api;
mod fetch;

use std::net::SocketAddr;
use std::time::Duration;

use clap::Parser;
use forge_core::{Ledger, PeerRegistry, ProofOfWork};
use rand::RngCore;
use tracing::{info, warn, Level};

use crate::api::{build_router, AppState};
use crate::fetch::HttpFetch;

#[derive(Parser, Debug)]
struct Args {
    /// Address to listen on, e.g. 127.0.0.1:8080
    #[arg(long, default_value = "127.0.0.1:8080")]
    listen: String,

    /// Proof-of-work difficulty in leading zero hex characters
    #[arg(long, default_value_t = forge_core::constants::POW_DIFFICULTY)]
    difficulty: usize,

    /// Peer to register at startup (host:port or URL); repeatable
    #[arg(long = "peer")]
    peers: Vec<String>,

    /// Timeout for each peer chain fetch, in seconds
    #[arg(long, default_value_t = 5)]
    peer_timeout: u64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    let node_id = random_node_id();
    info!(%node_id, difficulty = args.difficulty, "starting forge-node");

    let mut peers = PeerRegistry::new();
    for peer in &args.peers {
        if let Err(err) = peers.register(peer) {
            warn!(%err, "ignoring bootstrap peer");
        }
    }

    let state = AppState::new(
        Ledger::new(node_id),
        peers,
        ProofOfWork::new(args.difficulty),
        HttpFetch::new(Duration::from_secs(args.peer_timeout)),
    );
    let app = build_router(state);

    let addr: SocketAddr = args.listen.parse()?;
    info!("forge-node listening on http://{addr}");
    axum::serve(tokio::net::TcpListener::bind(addr).await?, app).await?;
    Ok(())
}

/// 128 random bits, hex encoded. Stands in for a node address and is
/// credited as the recipient of this node's mining rewards.
fn random_node_id() -> String {
    let mut bytes = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}
