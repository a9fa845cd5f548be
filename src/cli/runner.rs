// Runner - Main node execution logic
// Principle: Orchestrate consensus workers and graceful shutdown

use crate::cli::config::NodeConfig;
use crate::consensus::unfrozen::{
    Admission, CandidatePool, Clock, Freezer, FrozenChain, MissingBlockFetcher, SharedPool,
    SystemClock, VoteDecider,
};
use crate::network::mesh::{LoopbackMesh, MeshDirectory};
use crate::network::votes::BlockVoteRegistry;
use crate::node::balances::LedgerBalanceEngine;
use crate::node::chain::FrozenLedger;
use crate::node::identity::NodeIdentity;
use std::sync::{Arc, Mutex};
use tokio::signal;
use tracing::info;

/// Run the node with the given configuration
pub async fn run_node(config: NodeConfig) -> anyhow::Result<()> {
    info!("🚀 Starting Glacier node: {}", config.name);

    let identity = match config.key_seed {
        Some(seed) => NodeIdentity::from_seed(seed),
        None => {
            info!("No key file given; generating an ephemeral identity");
            NodeIdentity::generate()
        }
    };
    info!("🆔 Verifier: {}", identity.verifier_id());

    if config.genesis_mode {
        info!("🌟 GENESIS MODE - starting a new network in the genesis cycle");
    }

    // Collaborators
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let genesis_timestamp = clock.now_ms();
    let chain = Arc::new(FrozenLedger::new(
        clock.clone(),
        genesis_timestamp,
        0,
        config.cycle_length,
        config.genesis_mode,
    ));
    let registry = Arc::new(MeshDirectory::new(config.mesh_size));
    let votes = Arc::new(BlockVoteRegistry::new(identity.verifier_id()));
    let mesh = Arc::new(LoopbackMesh::new());
    let pool: SharedPool = Arc::new(Mutex::new(CandidatePool::new()));

    // Consensus workers
    let admission = Arc::new(Admission::new(
        pool.clone(),
        chain.clone(),
        Arc::new(LedgerBalanceEngine),
    ));
    let decider = VoteDecider::new(
        pool.clone(),
        chain.clone(),
        votes.clone(),
        mesh.clone(),
        registry.clone(),
        clock.clone(),
        identity.verifier_id(),
    );
    let freezer = Freezer::new(pool.clone(), chain.clone(), votes.clone(), registry);
    let fetcher = MissingBlockFetcher::new(
        pool.clone(),
        chain.clone(),
        votes.clone(),
        mesh,
        admission,
    );

    info!(
        "✅ Node started (tick {} ms, sweep every {} ticks)",
        config.tick_interval.as_millis(),
        config.sweep_every
    );

    let mut ticker = tokio::time::interval(config.tick_interval);
    let mut tick: u64 = 0;

    loop {
        tokio::select! {
            _ = signal::ctrl_c() => {
                info!("🛑 Shutting down...");
                break;
            }

            _ = ticker.tick() => {
                tick += 1;

                decider.tick();
                freezer.attempt_freeze().await;

                if tick % config.sweep_every as u64 == 0 {
                    fetcher.sweep();
                    // Votes for frozen heights are dead weight
                    votes.purge_at_or_below(chain.frozen_edge_height());
                }
            }
        }
    }

    info!("👋 Node stopped cleanly");
    Ok(())
}
