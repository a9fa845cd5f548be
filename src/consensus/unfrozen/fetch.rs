// Missing-block fetcher - Closes the gap between votes and the pool
//
// Peers sometimes vote for blocks we never observed. Each sweep walks the
// vote registry's heights past the frozen edge and requests every voted-for
// hash the pool does not hold. Responses re-enter admission; a response whose
// hash differs from the request is silently dropped. Transport errors are
// absorbed by the mesh and not retried here; the next sweep re-issues.

use super::{lock_pool, Admission, FrozenChain, SharedPool, VoteRegistry};
use crate::network::mesh::MeshTransport;
use crate::network::protocol::MissingBlockRequest;
use crate::types::{BlockHeight, Hash};
use std::sync::Arc;
use tracing::debug;

/// Requests blocks that peers have voted for but we do not hold
pub struct MissingBlockFetcher {
    pool: SharedPool,
    chain: Arc<dyn FrozenChain>,
    votes: Arc<dyn VoteRegistry>,
    mesh: Arc<dyn MeshTransport>,
    admission: Arc<Admission>,
}

impl MissingBlockFetcher {
    pub fn new(
        pool: SharedPool,
        chain: Arc<dyn FrozenChain>,
        votes: Arc<dyn VoteRegistry>,
        mesh: Arc<dyn MeshTransport>,
        admission: Arc<Admission>,
    ) -> Self {
        Self {
            pool,
            chain,
            votes,
            mesh,
            admission,
        }
    }

    /// Request every voted-for block above the frozen edge that is missing
    /// from the pool
    pub fn sweep(&self) {
        let frozen_edge = self.chain.frozen_edge_height();
        for height in self.votes.heights() {
            if height <= frozen_edge {
                continue;
            }
            for hash in self.votes.hashes_for(height) {
                let held = lock_pool(&self.pool).contains(height, &hash);
                if !held {
                    self.fetch(height, hash);
                }
            }
        }
    }

    /// Targeted single-block retrieval from a random peer. The callback runs
    /// without the pool lock held.
    pub fn fetch(&self, height: BlockHeight, hash: Hash) {
        debug!("📡 fetching block {} at height {} from mesh", hash, height);

        let admission = Arc::clone(&self.admission);
        self.mesh.fetch_block(
            MissingBlockRequest { height, hash },
            Box::new(move |response| {
                if let Some(block) = response.block {
                    if block.hash() == hash {
                        admission.admit(block);
                    }
                }
            }),
        );
    }
}
