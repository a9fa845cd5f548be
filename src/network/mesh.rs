// Mesh transport - Seam between the consensus core and the peer network
//
// Transport framing is outside this node. The consensus workers see two
// operations: broadcast a vote to the mesh, and fetch one block from a
// random peer with a response callback. The callback is invoked without any
// consensus lock held; it re-enters admission on its own.

use crate::consensus::unfrozen::NodeRegistry;
use crate::network::protocol::{BlockVote, MissingBlockRequest, MissingBlockResponse};
use crate::types::{Block, BlockHeight, Hash};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;
use tracing::debug;

/// Response handler for a single missing-block fetch
pub type FetchCallback = Box<dyn FnOnce(MissingBlockResponse) + Send>;

/// Broadcast and fetch operations against the peer mesh
pub trait MeshTransport: Send + Sync {
    /// Broadcast a vote to every peer
    fn broadcast_vote(&self, vote: BlockVote);

    /// Ask one peer for a block; the callback fires once with the answer
    fn fetch_block(&self, request: MissingBlockRequest, on_response: FetchCallback);
}

/// Single-process mesh: broadcasts are recorded, fetches are answered from a
/// serve table. Used by the runner and by tests.
#[derive(Default)]
pub struct LoopbackMesh {
    broadcasts: Mutex<Vec<BlockVote>>,
    serve_table: Mutex<HashMap<(BlockHeight, Hash), Block>>,
}

impl LoopbackMesh {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make a block available to fetch_block lookups
    pub fn serve_block(&self, block: Block) {
        let key = (block.height, block.hash());
        self.serve_table
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(key, block);
    }

    /// Votes broadcast so far (snapshot)
    pub fn broadcasts(&self) -> Vec<BlockVote> {
        self.broadcasts
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn last_broadcast(&self) -> Option<BlockVote> {
        self.broadcasts().last().copied()
    }
}

impl MeshTransport for LoopbackMesh {
    fn broadcast_vote(&self, vote: BlockVote) {
        debug!("broadcast vote for {} at height {}", vote.hash, vote.height);
        self.broadcasts
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(vote);
    }

    fn fetch_block(&self, request: MissingBlockRequest, on_response: FetchCallback) {
        let block = self
            .serve_table
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(&(request.height, request.hash))
            .cloned();
        on_response(MissingBlockResponse { block });
    }
}

/// Mesh membership view, backed by a plain counter
pub struct MeshDirectory {
    size: AtomicU32,
}

impl MeshDirectory {
    pub fn new(size: u32) -> Self {
        Self {
            size: AtomicU32::new(size),
        }
    }

    pub fn set_size(&self, size: u32) {
        self.size.store(size, Ordering::SeqCst);
    }
}

impl NodeRegistry for MeshDirectory {
    fn mesh_size(&self) -> u32 {
        self.size.load(Ordering::SeqCst)
    }
}
