// Shared harness for consensus integration tests
//
// Wires the real components (admission, vote decider, freezer, fetcher)
// around in-memory collaborators and a hand-set clock.

use crate::consensus::unfrozen::testing::ManualClock;
use crate::consensus::unfrozen::{
    Admission, CandidatePool, Freezer, MissingBlockFetcher, SharedPool, VoteDecider, VoteRegistry,
};
use crate::network::mesh::{LoopbackMesh, MeshDirectory};
use crate::network::protocol::BlockVote;
use crate::network::votes::BlockVoteRegistry;
use crate::node::balances::LedgerBalanceEngine;
use crate::node::chain::{FrozenLedger, BLOCK_DURATION_MS};
use crate::node::identity::NodeIdentity;
use crate::types::{Block, BlockHeight, Hash, Signature64, TimestampMs, VerifierId};
use std::sync::{Arc, Mutex};

pub const NOW: TimestampMs = 1_700_000_000_000;

/// A full consensus core over in-memory collaborators
pub struct TestNode {
    pub clock: Arc<ManualClock>,
    pub chain: Arc<FrozenLedger>,
    pub votes: Arc<BlockVoteRegistry>,
    pub mesh: Arc<LoopbackMesh>,
    pub pool: SharedPool,
    pub admission: Arc<Admission>,
    pub decider: VoteDecider,
    pub freezer: Freezer,
    pub fetcher: MissingBlockFetcher,
    pub identity: NodeIdentity,
}

impl TestNode {
    /// Node whose frozen edge sits at `frozen_edge`, with a voting pool of 8
    pub fn at_edge(frozen_edge: BlockHeight) -> Self {
        let clock = Arc::new(ManualClock::at(NOW));
        // Anchor genesis so the open edge comfortably covers the test heights
        let genesis = NOW - (frozen_edge as i64 + 50) * BLOCK_DURATION_MS;
        let chain = Arc::new(FrozenLedger::new(
            clock.clone(),
            genesis,
            frozen_edge,
            8,
            false,
        ));
        let registry = Arc::new(MeshDirectory::new(8));
        let identity = NodeIdentity::from_seed([42; 32]);
        let votes = Arc::new(BlockVoteRegistry::new(identity.verifier_id()));
        let mesh = Arc::new(LoopbackMesh::new());
        let pool: SharedPool = Arc::new(Mutex::new(CandidatePool::new()));

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
            mesh.clone(),
            admission.clone(),
        );

        Self {
            clock,
            chain,
            votes,
            mesh,
            pool,
            admission,
            decider,
            freezer,
            fetcher,
            identity,
        }
    }

    /// A valid, signed candidate whose balance commitment matches the engine
    pub fn candidate(&self, height: BlockHeight, cycle_gap: u64) -> Block {
        self.candidate_from(height, Hash::hash(b"parent"), cycle_gap, NOW - 7_000)
    }

    pub fn candidate_from(
        &self,
        height: BlockHeight,
        previous_hash: Hash,
        cycle_gap: u64,
        minimum_vote_timestamp: TimestampMs,
    ) -> Block {
        let mut block = Block {
            height,
            previous_hash,
            verification_timestamp: NOW - 7_000,
            minimum_vote_timestamp,
            balance_list_hash: Hash::ZERO,
            cycle_gap,
            verifier: self.identity.verifier_id(),
            signature: Signature64::zero(),
        };
        block.balance_list_hash = LedgerBalanceEngine::expected_hash(&block);
        self.identity.sign_block(&mut block);
        block
    }

    /// Register `count` distinct peer votes for a hash
    pub fn peer_votes(&self, height: BlockHeight, hash: Hash, count: u8) {
        for seed in 0..count {
            self.votes.register_vote(
                VerifierId::from_bytes([128 + seed; 32]),
                BlockVote {
                    height,
                    hash,
                    timestamp: NOW,
                },
            );
        }
    }

    pub fn pool_count(&self, height: BlockHeight) -> usize {
        crate::consensus::unfrozen::lock_pool(&self.pool).count_at(height)
    }

    pub fn pool_contains(&self, height: BlockHeight, hash: &Hash) -> bool {
        crate::consensus::unfrozen::lock_pool(&self.pool).contains(height, hash)
    }
}
