// Vote decider - Computes and broadcasts this node's vote each tick
//
// Only the first height past the frozen edge is voted on. The decision
// cascades: operator override, then consensus-follow (majority or the
// ten-second fallback), then independent choice by lowest chain score. A new
// vote is broadcast only when it differs from the previous one.

use super::{lock_pool, Clock, FrozenChain, NodeRegistry, SharedPool, VoteRegistry};
use crate::consensus::{config, voting_pool_size};
use crate::network::mesh::MeshTransport;
use crate::network::protocol::BlockVote;
use crate::types::{Block, BlockHeight, Hash, VerifierId};
use std::sync::Arc;
use tracing::info;

/// Chooses the block this node endorses at the first unfrozen height
pub struct VoteDecider {
    pool: SharedPool,
    chain: Arc<dyn FrozenChain>,
    votes: Arc<dyn VoteRegistry>,
    mesh: Arc<dyn MeshTransport>,
    registry: Arc<dyn NodeRegistry>,
    clock: Arc<dyn Clock>,
    identity: VerifierId,
}

impl VoteDecider {
    pub fn new(
        pool: SharedPool,
        chain: Arc<dyn FrozenChain>,
        votes: Arc<dyn VoteRegistry>,
        mesh: Arc<dyn MeshTransport>,
        registry: Arc<dyn NodeRegistry>,
        clock: Arc<dyn Clock>,
        identity: VerifierId,
    ) -> Self {
        Self {
            pool,
            chain,
            votes,
            mesh,
            registry,
            clock,
            identity,
        }
    }

    /// Recompute the vote for `frozen_edge + 1`; broadcast on change
    pub fn tick(&self) {
        let frozen_edge = self.chain.frozen_edge_height();
        let height = frozen_edge + 1;

        let new_vote_hash = {
            let pool = lock_pool(&self.pool);
            let blocks = pool.blocks_at(height);
            if blocks.is_empty() {
                return;
            }

            if let Some(forced) = pool.hash_override(height) {
                // An operator override always wins
                Some(forced)
            } else {
                self.consensus_vote(&blocks, height, frozen_edge)
            }
        };

        if let Some(new_vote_hash) = new_vote_hash {
            if self.votes.local_vote(height) != Some(new_vote_hash) {
                self.cast_vote(height, new_vote_hash);
            }
        }
    }

    /// Consensus-follow path, then independent choice
    fn consensus_vote(
        &self,
        blocks: &[Block],
        height: BlockHeight,
        frozen_edge: BlockHeight,
    ) -> Option<Hash> {
        let now = self.clock.now_ms();
        let mut vote_block: Option<Block> = None;

        // Follow the leading hash if it holds a majority and its block may be
        // voted for yet, or if it has been voteable for more than ten seconds
        // without crossing 50%. The fallback lets the mesh converge even when
        // no hash reaches majority.
        if let Some((leader_hash, vote_count)) = self.votes.leading_hash(height) {
            if let Some(leader) = blocks.iter().find(|b| b.hash() == leader_hash) {
                let pool_size = voting_pool_size(self.chain.as_ref(), self.registry.as_ref());
                let majority =
                    vote_count > pool_size / 2 && leader.minimum_vote_timestamp <= now;
                let fallback =
                    leader.minimum_vote_timestamp < now - config::CONSENSUS_FALLBACK_MS;
                if majority || fallback {
                    vote_block = Some(leader.clone());
                }
            }
        }

        // No agreement to follow: independently choose the block we think is
        // best, gated on its minimum vote timestamp
        if vote_block.is_none() {
            let lowest = blocks
                .iter()
                .min_by_key(|b| b.chain_score(frozen_edge))
                .cloned();
            if let Some(candidate) = lowest {
                if candidate.minimum_vote_timestamp <= now {
                    vote_block = Some(candidate);
                }
            }
        }

        vote_block.map(|b| b.hash())
    }

    /// Register the vote locally and send it to the mesh
    fn cast_vote(&self, height: BlockHeight, hash: Hash) {
        let vote = BlockVote {
            height,
            hash,
            timestamp: self.clock.now_ms(),
        };
        self.votes.register_vote(self.identity, vote);
        info!("🗳️  Voting for {} at height {}", hash, height);
        self.mesh.broadcast_vote(vote);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consensus::unfrozen::testing::ManualClock;
    use crate::consensus::unfrozen::CandidatePool;
    use crate::network::mesh::{LoopbackMesh, MeshDirectory};
    use crate::network::votes::BlockVoteRegistry;
    use crate::node::chain::FrozenLedger;
    use crate::types::{Signature64, TimestampMs};
    use std::sync::Mutex;

    const NOW: TimestampMs = 1_700_000_000_000;

    struct Fixture {
        decider: VoteDecider,
        pool: SharedPool,
        votes: Arc<BlockVoteRegistry>,
        mesh: Arc<LoopbackMesh>,
        clock: Arc<ManualClock>,
    }

    fn fixture() -> Fixture {
        let clock = Arc::new(ManualClock::at(NOW));
        let pool: SharedPool = Arc::new(Mutex::new(CandidatePool::new()));
        let local = VerifierId::from_bytes([9; 32]);
        let votes = Arc::new(BlockVoteRegistry::new(local));
        let mesh = Arc::new(LoopbackMesh::new());
        let chain = Arc::new(FrozenLedger::new(clock.clone(), 0, 100, 8, false));
        let registry = Arc::new(MeshDirectory::new(8));

        let decider = VoteDecider::new(
            pool.clone(),
            chain,
            votes.clone(),
            mesh.clone(),
            registry,
            clock.clone(),
            local,
        );

        Fixture {
            decider,
            pool,
            votes,
            mesh,
            clock,
        }
    }

    fn make_block(seed: u8, cycle_gap: u64, minimum_vote_timestamp: TimestampMs) -> Block {
        Block {
            height: 101,
            previous_hash: Hash::hash(b"parent"),
            verification_timestamp: NOW - 7_000,
            minimum_vote_timestamp,
            balance_list_hash: Hash::ZERO,
            cycle_gap,
            verifier: VerifierId::from_bytes([seed; 32]),
            signature: Signature64::zero(),
        }
    }

    fn insert(fixture: &Fixture, block: &Block) {
        lock_pool(&fixture.pool).register(block.clone(), 100, false);
    }

    fn peer_votes(fixture: &Fixture, hash: Hash, voters: std::ops::Range<u8>) {
        for seed in voters {
            fixture.votes.register_vote(
                VerifierId::from_bytes([100 + seed; 32]),
                BlockVote {
                    height: 101,
                    hash,
                    timestamp: NOW,
                },
            );
        }
    }

    #[test]
    fn test_no_blocks_no_vote() {
        let fx = fixture();
        fx.decider.tick();
        assert!(fx.mesh.broadcasts().is_empty());
    }

    #[test]
    fn test_override_short_circuits() {
        let fx = fixture();
        let forced = Hash::from_bytes([0x11; 32]);

        // A low-scored candidate sits in the pool, but the override wins
        let candidate = make_block(1, 5, NOW - 60_000);
        insert(&fx, &candidate);
        lock_pool(&fx.pool).set_hash_override(101, forced);

        fx.decider.tick();

        let broadcast = fx.mesh.last_broadcast().unwrap();
        assert_eq!(broadcast.hash, forced);
        assert_ne!(broadcast.hash, candidate.hash());
        assert_eq!(fx.votes.local_vote(101), Some(forced));
    }

    #[test]
    fn test_follows_majority_leader() {
        let fx = fixture();
        let leader = make_block(1, 7, NOW - 1_000);
        let better = make_block(2, 0, NOW - 1_000);
        insert(&fx, &leader);
        insert(&fx, &better);

        // 5 of 8 voters back the worse-scored block: follow the mesh anyway
        peer_votes(&fx, leader.hash(), 0..5);
        fx.decider.tick();

        assert_eq!(fx.mesh.last_broadcast().unwrap().hash, leader.hash());
    }

    #[test]
    fn test_majority_gated_on_vote_timestamp() {
        let fx = fixture();
        let leader = make_block(1, 7, NOW + 60_000);
        insert(&fx, &leader);

        peer_votes(&fx, leader.hash(), 0..5);
        fx.decider.tick();

        // The leader may not be voted for yet, and neither may anything else
        assert!(fx.mesh.broadcasts().is_empty());
    }

    #[test]
    fn test_ten_second_fallback() {
        let fx = fixture();
        let leader = make_block(1, 7, NOW - 11_000);
        let better = make_block(2, 0, NOW - 11_000);
        insert(&fx, &leader);
        insert(&fx, &better);

        // 3 of 8 is far from majority, but the leader has been voteable for
        // more than ten seconds
        peer_votes(&fx, leader.hash(), 0..3);
        fx.decider.tick();

        assert_eq!(fx.mesh.last_broadcast().unwrap().hash, leader.hash());
    }

    #[test]
    fn test_independent_choice_lowest_score() {
        let fx = fixture();
        let worse = make_block(1, 9, NOW - 1_000);
        let best = make_block(2, 1, NOW - 1_000);
        insert(&fx, &worse);
        insert(&fx, &best);

        fx.decider.tick();

        assert_eq!(fx.mesh.last_broadcast().unwrap().hash, best.hash());
    }

    #[test]
    fn test_independent_choice_waits_for_timestamp() {
        let fx = fixture();
        let best = make_block(1, 0, NOW + 5_000);
        insert(&fx, &best);

        fx.decider.tick();
        assert!(fx.mesh.broadcasts().is_empty());

        fx.clock.advance(5_000);
        fx.decider.tick();
        assert_eq!(fx.mesh.last_broadcast().unwrap().hash, best.hash());
    }

    #[test]
    fn test_unchanged_vote_not_rebroadcast() {
        let fx = fixture();
        let best = make_block(1, 0, NOW - 1_000);
        insert(&fx, &best);

        fx.decider.tick();
        fx.decider.tick();
        fx.decider.tick();

        assert_eq!(fx.mesh.broadcasts().len(), 1);
    }

    #[test]
    fn test_vote_changes_follow_the_mesh() {
        let fx = fixture();
        let ours = make_block(1, 0, NOW - 1_000);
        let theirs = make_block(2, 5, NOW - 1_000);
        insert(&fx, &ours);
        insert(&fx, &theirs);

        // First tick: independent choice
        fx.decider.tick();
        assert_eq!(fx.mesh.last_broadcast().unwrap().hash, ours.hash());

        // The mesh disagrees with us; switch and rebroadcast
        peer_votes(&fx, theirs.hash(), 0..5);
        fx.decider.tick();

        assert_eq!(fx.mesh.broadcasts().len(), 2);
        assert_eq!(fx.mesh.last_broadcast().unwrap().hash, theirs.hash());
    }
}
