// Block vote registry - Tracks each verifier's latest vote per height
//
// One vote per voter per height; a re-vote replaces the earlier one. The
// leading hash is the one with the most distinct voters, ties broken by the
// smallest hash so every node reports the same leader for the same votes.

use crate::consensus::unfrozen::VoteRegistry;
use crate::network::protocol::BlockVote;
use crate::types::{BlockHeight, Hash, VerifierId};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use tracing::debug;

type VotesByHeight = HashMap<BlockHeight, HashMap<VerifierId, BlockVote>>;

/// In-memory vote registry
pub struct BlockVoteRegistry {
    local_identifier: VerifierId,
    votes: Mutex<VotesByHeight>,
}

impl BlockVoteRegistry {
    pub fn new(local_identifier: VerifierId) -> Self {
        Self {
            local_identifier,
            votes: Mutex::new(HashMap::new()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, VotesByHeight> {
        self.votes.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Drop votes for heights the chain has moved past
    pub fn purge_at_or_below(&self, height: BlockHeight) {
        self.lock().retain(|&h, _| h > height);
    }
}

impl VoteRegistry for BlockVoteRegistry {
    fn leading_hash(&self, height: BlockHeight) -> Option<(Hash, u32)> {
        let votes = self.lock();
        let at_height = votes.get(&height)?;

        let mut counts: HashMap<Hash, u32> = HashMap::new();
        for vote in at_height.values() {
            *counts.entry(vote.hash).or_insert(0) += 1;
        }

        counts
            .into_iter()
            .max_by(|(hash_a, count_a), (hash_b, count_b)| {
                // Most votes wins; the smaller hash wins ties
                count_a.cmp(count_b).then(hash_b.cmp(hash_a))
            })
    }

    fn local_vote(&self, height: BlockHeight) -> Option<Hash> {
        self.lock()
            .get(&height)
            .and_then(|at_height| at_height.get(&self.local_identifier))
            .map(|vote| vote.hash)
    }

    fn register_vote(&self, voter: VerifierId, vote: BlockVote) {
        debug!(
            "vote registered: {} -> {} at height {}",
            voter, vote.hash, vote.height
        );
        self.lock().entry(vote.height).or_default().insert(voter, vote);
    }

    fn heights(&self) -> Vec<BlockHeight> {
        let mut heights: Vec<BlockHeight> = self.lock().keys().copied().collect();
        heights.sort_unstable();
        heights
    }

    fn hashes_for(&self, height: BlockHeight) -> Vec<Hash> {
        let votes = self.lock();
        let mut hashes: Vec<Hash> = votes
            .get(&height)
            .map(|at_height| {
                let mut distinct: Vec<Hash> = at_height.values().map(|v| v.hash).collect();
                distinct.sort_unstable();
                distinct.dedup();
                distinct
            })
            .unwrap_or_default();
        hashes.sort_unstable();
        hashes
    }
}
