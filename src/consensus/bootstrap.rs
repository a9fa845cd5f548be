// Bootstrap tally - Frozen-tip election for a joining node
//
// A node with no chain state asks the mesh where the frozen edge is. Each
// peer answers with a (tip_hash, start_height) pair; the first answer from
// an identifier is binding, so a peer cannot skew the tally by re-voting as
// it learns more. Counts are kept in a BTreeMap so the winner scan is
// deterministic: strict comparison over sorted keys resolves ties to the
// smallest (hash, start_height).

use crate::types::{BlockHeight, Hash, VerifierId};
use std::collections::{BTreeMap, HashSet};

/// One tally per bootstrap attempt
#[derive(Debug)]
pub struct BootstrapTally {
    /// Height the tally was opened at; helpful for debugging
    block_height: BlockHeight,

    /// Identifiers whose vote has been recorded
    voters: HashSet<VerifierId>,

    /// Votes per (tip_hash, start_height) pair
    counts: BTreeMap<(Hash, BlockHeight), u32>,
}

impl BootstrapTally {
    pub fn new(block_height: BlockHeight) -> Self {
        Self {
            block_height,
            voters: HashSet::new(),
            counts: BTreeMap::new(),
        }
    }

    pub fn block_height(&self) -> BlockHeight {
        self.block_height
    }

    /// Record a peer's vote. Only the first vote from an identifier counts.
    pub fn vote(&mut self, voter: VerifierId, hash: Hash, start_height: BlockHeight) {
        if self.voters.insert(voter) {
            *self.counts.entry((hash, start_height)).or_insert(0) += 1;
        }
    }

    /// Total recorded votes across all pairs
    pub fn total_votes(&self) -> u32 {
        self.counts.values().sum()
    }

    /// The pair with the most votes, with its count. Ties resolve to the
    /// smallest (hash, start_height).
    pub fn winner(&self) -> Option<(Hash, BlockHeight, u32)> {
        let mut winner = None;
        let mut best = 0u32;
        for (&(hash, start_height), &count) in &self.counts {
            if count > best {
                best = count;
                winner = Some((hash, start_height, count));
            }
        }
        winner
    }
}
