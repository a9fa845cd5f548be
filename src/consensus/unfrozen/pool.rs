// Candidate pool - Bounded storage of admitted blocks per unfrozen height
//
// Blocks are keyed by (height, hash). Each height holds at most
// MAX_BLOCKS_PER_HEIGHT candidates outside the genesis cycle; over the cap,
// the worst-scored block is evicted, with ties keeping the newest insert.
// The operator override maps live behind the same lock as the pool because
// every consumer reads them in the same critical section.

use crate::consensus::config;
use crate::types::{Block, BlockHeight, Hash};
use std::collections::HashMap;
use tracing::debug;

/// Pool of admitted candidate blocks, plus the operator override maps
#[derive(Debug, Default)]
pub struct CandidatePool {
    /// Candidates by height, then by block hash
    unfrozen_blocks: HashMap<BlockHeight, HashMap<Hash, Block>>,

    /// Per-height freeze threshold percentages in [1, 99]
    threshold_overrides: HashMap<BlockHeight, u8>,

    /// Per-height forced vote hashes
    hash_overrides: HashMap<BlockHeight, Hash>,
}

impl CandidatePool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a block, evicting the worst-scored candidate at that height if
    /// the cap is exceeded and the node is not in the genesis cycle.
    pub fn register(&mut self, block: Block, frozen_edge: BlockHeight, in_genesis_cycle: bool) {
        let height = block.height;
        let hash = block.hash();
        let new_score = block.chain_score(frozen_edge);

        let blocks_at_height = self.unfrozen_blocks.entry(height).or_default();
        blocks_at_height.insert(hash, block);

        if blocks_at_height.len() > config::MAX_BLOCKS_PER_HEIGHT && !in_genesis_cycle {
            // Seed the scan with the just-inserted block: only a strictly
            // higher score displaces it, so the newcomer wins ties. This
            // keeps the retained set stable under repeated near-duplicates.
            let mut worst_hash = hash;
            let mut worst_score = new_score;
            for (block_hash, candidate) in blocks_at_height.iter() {
                let score = candidate.chain_score(frozen_edge);
                if score > worst_score {
                    worst_score = score;
                    worst_hash = *block_hash;
                }
            }

            blocks_at_height.remove(&worst_hash);
            debug!(
                "evicted block {} at height {} (score {})",
                worst_hash, height, worst_score
            );
        }
    }

    /// Whether a block with this hash is held at this height
    pub fn contains(&self, height: BlockHeight, hash: &Hash) -> bool {
        self.unfrozen_blocks
            .get(&height)
            .map(|blocks| blocks.contains_key(hash))
            .unwrap_or(false)
    }

    pub fn get(&self, height: BlockHeight, hash: &Hash) -> Option<Block> {
        self.unfrozen_blocks
            .get(&height)
            .and_then(|blocks| blocks.get(hash))
            .cloned()
    }

    /// Heights with at least one candidate (snapshot, ascending)
    pub fn heights(&self) -> Vec<BlockHeight> {
        let mut heights: Vec<BlockHeight> = self.unfrozen_blocks.keys().copied().collect();
        heights.sort_unstable();
        heights
    }

    pub fn count_at(&self, height: BlockHeight) -> usize {
        self.unfrozen_blocks
            .get(&height)
            .map(|blocks| blocks.len())
            .unwrap_or(0)
    }

    /// All candidates at a height (snapshot)
    pub fn blocks_at(&self, height: BlockHeight) -> Vec<Block> {
        self.unfrozen_blocks
            .get(&height)
            .map(|blocks| blocks.values().cloned().collect())
            .unwrap_or_default()
    }

    /// All candidates across heights (snapshot)
    pub fn all(&self) -> Vec<Block> {
        self.unfrozen_blocks
            .values()
            .flat_map(|blocks| blocks.values().cloned())
            .collect()
    }

    /// Drop every candidate with height at or below the new frozen edge
    pub fn purge_at_or_below(&mut self, height: BlockHeight) {
        self.unfrozen_blocks.retain(|&h, _| h > height);
    }

    /// Drop override entries with height at or below the new frozen edge
    pub fn purge_overrides_at_or_below(&mut self, height: BlockHeight) {
        self.threshold_overrides.retain(|&h, _| h > height);
        self.hash_overrides.retain(|&h, _| h > height);
    }

    /// Drop every candidate (debugging / resync); overrides are untouched
    pub fn clear(&mut self) {
        self.unfrozen_blocks.clear();
    }

    /// Set or remove a freeze threshold override. Zero removes the entry;
    /// values of 100 or more are silently ignored.
    pub fn set_threshold_override(&mut self, height: BlockHeight, percent: u8) {
        if percent == 0 {
            self.threshold_overrides.remove(&height);
        } else if percent < 100 {
            self.threshold_overrides.insert(height, percent);
        }
    }

    /// Set or remove a forced vote hash. The all-zero hash removes the entry.
    pub fn set_hash_override(&mut self, height: BlockHeight, hash: Hash) {
        if hash.is_zero() {
            self.hash_overrides.remove(&height);
        } else {
            self.hash_overrides.insert(height, hash);
        }
    }

    pub fn threshold_override(&self, height: BlockHeight) -> Option<u8> {
        self.threshold_overrides.get(&height).copied()
    }

    pub fn hash_override(&self, height: BlockHeight) -> Option<Hash> {
        self.hash_overrides.get(&height).copied()
    }

    /// Snapshot of the threshold overrides, for display
    pub fn threshold_overrides(&self) -> HashMap<BlockHeight, u8> {
        self.threshold_overrides.clone()
    }

    /// Snapshot of the hash overrides, for display
    pub fn hash_overrides(&self) -> HashMap<BlockHeight, Hash> {
        self.hash_overrides.clone()
    }
}
