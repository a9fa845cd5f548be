// Consensus - Unfrozen-block selection and freezing
// Principle: One block per height, agreed by a stable super-majority

pub mod bootstrap;
pub mod unfrozen;

use self::unfrozen::{FrozenChain, NodeRegistry};

/// Consensus configuration constants
pub mod config {
    /// Maximum candidates retained per unfrozen height (flood protection)
    pub const MAX_BLOCKS_PER_HEIGHT: usize = 500;

    /// Default freeze threshold, as a percentage of the voting pool
    pub const DEFAULT_FREEZE_THRESHOLD_PERCENT: u32 = 75;

    /// How long a leading hash may sit below 50% before we follow it anyway
    pub const CONSENSUS_FALLBACK_MS: i64 = 10_000;

    /// Pause between the two freeze checks
    pub const FREEZE_DWELL_MS: u64 = 500;

    /// Minimum spacing between a block's verification timestamp and its
    /// predecessor's (protocol-wide)
    pub const MINIMUM_VERIFICATION_INTERVAL_MS: i64 = 1_500;
}

/// The divisor used when translating vote counts into percentages: mesh size
/// during the genesis cycle, cycle length afterwards.
pub fn voting_pool_size(chain: &dyn FrozenChain, registry: &dyn NodeRegistry) -> u32 {
    if chain.in_genesis_cycle() {
        registry.mesh_size()
    } else {
        chain.current_cycle_length()
    }
}

/// Vote count a leader must strictly exceed before a freeze may proceed.
pub fn freeze_vote_threshold(pool_size: u32, override_percent: Option<u8>) -> u32 {
    match override_percent {
        Some(percent) => pool_size * percent as u32 / 100,
        None => pool_size * 3 / 4,
    }
}
