// Admission - Gate between observed candidate blocks and the pool
//
// Rejections are the normal case under adversarial flood, so they return
// false without log noise. The balance-list recomputation is the
// authoritative filter for transaction-level validity: a block referencing
// invalid state diverges in balance-list hash and dies here.

use super::{lock_pool, BalanceEngine, FrozenChain, SharedPool};
use crate::consensus::config;
use crate::types::Block;
use std::sync::Arc;
use tracing::debug;

/// Validates and registers newly observed blocks
pub struct Admission {
    pool: SharedPool,
    chain: Arc<dyn FrozenChain>,
    balances: Arc<dyn BalanceEngine>,
}

impl Admission {
    pub fn new(
        pool: SharedPool,
        chain: Arc<dyn FrozenChain>,
        balances: Arc<dyn BalanceEngine>,
    ) -> Self {
        Self {
            pool,
            chain,
            balances,
        }
    }

    /// Admit a candidate into the pool. Returns false for anything not worth
    /// remembering: stale or implausible heights, bad signatures, duplicates,
    /// verification-interval violations, or balance-list divergence.
    pub fn admit(&self, block: Block) -> bool {
        let frozen_edge = self.chain.frozen_edge_height();

        // We should only be working one past the frozen edge, but accept up
        // to the open edge in case we have fallen behind.
        if block.height <= frozen_edge {
            return false;
        }
        if block.height > self.chain.open_edge_height(true) {
            return false;
        }
        if !block.signature_is_valid() {
            return false;
        }

        let hash = block.hash();
        let mut pool = lock_pool(&self.pool);

        if pool.contains(block.height, &hash) {
            return false;
        }

        // Verification-interval check. We cannot be sure of the timestamp,
        // but we can filter some invalid blocks when the predecessor is
        // known; an unknown predecessor skips the check and the later freeze
        // catches divergence.
        let previous = pool.get(block.height - 1, &block.previous_hash).or_else(|| {
            self.chain
                .frozen_tip()
                .filter(|tip| tip.height + 1 == block.height && tip.hash() == block.previous_hash)
        });
        if let Some(previous) = previous {
            if previous.verification_timestamp
                > block.verification_timestamp - config::MINIMUM_VERIFICATION_INTERVAL_MS
            {
                return false;
            }
        }

        let mut reasons = String::new();
        match self.balances.balance_list_hash(&block, &mut reasons) {
            Some(computed) if computed == block.balance_list_hash => {}
            Some(_) => {
                debug!(
                    "balance list mismatch for block {} at height {}",
                    hash, block.height
                );
                return false;
            }
            None => {
                debug!(
                    "balance list unavailable for block {} at height {}: {}",
                    hash, block.height, reasons
                );
                return false;
            }
        }

        pool.register(block, frozen_edge, self.chain.in_genesis_cycle());
        true
    }
}
