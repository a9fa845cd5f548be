// Freezer - Promotes the first unfrozen height once a super-majority holds
//
// A transiently dominant block must not be frozen: the vote is checked, the
// pass dwells half a second, and the vote is checked again. Only the same
// leader above threshold at both observations is promoted. The dwell runs
// with the pool lock released so admission and voting are not stalled.

use super::{lock_pool, FrozenChain, NodeRegistry, SharedPool, VoteRegistry};
use crate::consensus::{config, freeze_vote_threshold, voting_pool_size};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info};

/// Detects a stable super-majority and advances the frozen edge
pub struct Freezer {
    pool: SharedPool,
    chain: Arc<dyn FrozenChain>,
    votes: Arc<dyn VoteRegistry>,
    registry: Arc<dyn NodeRegistry>,
}

impl Freezer {
    pub fn new(
        pool: SharedPool,
        chain: Arc<dyn FrozenChain>,
        votes: Arc<dyn VoteRegistry>,
        registry: Arc<dyn NodeRegistry>,
    ) -> Self {
        Self {
            pool,
            chain,
            votes,
            registry,
        }
    }

    /// One freeze pass for `frozen_edge + 1`. Aborting is the normal case;
    /// the next tick retries.
    pub async fn attempt_freeze(&self) {
        let frozen_edge = self.chain.frozen_edge_height();
        let height = frozen_edge + 1;

        let (leading_hash, vote_count) = match self.votes.leading_hash(height) {
            Some(tally) => tally,
            None => return,
        };

        let override_percent = lock_pool(&self.pool).threshold_override(height);
        let pool_size = voting_pool_size(self.chain.as_ref(), self.registry.as_ref());
        let threshold = freeze_vote_threshold(pool_size, override_percent);
        if vote_count <= threshold {
            return;
        }

        // Dwell, lock released. Callers run this pass to completion; the
        // post-dwell recheck is never skipped.
        sleep(Duration::from_millis(config::FREEZE_DWELL_MS)).await;

        let (second_hash, second_count) = match self.votes.leading_hash(height) {
            Some(tally) => tally,
            None => return,
        };

        if second_count <= threshold || second_hash != leading_hash {
            debug!(
                "freeze pass aborted at height {}: leader moved or fell below threshold",
                height
            );
            return;
        }

        let mut pool = lock_pool(&self.pool);
        if let Some(block) = pool.get(height, &leading_hash) {
            self.chain.freeze(&block);

            // Reclaim inside the same critical section: nobody may observe a
            // frozen block that is still in the candidate pool
            let new_edge = self.chain.frozen_edge_height();
            if new_edge > frozen_edge {
                pool.purge_at_or_below(new_edge);
                pool.purge_overrides_at_or_below(new_edge);
                info!(
                    "🧊 Froze block {} at height {} ({} of {} votes)",
                    leading_hash, height, second_count, pool_size
                );
            }
        }
    }
}
