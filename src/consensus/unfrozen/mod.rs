// Unfrozen-block consensus core
//
// A verifier node observes candidate blocks proposed for heights just past
// the frozen chain tip. This module selects exactly one block per height to
// freeze, in cooperation with the mesh:
//
// 1. Admission filters observed candidates into the bounded pool
// 2. VoteDecider computes and broadcasts this node's vote for the first
//    unfrozen height
// 3. Freezer promotes a candidate once a super-majority holds through a dwell
// 4. MissingBlockFetcher retrieves blocks peers voted for but we do not hold
//
// The pool and both override maps share one mutex; every public operation is
// one critical section. The freeze dwell releases the lock while sleeping.

pub mod admission;
pub mod fetch;
pub mod freezer;
pub mod pool;
pub mod voting;

pub use admission::Admission;
pub use fetch::MissingBlockFetcher;
pub use freezer::Freezer;
pub use pool::CandidatePool;
pub use voting::VoteDecider;

use crate::network::protocol::BlockVote;
use crate::types::{Block, BlockHeight, Hash, TimestampMs, VerifierId};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{SystemTime, UNIX_EPOCH};

/// The candidate pool shared by the consensus workers
pub type SharedPool = Arc<Mutex<CandidatePool>>;

/// Acquire the pool lock; a poisoned lock is taken over as-is.
pub(crate) fn lock_pool(pool: &SharedPool) -> MutexGuard<'_, CandidatePool> {
    pool.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// View of the frozen chain (authoritative edge, freezing, cycle state)
pub trait FrozenChain: Send + Sync {
    /// Highest height already committed to the canonical chain
    fn frozen_edge_height(&self) -> BlockHeight;

    /// Upper bound on plausible block heights; `lenient` widens the horizon
    fn open_edge_height(&self, lenient: bool) -> BlockHeight;

    /// Whether the validator set is still derived from mesh membership
    fn in_genesis_cycle(&self) -> bool;

    /// Number of verifiers in the current cycle
    fn current_cycle_length(&self) -> u32;

    /// The block at the frozen edge, if one is held
    fn frozen_tip(&self) -> Option<Block>;

    /// Commit a block to the canonical chain
    fn freeze(&self, block: &Block);
}

/// Recomputes the balance list a candidate block claims to commit
pub trait BalanceEngine: Send + Sync {
    /// Returns the recomputed balance-list hash, or None when no list can be
    /// derived. Rejection reasons accumulate in `reasons` for diagnostics.
    fn balance_list_hash(&self, block: &Block, reasons: &mut String) -> Option<Hash>;
}

/// Stores peer block votes per height
pub trait VoteRegistry: Send + Sync {
    /// The hash with the most votes at a height, with its vote count
    fn leading_hash(&self, height: BlockHeight) -> Option<(Hash, u32)>;

    /// This node's registered vote at a height
    fn local_vote(&self, height: BlockHeight) -> Option<Hash>;

    /// Record a voter's latest vote
    fn register_vote(&self, voter: VerifierId, vote: BlockVote);

    /// Heights with at least one registered vote
    fn heights(&self) -> Vec<BlockHeight>;

    /// Distinct hashes voted for at a height
    fn hashes_for(&self, height: BlockHeight) -> Vec<Hash>;
}

/// Mesh membership view, used for genesis-cycle voting
pub trait NodeRegistry: Send + Sync {
    fn mesh_size(&self) -> u32;
}

/// Wall-clock milliseconds
pub trait Clock: Send + Sync {
    fn now_ms(&self) -> TimestampMs;
}

/// System wall clock
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> TimestampMs {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as TimestampMs)
            .unwrap_or(0)
    }
}
