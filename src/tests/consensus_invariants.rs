// Consensus invariants
//
// Pool bounds, admitted-block visibility, and purge consistency, driven
// through the real admission/freezer surfaces rather than the pool directly.

use super::support::TestNode;
use crate::consensus::config;
use crate::consensus::unfrozen::{lock_pool, FrozenChain};
use crate::types::Hash;

// An admitted block stays visible at (height, hash) until its height falls
// at or below the frozen edge
#[tokio::test]
async fn admitted_blocks_visible_until_frozen() {
    let node = TestNode::at_edge(100);

    let b1 = node.candidate(101, 1);
    let b2 = node.candidate(102, 1);
    let b1_hash = b1.hash();
    let b2_hash = b2.hash();

    assert!(node.admission.admit(b1));
    assert!(node.admission.admit(b2));
    assert!(node.pool_contains(101, &b1_hash));
    assert!(node.pool_contains(102, &b2_hash));

    // Freeze 101 with a stable super-majority
    node.peer_votes(101, b1_hash, 7);
    node.freezer.attempt_freeze().await;
    assert_eq!(node.chain.frozen_edge_height(), 101);

    // b1's height is now at the edge and it is gone from the pool; b2 is
    // still above the edge and still visible
    assert!(!node.pool_contains(101, &b1_hash));
    assert!(node.pool_contains(102, &b2_hash));
}

// The per-height cap holds at every observation point under flood
#[test]
fn pool_bounded_under_flood() {
    let node = TestNode::at_edge(100);

    for gap in 0..(config::MAX_BLOCKS_PER_HEIGHT + 20) {
        let block = node.candidate(101, gap as u64);
        node.admission.admit(block);
        assert!(node.pool_count(101) <= config::MAX_BLOCKS_PER_HEIGHT);
    }

    assert_eq!(node.pool_count(101), config::MAX_BLOCKS_PER_HEIGHT);
}

// After a freeze-and-purge completes, no query returns a block at or below
// the frozen edge
#[tokio::test]
async fn no_frozen_height_survives_purge() {
    let node = TestNode::at_edge(100);

    let keeper = node.candidate(101, 0);
    let keeper_hash = keeper.hash();
    let straggler = node.candidate(102, 0);
    assert!(node.admission.admit(keeper));
    assert!(node.admission.admit(straggler));

    node.peer_votes(101, keeper_hash, 7);
    node.freezer.attempt_freeze().await;
    assert_eq!(node.chain.frozen_edge_height(), 101);

    let guard = lock_pool(&node.pool);
    assert!(guard.get(101, &keeper_hash).is_none());
    assert!(guard.blocks_at(101).is_empty());
    assert!(guard.all().iter().all(|b| b.height > 101));
    assert!(guard.heights().iter().all(|&h| h > 101));
}

// Operator override lifecycle: set, read back, remove via the sentinels
#[test]
fn override_lifecycle_law() {
    let node = TestNode::at_edge(100);
    let forced = Hash::hash(b"forced-choice");

    {
        let mut guard = lock_pool(&node.pool);
        guard.set_hash_override(107, forced);
        guard.set_threshold_override(107, 66);
    }

    {
        let guard = lock_pool(&node.pool);
        assert_eq!(guard.hash_overrides().get(&107), Some(&forced));
        assert_eq!(guard.threshold_overrides().get(&107), Some(&66));
    }

    {
        let mut guard = lock_pool(&node.pool);
        guard.set_hash_override(107, Hash::ZERO);
        guard.set_threshold_override(107, 0);
    }

    let guard = lock_pool(&node.pool);
    assert!(!guard.hash_overrides().contains_key(&107));
    assert!(!guard.threshold_overrides().contains_key(&107));
}

// purge() clears candidates for a resync but leaves the frozen edge and the
// operator overrides alone
#[test]
fn debug_purge_clears_pool_only() {
    let node = TestNode::at_edge(100);

    let block = node.candidate(101, 0);
    assert!(node.admission.admit(block));
    {
        let mut guard = lock_pool(&node.pool);
        guard.set_threshold_override(102, 60);
        guard.clear();
    }

    assert_eq!(node.pool_count(101), 0);
    assert_eq!(node.chain.frozen_edge_height(), 100);
    assert_eq!(
        lock_pool(&node.pool).threshold_override(102),
        Some(60)
    );
}
