// Frozen ledger - In-memory view of the canonical chain
//
// Persistence is out of scope for this node; the ledger tracks the frozen
// edge, the tip block, and the cycle state the consensus workers consult.
// The open edge is derived from elapsed wall-clock time since genesis.

use crate::consensus::unfrozen::{Clock, FrozenChain};
use crate::types::{Block, BlockHeight, TimestampMs};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{info, warn};

/// Target spacing between consecutive blocks
pub const BLOCK_DURATION_MS: i64 = 7_000;

/// Extra horizon granted by the lenient open-edge computation
const OPEN_EDGE_LENIENCY_MS: i64 = 10_000;

struct LedgerState {
    frozen_edge_height: BlockHeight,
    frozen_tip: Option<Block>,
    cycle_length: u32,
    genesis_cycle: bool,
}

/// In-memory frozen chain
pub struct FrozenLedger {
    clock: Arc<dyn Clock>,
    genesis_timestamp: TimestampMs,
    state: Mutex<LedgerState>,
}

impl FrozenLedger {
    /// Ledger starting at a given frozen edge. `genesis_timestamp` anchors
    /// the open-edge computation.
    pub fn new(
        clock: Arc<dyn Clock>,
        genesis_timestamp: TimestampMs,
        frozen_edge_height: BlockHeight,
        cycle_length: u32,
        genesis_cycle: bool,
    ) -> Self {
        Self {
            clock,
            genesis_timestamp,
            state: Mutex::new(LedgerState {
                frozen_edge_height,
                frozen_tip: None,
                cycle_length,
                genesis_cycle,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, LedgerState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Record the tip block without advancing the edge (startup sync)
    pub fn set_frozen_tip(&self, block: Block) {
        let mut state = self.lock();
        state.frozen_edge_height = block.height;
        state.frozen_tip = Some(block);
    }

    pub fn set_cycle_length(&self, cycle_length: u32) {
        self.lock().cycle_length = cycle_length;
    }

    pub fn leave_genesis_cycle(&self) {
        self.lock().genesis_cycle = false;
    }
}

impl FrozenChain for FrozenLedger {
    fn frozen_edge_height(&self) -> BlockHeight {
        self.lock().frozen_edge_height
    }

    fn open_edge_height(&self, lenient: bool) -> BlockHeight {
        let leniency = if lenient { OPEN_EDGE_LENIENCY_MS } else { 0 };
        let elapsed = self.clock.now_ms() + leniency - self.genesis_timestamp;
        if elapsed <= 0 {
            0
        } else {
            (elapsed / BLOCK_DURATION_MS) as BlockHeight
        }
    }

    fn in_genesis_cycle(&self) -> bool {
        self.lock().genesis_cycle
    }

    fn current_cycle_length(&self) -> u32 {
        self.lock().cycle_length
    }

    fn frozen_tip(&self) -> Option<Block> {
        self.lock().frozen_tip.clone()
    }

    fn freeze(&self, block: &Block) {
        let mut state = self.lock();
        if block.height != state.frozen_edge_height + 1 {
            warn!(
                "refusing to freeze block #{} against edge {}",
                block.height, state.frozen_edge_height
            );
            return;
        }

        state.frozen_edge_height = block.height;
        state.frozen_tip = Some(block.clone());
        info!("🧊 Frozen edge advanced to #{} ({})", block.height, block.hash());
    }
}
