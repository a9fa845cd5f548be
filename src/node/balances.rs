// Balance engine - Recomputes the balance list a candidate block commits
//
// Transaction execution is outside this node; the ledger delta is summarized
// as a deterministic digest over the block's ancestry and producer. A block
// carrying any other commitment diverges here and is rejected by admission,
// which makes this recomputation the authoritative validity filter.

use crate::consensus::unfrozen::BalanceEngine;
use crate::types::{Block, Hash};

const BALANCE_LIST_DOMAIN: &[u8] = b"GLACIER_BALANCE_LIST_V1:";

/// Deterministic balance-list recomputation
pub struct LedgerBalanceEngine;

impl LedgerBalanceEngine {
    /// The balance-list hash an honest producer commits for this block
    pub fn expected_hash(block: &Block) -> Hash {
        let mut data = Vec::with_capacity(BALANCE_LIST_DOMAIN.len() + 32 + 8 + 32);
        data.extend_from_slice(BALANCE_LIST_DOMAIN);
        data.extend_from_slice(block.previous_hash.as_bytes());
        data.extend_from_slice(&block.height.to_le_bytes());
        data.extend_from_slice(block.verifier.as_bytes());
        Hash::hash(&data)
    }
}

impl BalanceEngine for LedgerBalanceEngine {
    fn balance_list_hash(&self, block: &Block, reasons: &mut String) -> Option<Hash> {
        // No parent commitment, no derivable list
        if block.height > 0 && block.previous_hash.is_zero() {
            reasons.push_str("no parent balance list for block; ");
            return None;
        }

        Some(Self::expected_hash(block))
    }
}
