// Tests module
// Consensus invariants: pool bounds, purge consistency, override lifecycle
// Freeze scenarios: end-to-end admission, voting, freezing, and bootstrap

pub mod support;

pub mod consensus_invariants;
