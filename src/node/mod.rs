// Node - Local collaborators wired around the consensus core

pub mod balances;
pub mod chain;
pub mod identity;
