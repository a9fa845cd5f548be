// Types fondamentaux de Glacier
// Principe: Minimal, auditable, durable

pub mod block;
pub mod primitives;
pub mod signature;
pub mod verifier;

pub use block::*;
pub use primitives::*;
pub use signature::*;
pub use verifier::*;
