// Signature wrapper pour sérialisation
use serde::{Deserialize, Deserializer, Serialize, Serializer};

// =============================================================================
// Domain separation constants for signatures
// =============================================================================
//
// Domain separation prevents signature replay attacks between different
// contexts. Each signature type uses a unique prefix that is prepended to the
// message before signing/verification.
// =============================================================================

/// Domain separator for block signatures
/// Used when verifiers sign the blocks they produce
pub const DOMAIN_BLOCK: &[u8] = b"GLACIER_BLOCK_V1:";

/// Domain separator for block votes
/// Used when verifiers vote for a candidate at an unfrozen height
pub const DOMAIN_BLOCK_VOTE: &[u8] = b"GLACIER_BLOCK_VOTE_V1:";

/// Domain separator for bootstrap tip votes
/// Used when peers answer a joining node's frozen-tip query
pub const DOMAIN_BOOTSTRAP_VOTE: &[u8] = b"GLACIER_BOOTSTRAP_V1:";

/// Create a domain-separated message for signing
#[inline]
pub fn domain_separate(domain: &[u8], message: &[u8]) -> Vec<u8> {
    let mut separated = Vec::with_capacity(domain.len() + message.len());
    separated.extend_from_slice(domain);
    separated.extend_from_slice(message);
    separated
}

/// Wrapper pour signatures Ed25519 (64 bytes) avec sérialisation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Signature64(pub [u8; 64]);

impl Signature64 {
    pub fn from_bytes(bytes: [u8; 64]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 64] {
        &self.0
    }

    pub fn zero() -> Self {
        Self([0; 64])
    }
}

impl From<[u8; 64]> for Signature64 {
    fn from(bytes: [u8; 64]) -> Self {
        Self(bytes)
    }
}

impl AsRef<[u8]> for Signature64 {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

// Sérialisation manuelle
impl Serialize for Signature64 {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_bytes(&self.0)
    }
}

impl<'de> Deserialize<'de> for Signature64 {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let bytes = <Vec<u8>>::deserialize(deserializer)?;
        if bytes.len() != 64 {
            return Err(serde::de::Error::custom("Signature must be 64 bytes"));
        }
        let mut arr = [0u8; 64];
        arr.copy_from_slice(&bytes);
        Ok(Signature64(arr))
    }
}
