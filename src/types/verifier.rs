// Verifier - Identité d'un vérifieur dans le mesh
use ed25519_dalek::{Signature, Verifier, VerifyingKey};
use serde::{Deserialize, Serialize};
use std::fmt;

/// VerifierId = clé publique Ed25519 (32 bytes)
/// Principe: Pas d'identité, juste des clés
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct VerifierId([u8; 32]);

impl VerifierId {
    pub fn from_public_key(key: &VerifyingKey) -> Self {
        VerifierId(key.to_bytes())
    }

    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        VerifierId(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Vérifie une signature
    pub fn verify(&self, message: &[u8], signature: &[u8; 64]) -> bool {
        let public_key = match VerifyingKey::from_bytes(&self.0) {
            Ok(pk) => pk,
            Err(_) => return false,
        };

        let sig = Signature::from_bytes(signature);

        public_key.verify(message, &sig).is_ok()
    }
}

impl fmt::Display for VerifierId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "0x{}", hex::encode(&self.0[..8]))
    }
}

impl From<[u8; 32]> for VerifierId {
    fn from(bytes: [u8; 32]) -> Self {
        VerifierId(bytes)
    }
}
