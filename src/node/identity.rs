// Node identity - The keypair this verifier signs blocks and votes with
use crate::types::{Block, Signature64, VerifierId};
use ed25519_dalek::{Signer, SigningKey};
use rand::rngs::OsRng;

/// The node's signing identity
pub struct NodeIdentity {
    signing_key: SigningKey,
    verifier: VerifierId,
}

impl NodeIdentity {
    /// Generate a fresh identity
    pub fn generate() -> Self {
        Self::from_signing_key(SigningKey::generate(&mut OsRng))
    }

    /// Identity from a 32-byte secret seed
    pub fn from_seed(seed: [u8; 32]) -> Self {
        Self::from_signing_key(SigningKey::from_bytes(&seed))
    }

    fn from_signing_key(signing_key: SigningKey) -> Self {
        let verifier = VerifierId::from_public_key(&signing_key.verifying_key());
        Self {
            signing_key,
            verifier,
        }
    }

    pub fn verifier_id(&self) -> VerifierId {
        self.verifier
    }

    /// Sign a block in place, setting its verifier to this identity
    pub fn sign_block(&self, block: &mut Block) {
        block.verifier = self.verifier;
        let signature = self.signing_key.sign(&block.signing_message());
        block.signature = Signature64::from_bytes(signature.to_bytes());
    }
}
