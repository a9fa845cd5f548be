// Block - Structure de bloc candidat minimal et auditable
use super::primitives::{BlockHeight, Hash, TimestampMs};
use super::signature::{domain_separate, Signature64, DOMAIN_BLOCK};
use super::verifier::VerifierId;
use serde::{Deserialize, Serialize};

/// Pénalité par hauteur de retard derrière le bord ouvert du pool
const HEIGHT_LAG_PENALTY: i64 = 20;

/// Bloc candidat proposé pour une hauteur non gelée
///
/// Immuable une fois construit. L'identifiant du bloc est le hash de son
/// contenu, signature exclue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Block {
    /// Hauteur du bloc
    pub height: BlockHeight,

    /// Hash du bloc précédent
    pub previous_hash: Hash,

    /// Moment où le vérifieur déclare avoir produit ce bloc
    pub verification_timestamp: TimestampMs,

    /// Moment le plus tôt où un vote honnête peut porter sur ce bloc
    pub minimum_vote_timestamp: TimestampMs,

    /// Hash de la liste de balances engagée par ce bloc
    pub balance_list_hash: Hash,

    /// Cycles écoulés depuis la dernière production du vérifieur
    pub cycle_gap: u64,

    /// Vérifieur qui a produit ce bloc
    pub verifier: VerifierId,

    /// Signature du vérifieur
    pub signature: Signature64,
}

impl Block {
    /// Hash du bloc (identifiant unique)
    pub fn hash(&self) -> Hash {
        // On exclut la signature du hash pour permettre la vérification
        let bytes = bincode::serialize(&(
            self.height,
            self.previous_hash,
            self.verification_timestamp,
            self.minimum_vote_timestamp,
            self.balance_list_hash,
            self.cycle_gap,
            self.verifier,
        ))
        .unwrap();
        Hash::hash(&bytes)
    }

    /// Crée le message à signer pour ce bloc (avec domain separation)
    pub fn signing_message(&self) -> Vec<u8> {
        let message = self.hash();
        domain_separate(DOMAIN_BLOCK, message.as_bytes())
    }

    /// Vérifie la signature du vérifieur
    pub fn signature_is_valid(&self) -> bool {
        let message = self.signing_message();
        self.verifier.verify(&message, self.signature.as_bytes())
    }

    /// Deterministic preference ordering over competing blocks. Lower scores
    /// are preferred. Blocks lagging behind the first unfrozen height pay a
    /// fixed penalty per height of lag; among blocks at the same height, the
    /// verifier furthest out of cycle order loses.
    pub fn chain_score(&self, frozen_edge_height: BlockHeight) -> i64 {
        let lag = self
            .height
            .saturating_sub(frozen_edge_height.saturating_add(1));
        (lag as i64)
            .saturating_mul(HEIGHT_LAG_PENALTY)
            .saturating_add(self.cycle_gap.min(i64::MAX as u64) as i64)
    }
}
