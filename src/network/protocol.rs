// Protocol - Messages échangés entre vérifieurs du mesh
use crate::types::{Block, BlockHeight, Hash, TimestampMs};
use serde::{Deserialize, Serialize};

/// Maximum allowed message size for network deserialization
/// Prevents memory exhaustion from malicious large messages
pub const MAX_NETWORK_MESSAGE_SIZE: usize = 2 * 1024 * 1024; // 2 MB

/// Error type for protocol operations
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("Message too large: {size} bytes (max: {max})")]
    MessageTooLarge { size: usize, max: usize },

    #[error("Deserialization failed: {0}")]
    DeserializationFailed(String),

    #[error("Serialization failed: {0}")]
    SerializationFailed(String),
}

/// A verifier's vote for one candidate block at an unfrozen height
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockVote {
    /// Height the vote applies to
    pub height: BlockHeight,

    /// Hash of the endorsed candidate
    pub hash: Hash,

    /// When the vote was cast
    pub timestamp: TimestampMs,
}

/// Unicast request for a block a peer voted for but we do not hold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissingBlockRequest {
    pub height: BlockHeight,
    pub hash: Hash,
}

/// Answer to a missing-block request; the block may be absent
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MissingBlockResponse {
    pub block: Option<Block>,
}

/// A peer's answer to a joining node's frozen-tip query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BootstrapVote {
    /// Hash of the peer's frozen tip
    pub tip_hash: Hash,

    /// Height the joining node should start from
    pub start_height: BlockHeight,
}

/// Messages réseau
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum NetworkMessage {
    /// Nouveau bloc candidat
    NewBlock(Block),

    /// Vote pour un candidat
    BlockVote(BlockVote),

    /// Requête d'un bloc manquant
    MissingBlockRequest(MissingBlockRequest),

    /// Réponse avec bloc (ou absence)
    MissingBlockResponse(MissingBlockResponse),

    /// Requête du tip gelé (nœud en démarrage)
    BootstrapRequest,

    /// Réponse de tip gelé
    BootstrapVote(BootstrapVote),
}

impl NetworkMessage {
    /// Encode le message en bytes
    pub fn encode(&self) -> Result<Vec<u8>, ProtocolError> {
        bincode::serialize(self).map_err(|e| ProtocolError::SerializationFailed(e.to_string()))
    }

    /// Décode le message depuis bytes, taille vérifiée avant désérialisation
    pub fn decode(bytes: &[u8]) -> Result<Self, ProtocolError> {
        if bytes.len() > MAX_NETWORK_MESSAGE_SIZE {
            return Err(ProtocolError::MessageTooLarge {
                size: bytes.len(),
                max: MAX_NETWORK_MESSAGE_SIZE,
            });
        }

        bincode::deserialize(bytes).map_err(|e| ProtocolError::DeserializationFailed(e.to_string()))
    }
}
