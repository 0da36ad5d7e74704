use crate::error::StakeError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stake balance in base units. u128 leaves headroom far beyond any
/// realistic total stake, so arithmetic saturates instead of wrapping.
pub type Balance = u128;

/// Amount as submitted at the operation boundary. Signed so that zero and
/// negative submissions reach the ledger and fail with a precise error
/// instead of dying in parsing.
pub type RawAmount = i128;

/// Chain block height. Non-decreasing; the ledger's only notion of time.
pub type BlockHeight = u64;

/// Raw configured delay in blocks. Signed so a negative value can be
/// rejected eagerly at construction rather than wrapping.
pub type BlockDelay = i64;

// ── ParticipantId ────────────────────────────────────────────────────────────

/// 32-byte participant identifier.
///
/// The ledger treats this as an opaque key; how identities are issued is
/// upstream infrastructure. Base-58 is the canonical string form.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ParticipantId(pub [u8; 32]);

impl ParticipantId {
    pub fn from_bytes(b: [u8; 32]) -> Self {
        Self(b)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Deterministic id from a human-readable label: BLAKE3(label).
    /// Devnet and test convenience.
    pub fn from_label(label: &str) -> Self {
        Self(*blake3::hash(label.as_bytes()).as_bytes())
    }

    /// Base-58 encoded string representation.
    pub fn to_b58(&self) -> String {
        bs58::encode(&self.0).into_string()
    }

    pub fn from_b58(s: &str) -> Result<Self, StakeError> {
        let bytes = bs58::decode(s)
            .into_vec()
            .map_err(|e| StakeError::InvalidParticipantId(e.to_string()))?;
        if bytes.len() != 32 {
            return Err(StakeError::InvalidParticipantId(format!(
                "expected 32 bytes, got {}",
                bytes.len()
            )));
        }
        let mut arr = [0u8; 32];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_b58())
    }
}

impl fmt::Debug for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ParticipantId({}…)", &self.to_b58()[..8])
    }
}
