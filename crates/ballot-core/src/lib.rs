//! Append-only vote ledger sealed with proof-of-work.
pub mod canonical;
pub mod chain;
pub mod constants;
pub mod error;
pub mod mine;
pub mod receipt;

pub use chain::{Chain, ChainConfig, ChainStats, IntegrityViolation, MiningStrategy};
pub use error::LedgerError;
pub use receipt::{BlockRecord, VoteReceipt};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// What a block carries. Serialized with an internal `type` tag, e.g.
/// `{"type":"vote","voter_id":"V001","candidate":"Alice Johnson","timestamp":...}`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Payload {
    Genesis {
        message: String,
    },
    Vote {
        voter_id: String,
        candidate: String,
        timestamp: f64,
    },
}

impl Payload {
    pub fn genesis() -> Self {
        Payload::Genesis {
            message: constants::GENESIS_MESSAGE.to_string(),
        }
    }

    pub fn is_vote(&self) -> bool {
        matches!(self, Payload::Vote { .. })
    }

    pub fn voter_id(&self) -> Option<&str> {
        match self {
            Payload::Vote { voter_id, .. } => Some(voter_id),
            Payload::Genesis { .. } => None,
        }
    }
}

/// A vote as submitted by a collaborator, before the chain stamps and seals it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VotePayload {
    pub voter_id: String,
    pub candidate: String,
}

impl VotePayload {
    pub fn new(voter_id: impl Into<String>, candidate: impl Into<String>) -> Self {
        Self {
            voter_id: voter_id.into(),
            candidate: candidate.into(),
        }
    }

    pub fn validate(&self) -> Result<(), LedgerError> {
        if self.voter_id.trim().is_empty() {
            return Err(LedgerError::InvalidPayload("voter_id is required".into()));
        }
        if self.candidate.trim().is_empty() {
            return Err(LedgerError::InvalidPayload("candidate is required".into()));
        }
        Ok(())
    }

    pub(crate) fn into_payload(self, timestamp: f64) -> Payload {
        Payload::Vote {
            voter_id: self.voter_id,
            candidate: self.candidate,
            timestamp,
        }
    }
}

/// One sealed unit of the ledger. Serializes to the externally visible shape:
/// all six fields as plain values.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub index: u64,
    pub timestamp: f64,
    pub data: Payload,
    pub previous_hash: String,
    pub nonce: u64,
    pub hash: String,
}

/// Every field except `hash`. Key order is irrelevant, the canonical encoder sorts.
#[derive(Serialize)]
struct HashMaterial<'a> {
    index: u64,
    timestamp: f64,
    data: &'a Payload,
    previous_hash: &'a str,
    nonce: u64,
}

impl Block {
    /// Build an unmined block. `hash` is computed immediately and is provisional
    /// until [`Block::mine`] runs.
    ///
    /// `timestamp` must be finite. JSON cannot spell NaN or infinity, so a
    /// non-finite timestamp is hashed as `null`.
    pub fn new(
        index: u64,
        timestamp: f64,
        data: Payload,
        previous_hash: impl Into<String>,
        nonce: u64,
    ) -> Self {
        let mut block = Self {
            index,
            timestamp,
            data,
            previous_hash: previous_hash.into(),
            nonce,
            hash: String::new(),
        };
        block.hash = block.content_hash();
        block
    }

    pub fn content_hash(&self) -> String {
        self.hash_with_nonce(self.nonce)
    }

    /// Hash these fields as if `nonce` were stored. Used by the miners to try
    /// candidates without touching the block.
    pub fn hash_with_nonce(&self, nonce: u64) -> String {
        let material = HashMaterial {
            index: self.index,
            timestamp: self.timestamp,
            data: &self.data,
            previous_hash: &self.previous_hash,
            nonce,
        };
        let bytes = canonical::to_vec(&material)
            .expect("block fields always encode as JSON (string keys only)");
        hex::encode(Sha256::digest(&bytes))
    }

    /// Increment `nonce` until the hash starts with `difficulty` hex zeros. The
    /// current nonce is tried first, so difficulty 0 returns without mining.
    pub fn mine(&mut self, difficulty: usize) -> &str {
        while !pow::meets_difficulty(&self.hash, difficulty) {
            self.nonce = self.nonce.wrapping_add(1);
            self.hash = self.content_hash();
        }
        &self.hash
    }

    pub fn meets_difficulty(&self, difficulty: usize) -> bool {
        pow::meets_difficulty(&self.hash, difficulty)
    }

    /// Stored hash still matches the fields.
    pub fn is_sealed(&self) -> bool {
        self.hash == self.content_hash()
    }
}

pub mod pow {
    /// Number of leading `'0'` characters in a hex digest.
    pub fn leading_hex_zeros(hash: &str) -> usize {
        hash.bytes().take_while(|b| *b == b'0').count()
    }

    /// Character comparison on the hex text, not a numeric target. A digest
    /// shorter than `difficulty` never qualifies.
    pub fn meets_difficulty(hash: &str, difficulty: usize) -> bool {
        hash.len() >= difficulty && hash.as_bytes()[..difficulty].iter().all(|b| *b == b'0')
    }
}
