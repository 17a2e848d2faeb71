use crate::{Block, Payload};
use serde::{Deserialize, Serialize};

/// What a voter keeps after casting: enough to look the vote up on the chain later.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VoteReceipt {
    pub voter_id: String,
    pub candidate: String,
    pub block_hash: String,
    pub block_index: u64,
    pub timestamp: f64,
}

impl VoteReceipt {
    /// `None` for anything that is not a vote block.
    pub fn from_block(block: &Block) -> Option<Self> {
        match &block.data {
            Payload::Vote {
                voter_id,
                candidate,
                ..
            } => Some(Self {
                voter_id: voter_id.clone(),
                candidate: candidate.clone(),
                block_hash: block.hash.clone(),
                block_index: block.index,
                timestamp: block.timestamp,
            }),
            Payload::Genesis { .. } => None,
        }
    }
}

/// Row a relational collaborator stores next to its own vote record.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BlockRecord {
    pub block_hash: String,
    pub previous_hash: String,
    pub timestamp: f64,
}

impl From<&Block> for BlockRecord {
    fn from(block: &Block) -> Self {
        Self {
            block_hash: block.hash.clone(),
            previous_hash: block.previous_hash.clone(),
            timestamp: block.timestamp,
        }
    }
}
