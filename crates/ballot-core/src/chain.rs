//! The ordered ledger: genesis, append, audit, search.
//!
//! `Chain` is not internally synchronized. Mutation goes through `&mut self`
//! (`append`, `block_mut`) and reads through `&self`, so within one thread the
//! borrow checker already enforces a single writer. To share a chain across
//! threads, wrap it in a `RwLock` and hold the write guard for the whole of
//! `append`, since mining runs inside that call.

use crate::{
    constants::{DEFAULT_DIFFICULTY, GENESIS_PREVIOUS_HASH},
    error::LedgerError,
    mine::mine_parallel,
    Block, Payload, VotePayload,
};
use serde::Serialize;
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MiningStrategy {
    #[default]
    Sequential,
    /// rayon-backed search; finds the same nonce as `Sequential`.
    Parallel,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChainConfig {
    pub difficulty: usize,
    pub mining: MiningStrategy,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            difficulty: DEFAULT_DIFFICULTY,
            mining: MiningStrategy::default(),
        }
    }
}

/// First problem found by [`Chain::verify`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IntegrityViolation {
    #[error("block 0 is not a genesis block anchored at \"0\"")]
    GenesisNotAnchored,
    #[error("block {index} hash mismatch: stored {stored}, recomputed {recomputed}")]
    HashMismatch {
        index: u64,
        stored: String,
        recomputed: String,
    },
    #[error("block {index} links to {found}, predecessor hash is {expected}")]
    BrokenLink {
        index: u64,
        expected: String,
        found: String,
    },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ChainStats {
    pub total_blocks: usize,
    pub total_votes: usize,
    pub difficulty: usize,
    pub latest_hash: String,
    pub is_valid: bool,
}

#[derive(Clone, Debug)]
pub struct Chain {
    blocks: Vec<Block>,
    config: ChainConfig,
}

impl Default for Chain {
    fn default() -> Self {
        Self::with_config(ChainConfig::default())
    }
}

impl Chain {
    /// Build a chain and mine its genesis block before returning.
    ///
    /// Mining is unbounded, so a difficulty above
    /// [`HASH_HEX_SIZE`](crate::constants::HASH_HEX_SIZE) never returns.
    pub fn new(difficulty: usize) -> Self {
        Self::with_config(ChainConfig {
            difficulty,
            ..ChainConfig::default()
        })
    }

    pub fn with_config(config: ChainConfig) -> Self {
        let mut chain = Self {
            blocks: Vec::with_capacity(1),
            config,
        };
        // Construction cannot fail; a pre-epoch clock anchors genesis at 0.0.
        let timestamp = unix_seconds(SystemTime::now()).unwrap_or_else(|err| {
            warn!(%err, "genesis stamped at the unix epoch");
            0.0
        });
        let mut genesis = Block::new(0, timestamp, Payload::genesis(), GENESIS_PREVIOUS_HASH, 0);
        chain.seal(&mut genesis);
        info!(
            difficulty = config.difficulty,
            nonce = genesis.nonce,
            hash = %genesis.hash,
            "genesis block mined"
        );
        chain.blocks.push(genesis);
        chain
    }

    pub fn difficulty(&self) -> usize {
        self.config.difficulty
    }

    pub fn config(&self) -> ChainConfig {
        self.config
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Always false: genesis exists from construction on.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn get(&self, index: u64) -> Option<&Block> {
        usize::try_from(index).ok().and_then(|i| self.blocks.get(i))
    }

    /// Out-of-band access to a stored block, for audit tooling. Nothing here
    /// re-seals the block; edits made through it are what [`Chain::verify`]
    /// reports.
    pub fn block_mut(&mut self, index: u64) -> Option<&mut Block> {
        usize::try_from(index).ok().and_then(|i| self.blocks.get_mut(i))
    }

    pub fn latest(&self) -> &Block {
        self.blocks
            .last()
            .expect("chain always holds its genesis block")
    }

    /// Stamp, link, mine and store a vote. Returns the sealed block.
    ///
    /// The payload and the clock are checked before any hashing; on error the
    /// chain is untouched.
    pub fn append(&mut self, vote: VotePayload) -> Result<Block, LedgerError> {
        self.append_at(vote, SystemTime::now())
    }

    fn append_at(&mut self, vote: VotePayload, clock: SystemTime) -> Result<Block, LedgerError> {
        vote.validate()?;

        let timestamp = unix_seconds(clock)?;
        let index = self.blocks.len() as u64;
        let previous_hash = self.latest().hash.clone();
        let mut block = Block::new(index, timestamp, vote.into_payload(timestamp), previous_hash, 0);
        self.seal(&mut block);

        info!(
            index,
            nonce = block.nonce,
            hash = %block.hash,
            "vote block appended"
        );
        self.blocks.push(block.clone());
        Ok(block)
    }

    /// Recompute every hash and check every link, stopping at the first failure.
    pub fn verify(&self) -> Result<(), IntegrityViolation> {
        let genesis = self
            .blocks
            .first()
            .ok_or(IntegrityViolation::GenesisNotAnchored)?;
        if genesis.index != 0
            || genesis.previous_hash != GENESIS_PREVIOUS_HASH
            || genesis.data.is_vote()
        {
            warn!("genesis block is not anchored");
            return Err(IntegrityViolation::GenesisNotAnchored);
        }
        check_hash(genesis)?;

        for pair in self.blocks.windows(2) {
            let (previous, current) = (&pair[0], &pair[1]);
            check_hash(current)?;
            if current.previous_hash != previous.hash {
                warn!(index = current.index, "broken link");
                return Err(IntegrityViolation::BrokenLink {
                    index: current.index,
                    expected: previous.hash.clone(),
                    found: current.previous_hash.clone(),
                });
            }
        }
        debug!(blocks = self.blocks.len(), "chain verified");
        Ok(())
    }

    pub fn is_valid(&self) -> bool {
        self.verify().is_ok()
    }

    /// Earliest vote block cast by `voter_id`.
    pub fn find(&self, voter_id: &str) -> Option<&Block> {
        self.blocks
            .iter()
            .find(|block| block.data.voter_id() == Some(voter_id))
    }

    /// Validity is recomputed on every call.
    pub fn stats(&self) -> ChainStats {
        ChainStats {
            total_blocks: self.blocks.len(),
            total_votes: self.blocks.iter().filter(|b| b.data.is_vote()).count(),
            difficulty: self.config.difficulty,
            latest_hash: self.latest().hash.clone(),
            is_valid: self.is_valid(),
        }
    }

    pub fn export(&self) -> Vec<Block> {
        self.blocks.clone()
    }

    fn seal(&self, block: &mut Block) {
        match self.config.mining {
            MiningStrategy::Sequential => {
                block.mine(self.config.difficulty);
            }
            MiningStrategy::Parallel => {
                mine_parallel(block, self.config.difficulty);
            }
        }
    }
}

fn check_hash(block: &Block) -> Result<(), IntegrityViolation> {
    let recomputed = block.content_hash();
    if block.hash != recomputed {
        warn!(index = block.index, "stored hash does not match block contents");
        return Err(IntegrityViolation::HashMismatch {
            index: block.index,
            stored: block.hash.clone(),
            recomputed,
        });
    }
    Ok(())
}

/// Seconds since the Unix epoch.
fn unix_seconds(clock: SystemTime) -> Result<f64, LedgerError> {
    clock
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .map_err(|err| LedgerError::Clock {
            behind: err.duration(),
        })
}
