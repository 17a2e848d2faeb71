use crate::{constants::NONCE_BATCH_SIZE, pow::meets_difficulty, Block};
use rayon::prelude::*;
use std::ops::RangeInclusive;
use tracing::debug;

/// Mines `block` by searching nonces in parallel, one batch at a time.
///
/// `find_first` keeps the search deterministic: the winning nonce is the first
/// one counting up from `block.nonce` (wrapping after `u64::MAX`) whose hash
/// meets `difficulty`, which is exactly what [`Block::mine`] would find
/// sequentially.
pub fn mine_parallel(block: &mut Block, difficulty: usize) -> &str {
    let mut start = block.nonce;
    loop {
        let batch = nonce_batch(start);
        let (first, last) = (*batch.start(), *batch.end());
        let template: &Block = block;
        let found = batch
            .into_par_iter()
            .find_first(|nonce| meets_difficulty(&template.hash_with_nonce(*nonce), difficulty));

        if let Some(nonce) = found {
            block.nonce = nonce;
            block.hash = block.hash_with_nonce(nonce);
            break;
        }
        debug!(block = block.index, first, last, "nonce batch exhausted");
        // After u64::MAX the search wraps to 0, like the sequential miner.
        start = last.wrapping_add(1);
    }
    &block.hash
}

/// The next `NONCE_BATCH_SIZE` nonces from `start`, cut short at `u64::MAX`.
fn nonce_batch(start: u64) -> RangeInclusive<u64> {
    start..=start.saturating_add(NONCE_BATCH_SIZE - 1)
}
