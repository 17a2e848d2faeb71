pub const HASH_SIZE: usize = 32;
pub const HASH_HEX_SIZE: usize = HASH_SIZE * 2;
pub const DEFAULT_DIFFICULTY: usize = 4;
pub const GENESIS_PREVIOUS_HASH: &str = "0";
pub const GENESIS_MESSAGE: &str = "Genesis Block";
/// Nonces handed to rayon per round of the parallel search.
pub const NONCE_BATCH_SIZE: u64 = 1 << 14;
