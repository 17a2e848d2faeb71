use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// The payload is missing a field its tag requires. Raised before any hashing work.
    #[error("invalid payload: {0}")]
    InvalidPayload(String),
    #[error("system clock reads {behind:?} before the unix epoch")]
    Clock { behind: Duration },
}
