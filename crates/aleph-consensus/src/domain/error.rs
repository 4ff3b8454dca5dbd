//! Error taxonomy for timing-unit election and linear-order extraction
//! (§4.5).

use aleph_types::Hash;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConsensusError {
    #[error("level {0} has no prime units yet; election cannot proceed")]
    LevelNotReady(u64),

    #[error("candidate {0:?} is not a prime unit")]
    NotPrime(Hash),

    #[error("no threshold-coin share available for dealer at this (candidate, level)")]
    MissingCoinShare,

    #[error("threshold coin combination failed: {0}")]
    CoinError(String),

    #[error("level {0} was already decided; re-decision is a no-op")]
    AlreadyDecided(u64),
}

pub type ConsensusResult<T> = Result<T, ConsensusError>;
