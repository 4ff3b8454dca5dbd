//! Cross-cutting error kinds shared by more than one crate.
//!
//! Crate-specific error taxonomies (`PosetError`, `ConsensusError`,
//! `SyncError`, `CryptoError`) live in their own crates; this module only
//! holds the process-state enum used by the node's own health reporting.

use thiserror::Error;

/// Errors raised while decoding a committee configuration file.
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    #[error("committee size {size} is too small for threshold {threshold} (need threshold <= size)")]
    ThresholdExceedsCommittee { size: u16, threshold: u16 },

    #[error("committee size {size} does not satisfy N >= 3f+1 for any f >= 0")]
    DegenerateCommittee { size: u16 },

    #[error("own_id {own_id} is out of range for committee size {size}")]
    OwnIdOutOfRange { own_id: u16, size: u16 },

    #[error("missing public key for process {0}")]
    MissingPublicKey(u16),
}

/// Coarse operational state of a running process, surfaced for logging and
/// for an outer health-check layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeState {
    /// Scheduler tasks running normally.
    Running,
    /// Still catching up via sync after startup.
    Syncing,
    /// Cooperative shutdown in progress.
    ShuttingDown,
}
