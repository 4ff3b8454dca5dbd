//! Error taxonomy for the sync protocol: the transport and framing half
//! of §7's categories (Malformed, Transport). Non-compliant/orphan/fork
//! verdicts belong to the arbiter and surface here only as an opaque
//! rejection once a submitted unit comes back refused.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("transport error: {0}")]
    Transport(#[from] std::io::Error),

    #[error("frame of {0} bytes exceeds the {1}-byte limit")]
    FrameTooLarge(usize, usize),

    #[error("malformed frame: {0}")]
    Malformed(String),

    #[error("sync phase timed out")]
    Timeout,

    #[error("peer sent a unit the arbiter rejected; session aborted")]
    PeerMisbehaved,
}

pub type SyncResult<T> = Result<T, SyncError>;
