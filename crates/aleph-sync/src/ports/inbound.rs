//! Driving port: what the scheduler (`dispatch_syncs`, `start_listeners`
//! in `aleph-node`) asks of a sync session.

use crate::domain::SyncError;
use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncWrite};

/// Object-safe alias for a reliable, ordered byte stream, so sessions can
/// be driven over a real socket or, in tests, a `tokio::io::duplex` pair
/// without the session itself being generic.
pub trait DuplexStream: AsyncRead + AsyncWrite + Unpin + Send {}
impl<T: AsyncRead + AsyncWrite + Unpin + Send> DuplexStream for T {}

/// Tally of one completed sync, for logging and backpressure accounting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncOutcome {
    pub units_sent: usize,
    pub units_received: usize,
}

#[async_trait]
pub trait SyncApi: Send + Sync {
    /// Runs the three-step protocol as the initiator (A).
    async fn run_initiator(&self, stream: Box<dyn DuplexStream>) -> Result<SyncOutcome, SyncError>;

    /// Runs the three-step protocol as the responder (B).
    async fn run_responder(&self, stream: Box<dyn DuplexStream>) -> Result<SyncOutcome, SyncError>;
}
