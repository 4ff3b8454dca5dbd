//! The concrete `SyncApi`: drives the three-step protocol of §4.6 over a
//! `DuplexStream`, using `PosetSnapshot` for the summary/diff reads and
//! `UnitSink` to hand received units to the arbiter.

use crate::domain::PosetSummary;
use crate::ports::{DuplexStream, PosetSnapshot, SyncApi, SyncOutcome, UnitSink, UnitSource};
use crate::service::framing::{read_frame, write_frame};
use aleph_poset::Unit;
use aleph_types::ProcessId;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{info, instrument};

pub struct SyncSession<P, U> {
    poset: Arc<P>,
    sink: Arc<U>,
    peer: ProcessId,
}

impl<P, U> SyncSession<P, U>
where
    P: PosetSnapshot,
    U: UnitSink,
{
    pub fn new(poset: Arc<P>, sink: Arc<U>, peer: ProcessId) -> Self {
        SyncSession { poset, sink, peer }
    }

    async fn absorb(&self, units: Vec<Unit>) -> Result<usize, crate::domain::SyncError> {
        let mut received = 0;
        for unit in units {
            self.sink.submit(unit, UnitSource::Peer(self.peer)).await?;
            received += 1;
        }
        Ok(received)
    }
}

#[async_trait]
impl<P, U> SyncApi for SyncSession<P, U>
where
    P: PosetSnapshot + 'static,
    U: UnitSink + 'static,
{
    #[instrument(name = "sync_session", skip(self, stream), fields(peer = %self.peer, role = "initiator"))]
    async fn run_initiator(&self, mut stream: Box<dyn DuplexStream>) -> Result<SyncOutcome, crate::domain::SyncError> {
        let own_summary = self.poset.summary();
        write_frame(&mut *stream, &own_summary).await?;

        let remote_summary: PosetSummary = read_frame(&mut *stream).await?;
        let incoming: Vec<Unit> = read_frame(&mut *stream).await?;
        let received = self.absorb(incoming).await?;

        let outgoing = self.poset.units_missing_from(&remote_summary);
        let sent = outgoing.len();
        write_frame(&mut *stream, &outgoing).await?;

        info!(sent, received, "sync complete");
        Ok(SyncOutcome { units_sent: sent, units_received: received })
    }

    #[instrument(name = "sync_session", skip(self, stream), fields(peer = %self.peer, role = "responder"))]
    async fn run_responder(&self, mut stream: Box<dyn DuplexStream>) -> Result<SyncOutcome, crate::domain::SyncError> {
        let remote_summary: PosetSummary = read_frame(&mut *stream).await?;

        let own_summary = self.poset.summary();
        write_frame(&mut *stream, &own_summary).await?;

        let outgoing = self.poset.units_missing_from(&remote_summary);
        let sent = outgoing.len();
        write_frame(&mut *stream, &outgoing).await?;

        let incoming: Vec<Unit> = read_frame(&mut *stream).await?;
        let received = self.absorb(incoming).await?;

        info!(sent, received, "sync complete");
        Ok(SyncOutcome { units_sent: sent, units_received: received })
    }
}
