//! Driven ports: what a sync session needs from its collaborators. Read
//! access to the poset is modeled as its own narrow port (`PosetSnapshot`)
//! rather than routed through `aleph-poset`'s `PosetApi`, because summary
//! building and diffing (§4.6) are synchronous, CPU-bound reads (§5) that
//! have no business going through an async request/response round trip;
//! handing a *received* unit onward, by contrast, must go through the
//! arbiter's serialized queue, so that is its own async port (`UnitSink`).

use crate::domain::{hashes_missing_from, own_summary, PosetSummary};
use aleph_poset::{PosetState, Unit};
use aleph_types::{Hash, ProcessId};
use async_trait::async_trait;

/// Where a unit handed to the arbiter came from, for misbehaving-peer
/// bookkeeping (§7).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitSource {
    Local,
    Peer(ProcessId),
}

/// Read-only view of the poset a sync session needs: enough to build its
/// own summary and compute what a peer's summary shows them missing.
pub trait PosetSnapshot: Send + Sync {
    fn summary(&self) -> PosetSummary;
    fn units_missing_from(&self, remote: &PosetSummary) -> Vec<Unit>;
    fn contains(&self, hash: Hash) -> bool;
}

impl PosetSnapshot for PosetState {
    fn summary(&self) -> PosetSummary {
        own_summary(&self.poset.read())
    }

    fn units_missing_from(&self, remote: &PosetSummary) -> Vec<Unit> {
        let poset = self.poset.read();
        hashes_missing_from(&poset, remote)
            .into_iter()
            .filter_map(|h| poset.unit(&h).cloned())
            .collect()
    }

    fn contains(&self, hash: Hash) -> bool {
        self.poset.read().contains(&hash)
    }
}

/// Hands a unit received from a peer to the arbiter for compliance
/// checking and insertion. Returns once the arbiter has reached a
/// verdict; an `Err` means the unit (or the peer) was rejected, and the
/// session aborts per §4.6.
#[async_trait]
pub trait UnitSink: Send + Sync {
    async fn submit(&self, unit: Unit, source: UnitSource) -> Result<(), crate::domain::SyncError>;
}
