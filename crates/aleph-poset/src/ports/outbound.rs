//! Driven ports: what the poset service needs from its collaborators.

use aleph_types::{ProcessId, PublicKey};
use async_trait::async_trait;

/// Resolves a committee member's public key, used to verify rule 1
/// (signature & hash) before a unit is ever handed to `Poset::insert`.
pub trait CommitteeKeyProvider: Send + Sync {
    fn public_key(&self, creator: ProcessId) -> Option<PublicKey>;
}

/// Lifecycle events the poset service publishes for outer observers
/// (persistence, RPC) via `aleph-bus`. Kept as a narrow trait here so the
/// poset crate does not depend on the bus crate's wire types directly.
#[async_trait]
pub trait PosetEventSink: Send + Sync {
    async fn unit_inserted(&self, creator: ProcessId, hash: aleph_types::Hash, height: u64, level: u64);
    async fn forker_detected(&self, creator: ProcessId, first: aleph_types::Hash, second: aleph_types::Hash);
}

/// No-op sink for callers that do not care about lifecycle events (tests,
/// single-shot tools).
pub struct NullEventSink;

#[async_trait]
impl PosetEventSink for NullEventSink {
    async fn unit_inserted(&self, _: ProcessId, _: aleph_types::Hash, _: u64, _: u64) {}
    async fn forker_detected(&self, _: ProcessId, _: aleph_types::Hash, _: aleph_types::Hash) {}
}
