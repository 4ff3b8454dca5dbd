//! Driving port: what the arbiter asks of the consensus engine once a
//! level's units are admitted into the poset.

use aleph_types::Hash;
use async_trait::async_trait;

/// Timing-unit election and linear-order extraction, driven level by
/// level as the poset grows.
#[async_trait]
pub trait ConsensusApi: Send + Sync {
    /// Attempts to elect a timing unit at `level`, given the seed hash
    /// that derives the canonical candidate order for this level (the
    /// hash of the previous level's timing unit, or a fixed genesis seed
    /// for level 0). Returns the newly ordered suffix of the linear order
    /// on election; an empty vec when the decision is still undetermined
    /// or `level` was already decided.
    async fn attempt_timing_decision(&self, level: u64, seed: Hash) -> Vec<Hash>;

    /// Highest level decided so far, if any.
    async fn decided_through(&self) -> Option<u64>;

    /// The full ordered prefix extracted so far, oldest first.
    async fn linear_order(&self) -> Vec<Hash>;

    /// Whether `hash` already appears in the linear order.
    async fn is_ordered(&self, hash: Hash) -> bool;

    /// The timing unit elected at `level`, if a decision has been reached.
    /// Unit creation uses this to derive the next level's candidate-order
    /// seed without re-deriving it from the linear order.
    async fn timing_unit_at(&self, level: u64) -> Option<Hash>;
}
