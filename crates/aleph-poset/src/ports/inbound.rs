//! Driving port: what an external caller (the arbiter, in `aleph-node`)
//! asks of the poset engine.

use crate::domain::{PosetError, Unit};
use aleph_types::{Hash, ProcessId};
use async_trait::async_trait;

/// Primary poset API. A single implementor owns the one `Poset` this
/// process mutates; callers never see partial mutation because insertion
/// is atomic per call.
#[async_trait]
pub trait PosetApi: Send + Sync {
    /// Verifies rule 1 (signature & hash) against the committee's
    /// recorded public key, then runs compliance (§4.3 rules 2-7) and, if
    /// it passes, admits the unit, deriving its level/floor/prime status.
    async fn insert_unit(&self, unit: Unit) -> Result<Hash, PosetError>;

    /// Read-only lookup by hash.
    async fn get_unit(&self, hash: Hash) -> Option<Unit>;

    /// `below(v, u)`.
    async fn below(&self, v: Hash, u: Hash) -> bool;

    /// This process's own maximal (most recent) unit hashes.
    async fn own_maximal(&self, creator: ProcessId) -> Vec<Hash>;

    /// Current count of units known in the poset.
    async fn len(&self) -> usize;

    /// Whether `creator` is a known forker.
    async fn is_forker(&self, creator: ProcessId) -> bool;

    /// Highest level reached by any prime unit admitted so far.
    async fn max_level(&self) -> u64;

    /// Prime unit hashes recorded at `level`, across all creators.
    async fn primes_at_level(&self, level: u64) -> Vec<Hash>;

    /// The level a not-yet-inserted unit would be assigned given
    /// `parents` (§4.2), used by unit creation to decide whether the unit
    /// it is about to sign will be prime before spending a coin share on
    /// it.
    async fn predict_level(&self, parents: Vec<Hash>) -> u64;

    /// Greedy parent selection (§4.4) for the next unit `creator` would
    /// create. `None` when `creator` has no maximal unit yet and the
    /// caller should create a genesis unit instead.
    async fn select_parents(&self, creator: ProcessId, max_parents: usize) -> Option<Vec<Hash>>;
}
