//! Mutable state private to the consensus engine: the popularity-proof
//! memoization table, per-level decisions, and the linear-order prefix.
//! Distinct from `aleph-poset`'s own state (shared separately, read-only
//! from here).

use aleph_types::{Hash, ProcessId};
use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};

pub struct ConsensusState {
    pub popularity_memo: RwLock<HashMap<(Hash, Hash), bool>>,
    pub decided: RwLock<HashMap<u64, (ProcessId, Hash)>>,
    pub linear_order: RwLock<Vec<Hash>>,
    pub ordered_set: RwLock<HashSet<Hash>>,
}

impl ConsensusState {
    pub fn new() -> Self {
        ConsensusState {
            popularity_memo: RwLock::new(HashMap::new()),
            decided: RwLock::new(HashMap::new()),
            linear_order: RwLock::new(Vec::new()),
            ordered_set: RwLock::new(HashSet::new()),
        }
    }
}

impl Default for ConsensusState {
    fn default() -> Self {
        Self::new()
    }
}
