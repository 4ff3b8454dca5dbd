//! Poset service: the concrete `PosetApi` implementation. Performs rule 1
//! (signature & hash, §4.3) using the committee's public keys, then
//! delegates to `Poset::insert` for rules 2-7 and the level/floor/prime
//! derivation, and finally reports lifecycle events on the event sink.

use crate::domain::{PosetError, Unit};
use crate::ports::{CommitteeKeyProvider, PosetApi, PosetEventSink};
use crate::state::PosetState;
use aleph_types::{Hash, ProcessId};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

pub struct PosetService<K, E> {
    state: Arc<PosetState>,
    keys: Arc<K>,
    events: Arc<E>,
}

impl<K, E> PosetService<K, E>
where
    K: CommitteeKeyProvider,
    E: PosetEventSink,
{
    pub fn new(state: Arc<PosetState>, keys: Arc<K>, events: Arc<E>) -> Self {
        PosetService { state, keys, events }
    }

    fn verify_self_consistent(&self, unit: &Unit) -> Result<(), PosetError> {
        let Some(public_key) = self.keys.public_key(unit.creator()) else {
            return Err(PosetError::Malformed(unit.hash));
        };
        if unit.verify_self_consistent(&public_key) {
            Ok(())
        } else {
            Err(PosetError::Malformed(unit.hash))
        }
    }
}

#[async_trait]
impl<K, E> PosetApi for PosetService<K, E>
where
    K: CommitteeKeyProvider + 'static,
    E: PosetEventSink + 'static,
{
    #[instrument(skip(self, unit), fields(creator = %unit.creator(), height = unit.height()))]
    async fn insert_unit(&self, unit: Unit) -> Result<Hash, PosetError> {
        self.verify_self_consistent(&unit)?;

        let outcome = {
            let mut poset = self.state.poset.write();
            poset.insert(unit)?
        };

        debug!(level = outcome.level, prime = outcome.prime, "unit admitted into poset");

        let (creator, height) = {
            let poset = self.state.poset.read();
            poset
                .unit(&outcome.hash)
                .map(|u| (u.creator(), u.height()))
                .unwrap_or((ProcessId(0), 0))
        };

        self.events
            .unit_inserted(creator, outcome.hash, height, outcome.level)
            .await;

        if let (Some(forker), Some(partner)) = (outcome.newly_discovered_forker, outcome.fork_partner) {
            warn!(creator = %forker, "forker detected");
            self.events.forker_detected(forker, partner, outcome.hash).await;
        }

        Ok(outcome.hash)
    }

    async fn get_unit(&self, hash: Hash) -> Option<Unit> {
        self.state.poset.read().unit(&hash).cloned()
    }

    async fn below(&self, v: Hash, u: Hash) -> bool {
        self.state.poset.read().below(v, u)
    }

    async fn own_maximal(&self, creator: ProcessId) -> Vec<Hash> {
        self.state.poset.read().creator_maximal(creator).to_vec()
    }

    async fn len(&self) -> usize {
        self.state.poset.read().len()
    }

    async fn is_forker(&self, creator: ProcessId) -> bool {
        self.state.poset.read().is_forker(creator)
    }

    async fn max_level(&self) -> u64 {
        self.state.poset.read().max_level()
    }

    async fn primes_at_level(&self, level: u64) -> Vec<Hash> {
        self.state.poset.read().primes_at_level(level).to_vec()
    }

    async fn predict_level(&self, parents: Vec<Hash>) -> u64 {
        self.state.poset.read().compute_level(&parents)
    }

    async fn select_parents(&self, creator: ProcessId, max_parents: usize) -> Option<Vec<Hash>> {
        crate::domain::select_parents(&self.state.poset.read(), creator, max_parents)
    }
}
