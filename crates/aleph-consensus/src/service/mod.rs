//! Consensus service: the concrete `ConsensusApi` implementation. Reads
//! the shared poset (never mutates it), runs the election and
//! linear-order domain logic, and records the results in its own state.

use crate::domain::{elect_at_level, extend_to, ElectionOutcome, DEFAULT_MAX_ELECTION_DEPTH};
use crate::ports::{CoinProvider, ConsensusApi};
use crate::state::ConsensusState;
use aleph_poset::PosetState;
use aleph_types::Hash;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{info, instrument};

pub struct ConsensusService<C> {
    poset: Arc<PosetState>,
    state: Arc<ConsensusState>,
    coin: Arc<C>,
}

impl<C> ConsensusService<C>
where
    C: CoinProvider,
{
    pub fn new(poset: Arc<PosetState>, state: Arc<ConsensusState>, coin: Arc<C>) -> Self {
        ConsensusService { poset, state, coin }
    }
}

#[async_trait]
impl<C> ConsensusApi for ConsensusService<C>
where
    C: CoinProvider + 'static,
{
    #[instrument(skip(self))]
    async fn attempt_timing_decision(&self, level: u64, seed: Hash) -> Vec<Hash> {
        if self.state.decided.read().contains_key(&level) {
            return Vec::new();
        }

        let outcome = {
            let poset = self.poset.poset.read();
            let mut memo = self.state.popularity_memo.write();
            elect_at_level(
                &poset,
                self.coin.coin(),
                &mut memo,
                level,
                seed,
                DEFAULT_MAX_ELECTION_DEPTH,
            )
        };

        let ElectionOutcome::Elected(creator, timing_unit) = outcome else {
            return Vec::new();
        };
        info!(level, creator = %creator, "timing unit elected");
        self.state.decided.write().insert(level, (creator, timing_unit));

        let appended = {
            let poset = self.poset.poset.read();
            let already = self.state.ordered_set.read();
            extend_to(&poset, timing_unit, &already)
        };
        {
            let mut order = self.state.linear_order.write();
            let mut ordered_set = self.state.ordered_set.write();
            for hash in &appended {
                ordered_set.insert(*hash);
            }
            order.extend(appended.iter().copied());
        }
        appended
    }

    async fn decided_through(&self) -> Option<u64> {
        self.state.decided.read().keys().max().copied()
    }

    async fn linear_order(&self) -> Vec<Hash> {
        self.state.linear_order.read().clone()
    }

    async fn is_ordered(&self, hash: Hash) -> bool {
        self.state.ordered_set.read().contains(&hash)
    }

    async fn timing_unit_at(&self, level: u64) -> Option<Hash> {
        self.state.decided.read().get(&level).map(|(_, hash)| *hash)
    }
}

#[cfg(test)]
mod tests;
