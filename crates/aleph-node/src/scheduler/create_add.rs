//! `create_add`: on every tick, builds this process's next unit — greedy
//! parents, a batch of pending transactions, and any coin shares this
//! unit's (predicted) level lets it usefully attach — signs it, and hands
//! it to the arbiter exactly as a received unit would be (§4.4, §4.7).

use crate::arbiter::ArbiterHandle;
use crate::shutdown::ShutdownHandle;
use crate::tx_source::TransactionSource;
use aleph_consensus::{encode_share, nonce_for};
use aleph_crypto::{Ed25519KeyPair, ThresholdCoin};
use aleph_poset::{sign_unit, CoinSharePayload, PosetApi, PreUnit};
use aleph_sync::UnitSource;
use aleph_types::{ProcessId, SchedulerConfig};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Builds the coin shares a unit at `predicted_level` should attach: one
/// per level-`predicted_level - 2` prime, the depth at which this unit (if
/// it turns out prime) starts casting common-mode votes. Non-prime units
/// carry none, since only primes are ever consulted for a vote (§4.5).
async fn coin_shares_for<P: PosetApi + ?Sized>(
    poset: &P,
    coin: &ThresholdCoin,
    own_id: ProcessId,
    predecessor_level: u64,
    predicted_level: u64,
) -> Vec<CoinSharePayload> {
    if predicted_level <= predecessor_level || predicted_level < 2 {
        return Vec::new();
    }
    let candidate_level = predicted_level - 2;
    let candidates = poset.primes_at_level(candidate_level).await;
    candidates
        .into_iter()
        .map(|v| {
            let nonce = nonce_for(v, predicted_level);
            encode_share(&coin.create_share(&nonce), own_id.0)
        })
        .collect()
}

#[instrument(skip_all, fields(own_id = %own_id))]
async fn create_one_unit<P, TX>(
    poset: &P,
    tx_source: &TX,
    signing_key: &Ed25519KeyPair,
    coin: &ThresholdCoin,
    own_id: ProcessId,
    config: &SchedulerConfig,
) -> aleph_poset::Unit
where
    P: PosetApi + ?Sized,
    TX: TransactionSource + ?Sized,
{
    let own_maximal = poset.own_maximal(own_id).await;
    if own_maximal.is_empty() {
        return sign_unit(PreUnit::new_genesis(own_id), signing_key);
    }

    let parents = poset
        .select_parents(own_id, config.max_parents)
        .await
        .unwrap_or_else(|| own_maximal.clone());
    let predecessor_hash = parents[0];
    let predecessor_level = poset.get_unit(predecessor_hash).await.map(|u| u.level).unwrap_or(0);
    let predecessor_height = poset.get_unit(predecessor_hash).await.map(|u| u.height()).unwrap_or(0);

    let predicted_level = poset.predict_level(parents.clone()).await;
    let txs = tx_source.drain(config.txs_per_unit).await;
    let coin_shares = coin_shares_for(poset, coin, own_id, predecessor_level, predicted_level).await;

    let pre = PreUnit::new_child(own_id, predecessor_height, parents, txs, coin_shares);
    sign_unit(pre, signing_key)
}

/// Runs the `create_add` loop until shutdown, adapting the inter-creation
/// delay (§4.4) to how quickly this process's own units are reaching new
/// levels.
pub async fn run(
    poset: Arc<dyn PosetApi>,
    arbiter: ArbiterHandle,
    tx_source: Arc<dyn TransactionSource>,
    signing_key: Arc<Ed25519KeyPair>,
    coin: Arc<ThresholdCoin>,
    own_id: ProcessId,
    scheduler_config: SchedulerConfig,
    mut shutdown: ShutdownHandle,
) {
    let mut delay = scheduler_config.create_delay();
    let min = Duration::from_millis(scheduler_config.min_create_delay_ms);
    let max = Duration::from_millis(scheduler_config.max_create_delay_ms);
    let mut recent_levels: Vec<u64> = Vec::new();

    loop {
        tokio::select! {
            _ = shutdown.wait() => break,
            _ = tokio::time::sleep(delay) => {}
        }
        if shutdown.is_shutting_down() {
            break;
        }

        let unit = create_one_unit(poset.as_ref(), tx_source.as_ref(), &signing_key, &coin, own_id, &scheduler_config).await;
        let hash = unit.hash;
        match arbiter.submit(unit, UnitSource::Local).await {
            Ok(()) => {
                let level = poset.get_unit(hash).await.map(|u| u.level).unwrap_or(0);
                recent_levels.push(level);
                if recent_levels.len() > 8 {
                    recent_levels.remove(0);
                }
                debug!(level, "created unit");
            }
            Err(err) => warn!(error = %err, "arbiter rejected a locally created unit"),
        }

        delay = aleph_poset::adapt_create_delay(&recent_levels, delay, min, max);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aleph_poset::{PosetService, PosetState};
    use aleph_types::ProcessCount;
    use std::sync::Arc;

    struct FixedKeys(Vec<[u8; 32]>);
    impl aleph_poset::CommitteeKeyProvider for FixedKeys {
        fn public_key(&self, id: ProcessId) -> Option<[u8; 32]> {
            self.0.get(id.index()).copied()
        }
    }

    #[tokio::test]
    async fn first_unit_for_a_creator_is_a_genesis() {
        let kp = Ed25519KeyPair::generate();
        let state = Arc::new(PosetState::new(ProcessCount(4)));
        let keys = Arc::new(FixedKeys(vec![*kp.public_key().as_bytes()]));
        let service = PosetService::new(state, keys, Arc::new(aleph_poset::NullEventSink));

        let coin_kp = aleph_crypto::BlsKeyPair::generate();
        let public = coin_kp.public_key();
        let coin = ThresholdCoin::new(0, coin_kp, vec![public], 1);
        let (queue, _sender) = crate::tx_source::InMemoryTransactionQueue::new(8);

        let unit = create_one_unit(&service, &queue, &kp, &coin, ProcessId(0), &SchedulerConfig::default()).await;
        assert!(unit.is_genesis());
    }
}
