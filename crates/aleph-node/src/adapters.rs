//! Thin adapters wiring the library crates' driven ports to this process's
//! concrete state: the committee's public keys, the BLS threshold coin, and
//! the `aleph-bus` event bus poset lifecycle events are forwarded onto.

use aleph_bus::{AlephEvent, EventPublisher};
use aleph_crypto::ThresholdCoin;
use aleph_poset::{CommitteeKeyProvider, PosetEventSink};
use aleph_types::{CommitteeInfo, ProcessId, PublicKey};
use async_trait::async_trait;
use std::sync::Arc;

/// Resolves committee public keys from the static `CommitteeInfo` loaded at
/// startup.
pub struct StaticCommitteeKeys(pub CommitteeInfo);

impl CommitteeKeyProvider for StaticCommitteeKeys {
    fn public_key(&self, creator: ProcessId) -> Option<PublicKey> {
        self.0.public_key(creator).copied()
    }
}

/// Forwards poset lifecycle events onto the process's event bus.
pub struct BusPosetEventSink<E> {
    bus: Arc<E>,
}

impl<E> BusPosetEventSink<E> {
    pub fn new(bus: Arc<E>) -> Self {
        BusPosetEventSink { bus }
    }
}

#[async_trait]
impl<E> PosetEventSink for BusPosetEventSink<E>
where
    E: EventPublisher + 'static,
{
    async fn unit_inserted(&self, creator: ProcessId, hash: aleph_types::Hash, height: u64, level: u64) {
        self.bus
            .publish(AlephEvent::UnitInserted { hash, creator, height, level })
            .await;
    }

    async fn forker_detected(&self, creator: ProcessId, first: aleph_types::Hash, second: aleph_types::Hash) {
        self.bus
            .publish(AlephEvent::ForkerDetected { creator, first, second })
            .await;
    }
}

/// Supplies this process's threshold-coin participant to `aleph-consensus`.
/// Holds an `Arc` rather than an owned `ThresholdCoin` so `create_add` can
/// share the exact same coin (and thus the exact same secret key) rather
/// than needing a second copy of it.
pub struct StaticCoinProvider(pub Arc<ThresholdCoin>);

impl aleph_consensus::CoinProvider for StaticCoinProvider {
    fn coin(&self) -> &ThresholdCoin {
        self.0.as_ref()
    }
}
