//! Wires one process's identity and configuration into a running set of
//! tasks: the arbiter plus the three scheduler loops (§4.7). `main.rs` is
//! the only other caller of this module; everything else in the crate is
//! reached through here.

use crate::adapters::{BusPosetEventSink, StaticCoinProvider, StaticCommitteeKeys};
use crate::arbiter::{self, ArbiterConfig};
use crate::config::Identity;
use crate::scheduler::{create_add, dispatch_syncs, listeners};
use crate::shutdown::ShutdownController;
use crate::tx_source::{InMemoryTransactionQueue, TransactionSender, TransactionSource};
use aleph_bus::InMemoryEventBus;
use aleph_consensus::{ConsensusService, ConsensusState};
use aleph_crypto::ThresholdCoin;
use aleph_poset::{PosetApi, PosetService, PosetState};
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Capacity of the in-memory queue client transactions are submitted to
/// before `create_add` drains them into units. Out-of-process transaction
/// intake is not implemented (§9); this queue is the only producer side.
const TRANSACTION_QUEUE_CAPACITY: usize = 4_096;

/// Every running task a process's container spawns, plus the handles
/// needed to feed it transactions and shut it down.
pub struct Node {
    pub shutdown: ShutdownController,
    pub transactions: TransactionSender,
    tasks: Vec<JoinHandle<()>>,
}

impl Node {
    /// Builds every service and adapter from `identity`, spawns the
    /// arbiter and the three scheduler tasks, and returns the running
    /// node.
    pub fn spawn(identity: Identity) -> Self {
        let committee_size = identity.config.committee_size;
        let own_id = identity.config.own_id;

        let poset_state = Arc::new(PosetState::new(committee_size));
        let committee_keys = Arc::new(StaticCommitteeKeys(identity.committee_info.clone()));
        let bus = Arc::new(InMemoryEventBus::new());
        let event_sink = Arc::new(BusPosetEventSink::new(bus.clone()));
        let poset_service = Arc::new(PosetService::new(poset_state.clone(), committee_keys, event_sink));

        let coin = Arc::new(ThresholdCoin::new(
            own_id.0,
            identity.coin_key,
            identity.bls_public_keys,
            identity.config.threshold as usize,
        ));
        let coin_provider = Arc::new(StaticCoinProvider(coin.clone()));
        let consensus_state = Arc::new(ConsensusState::new());
        let consensus_service = Arc::new(ConsensusService::new(poset_state.clone(), consensus_state, coin_provider));

        let (shutdown, shutdown_handle) = ShutdownController::new();
        let arbiter_config = ArbiterConfig {
            queue_capacity: identity.config.scheduler.arbiter_queue_capacity,
            orphan_capacity: identity.config.scheduler.arbiter_queue_capacity,
            orphan_ttl: identity.config.scheduler.orphan_ttl(),
        };
        let (arbiter_handle, arbiter_task) = arbiter::spawn_arbiter(
            poset_service.clone(),
            consensus_service,
            bus,
            arbiter_config,
            shutdown_handle.clone(),
        );

        let (tx_queue, tx_sender) = InMemoryTransactionQueue::new(TRANSACTION_QUEUE_CAPACITY);
        let tx_source: Arc<dyn TransactionSource> = Arc::new(tx_queue);

        let signing_key = Arc::new(identity.signing_key);
        let create_add_task = tokio::spawn(create_add::run(
            poset_service.clone() as Arc<dyn PosetApi>,
            arbiter_handle.clone(),
            tx_source,
            signing_key,
            coin,
            own_id,
            identity.config.scheduler.clone(),
            shutdown_handle.clone(),
        ));

        let dispatch_task = tokio::spawn(dispatch_syncs::run(
            poset_state.clone(),
            arbiter_handle.clone(),
            own_id,
            committee_size,
            identity.config.scheduler.gossip_strategy,
            identity.config.network.clone(),
            identity.config.scheduler.clone(),
            shutdown_handle.clone(),
        ));

        let listener_task = tokio::spawn(listeners::run(
            poset_state,
            arbiter_handle,
            own_id,
            identity.config.network.listen_addr.clone(),
            identity.config.network.peer_addrs.clone(),
            identity.config.scheduler.clone(),
            shutdown_handle,
        ));

        Node {
            shutdown,
            transactions: tx_sender,
            tasks: vec![arbiter_task, create_add_task, dispatch_task, listener_task],
        }
    }

    /// Signals cooperative shutdown and waits for every task to finish.
    pub async fn shut_down(self) {
        self.shutdown.shut_down();
        for task in self.tasks {
            let _ = task.await;
        }
    }
}

