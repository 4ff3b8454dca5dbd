//! `dispatch_syncs`: on every tick, picks a gossip peer (§4.7) and runs the
//! initiator side of the three-step sync protocol against it, bounded by
//! `max_outgoing_syncs` concurrent dials so one slow or unreachable peer
//! cannot starve the rest.

use crate::arbiter::ArbiterHandle;
use crate::shutdown::ShutdownHandle;
use aleph_poset::PosetState;
use aleph_sync::{select_peer, SyncApi, SyncSession};
use aleph_types::{GossipStrategy, NetworkConfig, ProcessCount, ProcessId, SchedulerConfig};
use rand::thread_rng;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::Semaphore;
use tracing::{debug, instrument, warn};

/// Runs the `dispatch_syncs` loop until shutdown.
#[instrument(skip_all, fields(own_id = %own_id))]
pub async fn run(
    poset: Arc<PosetState>,
    arbiter: ArbiterHandle,
    own_id: ProcessId,
    committee_size: ProcessCount,
    gossip_strategy: GossipStrategy,
    network: NetworkConfig,
    scheduler_config: SchedulerConfig,
    mut shutdown: ShutdownHandle,
) {
    if committee_size.as_usize() <= 1 {
        debug!("single-process committee, nothing to sync with");
        return;
    }

    let semaphore = Arc::new(Semaphore::new(scheduler_config.max_outgoing_syncs));
    let sync_delay = scheduler_config.sync_delay();
    let timeout = scheduler_config.sync_phase_timeout();
    let mut rng = thread_rng();
    let mut round: u64 = 0;

    loop {
        tokio::select! {
            _ = shutdown.wait() => break,
            _ = tokio::time::sleep(sync_delay) => {}
        }
        if shutdown.is_shutting_down() {
            break;
        }

        let peer = select_peer(gossip_strategy, own_id, committee_size, round, &mut rng);
        round += 1;

        let Some(addr) = network.peer_addrs.get(peer.index()).cloned() else {
            warn!(%peer, "no address configured for peer, skipping this round");
            continue;
        };

        let Ok(permit) = semaphore.clone().try_acquire_owned() else {
            debug!(%peer, "all outgoing sync slots busy, skipping this round");
            continue;
        };

        let session = Arc::new(SyncSession::new(poset.clone(), Arc::new(arbiter.clone()), peer));
        tokio::spawn(async move {
            let _permit = permit;
            run_one_sync(session, addr, timeout).await;
        });
    }
}

async fn run_one_sync(
    session: Arc<SyncSession<PosetState, ArbiterHandle>>,
    addr: String,
    timeout: Duration,
) {
    let connect = tokio::time::timeout(timeout, TcpStream::connect(&addr));
    let stream = match connect.await {
        Ok(Ok(stream)) => stream,
        Ok(Err(err)) => {
            debug!(addr, error = %err, "could not connect to peer, will retry next round");
            return;
        }
        Err(_) => {
            debug!(addr, "connect timed out, will retry next round");
            return;
        }
    };

    let result = tokio::time::timeout(timeout, session.run_initiator(Box::new(stream))).await;
    match result {
        Ok(Ok(outcome)) => {
            debug!(sent = outcome.units_sent, received = outcome.units_received, "sync round complete");
        }
        Ok(Err(err)) => warn!(addr, error = %err, "sync session failed"),
        Err(_) => warn!(addr, "sync session timed out"),
    }
}
