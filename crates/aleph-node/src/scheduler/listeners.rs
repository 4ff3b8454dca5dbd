//! `start_listeners`: accepts incoming sync dials and runs the responder
//! side of the three-step protocol (§4.6), bounded by `max_incoming_syncs`
//! concurrent sessions.

use crate::arbiter::ArbiterHandle;
use crate::shutdown::ShutdownHandle;
use aleph_poset::PosetState;
use aleph_sync::{SyncApi, SyncSession};
use aleph_types::{ProcessId, SchedulerConfig};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::Semaphore;
use tracing::{debug, instrument, warn};

/// Maps a peer's configured listen address to its process id, by host
/// only (the incoming connection's source port is ephemeral and never
/// matches the peer's own listen port). Good enough to attribute an
/// inbound session for §7 misbehavior bookkeeping; the unit signatures
/// the arbiter checks are what actually authenticates a creator, not
/// this address match.
fn peer_by_host(peer_addrs: &[String]) -> HashMap<String, ProcessId> {
    peer_addrs
        .iter()
        .enumerate()
        .filter_map(|(i, addr)| {
            let host = addr.rsplit_once(':').map(|(host, _)| host).unwrap_or(addr);
            Some((host.to_string(), ProcessId(i as u16)))
        })
        .collect()
}

/// Runs the accept loop until shutdown.
#[instrument(skip_all, fields(own_id = %own_id))]
pub async fn run(
    poset: Arc<PosetState>,
    arbiter: ArbiterHandle,
    own_id: ProcessId,
    listen_addr: String,
    peer_addrs: Vec<String>,
    scheduler_config: SchedulerConfig,
    mut shutdown: ShutdownHandle,
) {
    let hosts = peer_by_host(&peer_addrs);
    let listener = match TcpListener::bind(&listen_addr).await {
        Ok(l) => l,
        Err(err) => {
            warn!(listen_addr, error = %err, "failed to bind sync listener");
            return;
        }
    };
    debug!(listen_addr, "sync listener bound");

    let semaphore = Arc::new(Semaphore::new(scheduler_config.max_incoming_syncs));

    loop {
        tokio::select! {
            _ = shutdown.wait() => break,
            accepted = listener.accept() => {
                let (stream, peer_addr) = match accepted {
                    Ok(pair) => pair,
                    Err(err) => {
                        warn!(error = %err, "accept failed");
                        continue;
                    }
                };

                let Ok(permit) = semaphore.clone().try_acquire_owned() else {
                    debug!(%peer_addr, "all incoming sync slots busy, dropping connection");
                    continue;
                };

                let peer = hosts.get(&peer_addr.ip().to_string()).copied().unwrap_or(own_id);
                let session = Arc::new(SyncSession::new(poset.clone(), Arc::new(arbiter.clone()), peer));
                tokio::spawn(async move {
                    let _permit = permit;
                    if let Err(err) = session.run_responder(Box::new(stream)).await {
                        warn!(%peer_addr, error = %err, "sync session failed");
                    }
                });
            }
        }
        if shutdown.is_shutting_down() {
            break;
        }
    }
}
