//! The arbiter: the single task that serializes every poset mutation.
//! `create_add` and every sync session hand units to it through
//! `ArbiterHandle` (which implements `UnitSink`); nothing else ever calls
//! `PosetApi::insert_unit` directly. After each admitted unit the arbiter
//! attempts a timing decision for any newly-reachable level and publishes
//! the resulting events on the bus.

use crate::orphan::OrphanBuffer;
use crate::shutdown::ShutdownHandle;
use aleph_bus::{AlephEvent, EventPublisher};
use aleph_consensus::ConsensusApi;
use aleph_poset::{PosetApi, PosetError, Unit};
use aleph_sync::{SyncError, UnitSink, UnitSource};
use aleph_types::Hash;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, instrument, warn};

/// The seed that derives the level-0 candidate order (§4.5); every process
/// must agree on it without having elected anything yet.
pub const GENESIS_SEED: &[u8] = b"aleph-genesis-candidate-order-seed";

fn genesis_seed_hash() -> Hash {
    aleph_crypto::sha256_hash(GENESIS_SEED)
}

pub struct ArbiterConfig {
    pub queue_capacity: usize,
    pub orphan_capacity: usize,
    pub orphan_ttl: Duration,
}

struct ArbiterMessage {
    unit: Unit,
    source: UnitSource,
    reply: oneshot::Sender<Result<(), SyncError>>,
}

/// Handle for submitting units into the arbiter's serialized queue. Cloning
/// is cheap; every sync session and `create_add` holds one.
#[derive(Clone)]
pub struct ArbiterHandle {
    sender: mpsc::Sender<ArbiterMessage>,
}

#[async_trait]
impl UnitSink for ArbiterHandle {
    async fn submit(&self, unit: Unit, source: UnitSource) -> Result<(), SyncError> {
        let (reply, reply_rx) = oneshot::channel();
        self.sender
            .send(ArbiterMessage { unit, source, reply })
            .await
            .map_err(|_| SyncError::Transport(closed_io_error()))?;
        reply_rx.await.map_err(|_| SyncError::Transport(closed_io_error()))?
    }
}

fn closed_io_error() -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::BrokenPipe, "arbiter task is no longer running")
}

/// Spawns the arbiter task, returning the handle other tasks submit units
/// through and the task's `JoinHandle`.
pub fn spawn_arbiter<P, C, E>(
    poset: Arc<P>,
    consensus: Arc<C>,
    events: Arc<E>,
    config: ArbiterConfig,
    shutdown: ShutdownHandle,
) -> (ArbiterHandle, JoinHandle<()>)
where
    P: PosetApi + 'static,
    C: ConsensusApi + 'static,
    E: EventPublisher + 'static,
{
    let (sender, receiver) = mpsc::channel(config.queue_capacity);
    let handle = ArbiterHandle { sender };
    let task = tokio::spawn(run_arbiter(poset, consensus, events, receiver, config, shutdown));
    (handle, task)
}

async fn run_arbiter<P, C, E>(
    poset: Arc<P>,
    consensus: Arc<C>,
    events: Arc<E>,
    mut receiver: mpsc::Receiver<ArbiterMessage>,
    config: ArbiterConfig,
    mut shutdown: ShutdownHandle,
) where
    P: PosetApi + 'static,
    C: ConsensusApi + 'static,
    E: EventPublisher + 'static,
{
    let mut orphans = OrphanBuffer::new(config.orphan_capacity);
    let mut ttl_tick = tokio::time::interval(config.orphan_ttl.max(Duration::from_millis(50)));
    let mut next_level_to_attempt: u64 = 0;

    loop {
        tokio::select! {
            _ = shutdown.wait() => {
                debug!("arbiter shutting down");
                break;
            }
            _ = ttl_tick.tick() => {
                let evicted = orphans.evict_expired(config.orphan_ttl);
                if evicted > 0 {
                    debug!(evicted, "evicted stale orphans");
                }
            }
            maybe_msg = receiver.recv() => {
                let Some(msg) = maybe_msg else { break };
                process_submission(&poset, &mut orphans, msg.unit, msg.source, Some(msg.reply)).await;
                attempt_decisions(&poset, &consensus, &events, &mut next_level_to_attempt).await;
            }
        }
    }
}

#[instrument(skip(poset, orphans, reply), fields(creator = %unit.creator(), height = unit.height()))]
async fn process_submission<P: PosetApi>(
    poset: &Arc<P>,
    orphans: &mut OrphanBuffer,
    unit: Unit,
    source: UnitSource,
    reply: Option<oneshot::Sender<Result<(), SyncError>>>,
) {
    match poset.insert_unit(unit.clone()).await {
        Ok(hash) => {
            if let Some(reply) = reply {
                let _ = reply.send(Ok(()));
            }
            release_orphans(poset, orphans, hash).await;
        }
        Err(PosetError::AlreadyKnown(_)) => {
            if let Some(reply) = reply {
                let _ = reply.send(Ok(()));
            }
        }
        Err(PosetError::Orphan(_, missing)) => {
            let buffered = orphans.insert(missing, unit, source);
            if !buffered {
                warn!("orphan buffer full, dropping unit");
            }
            if let Some(reply) = reply {
                let _ = reply.send(Ok(()));
            }
        }
        Err(err) => {
            warn!(error = %err, "unit rejected");
            if let Some(reply) = reply {
                let _ = reply.send(Err(SyncError::PeerMisbehaved));
            }
        }
    }
}

/// Drains the orphan buffer transitively: admitting `hash` may unblock
/// units waiting on it, and admitting those may in turn unblock others.
async fn release_orphans<P: PosetApi>(poset: &Arc<P>, orphans: &mut OrphanBuffer, hash: Hash) {
    let mut stack = vec![hash];
    while let Some(newly_known) = stack.pop() {
        for pending in orphans.take_ready(newly_known) {
            let unit = pending.unit;
            let source = pending.source;
            match poset.insert_unit(unit.clone()).await {
                Ok(h) => stack.push(h),
                Err(PosetError::Orphan(_, missing)) => {
                    orphans.insert(missing, unit, source);
                }
                Err(PosetError::AlreadyKnown(_)) => {}
                Err(err) => warn!(error = %err, "previously buffered unit rejected on retry"),
            }
        }
    }
}

/// Attempts timing decisions level by level, starting from the first
/// undecided level, stopping at the first level that is not yet decidable.
async fn attempt_decisions<P, C, E>(
    poset: &Arc<P>,
    consensus: &Arc<C>,
    events: &Arc<E>,
    next_level: &mut u64,
) where
    P: PosetApi,
    C: ConsensusApi,
    E: EventPublisher,
{
    loop {
        let max_level = poset.max_level().await;
        if *next_level + 2 > max_level {
            break;
        }
        let seed = match consensus.timing_unit_at(next_level.saturating_sub(1)).await {
            Some(hash) if *next_level > 0 => hash,
            _ => genesis_seed_hash(),
        };
        let appended = consensus.attempt_timing_decision(*next_level, seed).await;
        if appended.is_empty() {
            break;
        }
        if let Some(timing_unit) = consensus.timing_unit_at(*next_level).await {
            events
                .publish(AlephEvent::TimingUnitElected { level: *next_level, unit: timing_unit })
                .await;
        }
        events
            .publish(AlephEvent::LinearOrderExtended { up_to_level: *next_level, appended })
            .await;
        *next_level += 1;
    }
}
