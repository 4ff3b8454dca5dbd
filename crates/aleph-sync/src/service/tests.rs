use super::*;
use crate::domain::SyncError;
use crate::ports::{DuplexStream, PosetSnapshot, SyncApi, UnitSink, UnitSource};
use aleph_crypto::Ed25519KeyPair;
use aleph_poset::{sign_unit, PosetError, PosetState, PreUnit};
use aleph_types::{ProcessCount, ProcessId};
use async_trait::async_trait;
use std::sync::Arc;

struct ArbiterStub(Arc<PosetState>);

#[async_trait]
impl UnitSink for ArbiterStub {
    async fn submit(&self, unit: aleph_poset::Unit, _source: UnitSource) -> Result<(), SyncError> {
        match self.0.poset.write().insert(unit) {
            Ok(_) | Err(PosetError::AlreadyKnown(_)) => Ok(()),
            Err(_) => Err(SyncError::PeerMisbehaved),
        }
    }
}

fn genesis_for_all(poset: &PosetState, kps: &[Ed25519KeyPair]) -> Vec<aleph_types::Hash> {
    kps.iter()
        .enumerate()
        .map(|(i, kp)| {
            let unit = sign_unit(PreUnit::new_genesis(ProcessId(i as u16)), kp);
            poset.poset.write().insert(unit).unwrap().hash
        })
        .collect()
}

/// Builds two posets sharing the same genesis round but each holding a
/// level-1 unit the other has never seen, so a single sync session has
/// something concrete to exchange in both directions.
fn build_divergent_posets() -> (Arc<PosetState>, Arc<PosetState>, Vec<Ed25519KeyPair>) {
    let kps: Vec<Ed25519KeyPair> = (0..4).map(|_| Ed25519KeyPair::generate()).collect();
    let a = Arc::new(PosetState::new(ProcessCount(4)));
    let b = Arc::new(PosetState::new(ProcessCount(4)));

    let genesis_a = genesis_for_all(&a, &kps);
    for (i, &g) in genesis_a.iter().enumerate() {
        let unit = sign_unit(PreUnit::new_genesis(ProcessId(i as u16)), &kps[i]);
        assert_eq!(unit.hash, g);
        b.poset.write().insert(unit).unwrap();
    }

    let a_only = sign_unit(
        PreUnit::new_child(ProcessId(0), 0, vec![genesis_a[0]], Vec::new(), Vec::new()),
        &kps[0],
    );
    a.poset.write().insert(a_only.clone()).unwrap();

    let b_only = sign_unit(
        PreUnit::new_child(ProcessId(1), 0, vec![genesis_a[1]], Vec::new(), Vec::new()),
        &kps[1],
    );
    b.poset.write().insert(b_only.clone()).unwrap();

    (a, b, kps)
}

#[tokio::test]
async fn a_single_session_converges_both_sides_to_the_union() {
    let (a, b, _kps) = build_divergent_posets();
    assert_eq!(a.poset.read().len(), 5);
    assert_eq!(b.poset.read().len(), 5);

    let session_a = SyncSession::new(a.clone(), Arc::new(ArbiterStub(a.clone())), ProcessId(1));
    let session_b = SyncSession::new(b.clone(), Arc::new(ArbiterStub(b.clone())), ProcessId(0));

    let (side_a, side_b) = tokio::io::duplex(8192);
    let stream_a: Box<dyn DuplexStream> = Box::new(side_a);
    let stream_b: Box<dyn DuplexStream> = Box::new(side_b);

    let (outcome_a, outcome_b) = tokio::join!(
        session_a.run_initiator(stream_a),
        session_b.run_responder(stream_b),
    );
    let outcome_a = outcome_a.unwrap();
    let outcome_b = outcome_b.unwrap();

    assert_eq!(outcome_a.units_received, 1);
    assert_eq!(outcome_b.units_received, 1);
    assert_eq!(a.poset.read().len(), 6);
    assert_eq!(b.poset.read().len(), 6);
}

#[tokio::test]
async fn an_empty_summary_on_both_sides_exchanges_nothing() {
    let a = Arc::new(PosetState::new(ProcessCount(3)));
    let b = Arc::new(PosetState::new(ProcessCount(3)));
    let session_a = SyncSession::new(a.clone(), Arc::new(ArbiterStub(a.clone())), ProcessId(1));
    let session_b = SyncSession::new(b.clone(), Arc::new(ArbiterStub(b.clone())), ProcessId(0));

    let (side_a, side_b) = tokio::io::duplex(4096);
    let stream_a: Box<dyn DuplexStream> = Box::new(side_a);
    let stream_b: Box<dyn DuplexStream> = Box::new(side_b);

    let (outcome_a, outcome_b) = tokio::join!(
        session_a.run_initiator(stream_a),
        session_b.run_responder(stream_b),
    );
    let outcome_a = outcome_a.unwrap();
    let outcome_b = outcome_b.unwrap();
    assert_eq!(outcome_a.units_sent, 0);
    assert_eq!(outcome_b.units_sent, 0);
}

#[test]
fn poset_state_implements_poset_snapshot_directly() {
    let state = PosetState::new(ProcessCount(2));
    let summary = state.summary();
    assert_eq!(summary.len(), 2);
}
