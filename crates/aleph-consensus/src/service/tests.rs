use super::*;
use aleph_crypto::{BlsKeyPair, Ed25519KeyPair, ThresholdCoin};
use aleph_poset::{sign_unit, PreUnit};
use aleph_types::{ProcessCount, ProcessId};

struct FixedCoin(ThresholdCoin);

impl CoinProvider for FixedCoin {
    fn coin(&self) -> &ThresholdCoin {
        &self.0
    }
}

fn make_service(n: u16) -> (ConsensusService<FixedCoin>, Arc<PosetState>, Vec<Ed25519KeyPair>) {
    let poset = Arc::new(PosetState::new(ProcessCount(n)));
    let state = Arc::new(ConsensusState::new());
    let bls: Vec<BlsKeyPair> = (0..n).map(|_| BlsKeyPair::generate()).collect();
    let public_keys = bls.iter().map(|k| k.public_key()).collect();
    let own = BlsKeyPair::from_secret_bytes(&bls[0].secret_bytes()).unwrap();
    let coin = Arc::new(FixedCoin(ThresholdCoin::new(0, own, public_keys, n as usize - 1)));
    let kps: Vec<Ed25519KeyPair> = (0..n).map(|_| Ed25519KeyPair::generate()).collect();
    (ConsensusService::new(poset.clone(), state, coin), poset, kps)
}

/// Builds a fully-connected three-round poset across `n` processes: each
/// process's genesis (level 0), then a unit naming every other process's
/// predecessor as a parent (level 1), then a third repeating the pattern
/// (level 2) — the same shape as the supermajority-level poset test in
/// `aleph-poset`, extended one round further so popularity proofs at
/// `ℓ+2` have something to walk through.
fn build_three_round_poset(poset: &Arc<PosetState>, kps: &[Ed25519KeyPair]) {
    let n = kps.len() as u16;
    let mut by_height: Vec<Vec<aleph_types::Hash>> = vec![Vec::new(); 3];

    for i in 0..n {
        let unit = sign_unit(PreUnit::new_genesis(ProcessId(i)), &kps[i as usize]);
        let hash = poset.poset.write().insert(unit).unwrap().hash;
        by_height[0].push(hash);
    }
    for round in 1..3u64 {
        let mut next = Vec::new();
        for i in 0..n {
            let mut parents = vec![by_height[round as usize - 1][i as usize]];
            for (j, &h) in by_height[round as usize - 1].iter().enumerate() {
                if j as u16 != i {
                    parents.push(h);
                }
            }
            let unit = sign_unit(
                PreUnit::new_child(ProcessId(i), round - 1, parents, Vec::new(), Vec::new()),
                &kps[i as usize],
            );
            let hash = poset.poset.write().insert(unit).unwrap().hash;
            next.push(hash);
        }
        by_height[round as usize] = next;
    }
}

#[tokio::test]
async fn undetermined_level_yields_no_decision_on_an_empty_poset() {
    let (service, _poset, _kps) = make_service(4);
    let appended = service.attempt_timing_decision(0, [0u8; 32]).await;
    assert!(appended.is_empty());
    assert_eq!(service.decided_through().await, None);
}

#[tokio::test]
async fn a_fully_connected_three_round_poset_elects_a_timing_unit_at_level_zero() {
    let (service, poset, kps) = make_service(4);
    build_three_round_poset(&poset, &kps);

    let appended = service.attempt_timing_decision(0, [0u8; 32]).await;
    assert!(!appended.is_empty(), "popularity proofs at level 2 should be unanimous here");
    assert_eq!(service.decided_through().await, Some(0));

    let timing_unit = *appended.last().unwrap();
    assert!(service.is_ordered(timing_unit).await);
    assert_eq!(service.linear_order().await.len(), appended.len());

    // level already decided: a repeat attempt is a no-op.
    let repeat = service.attempt_timing_decision(0, [0u8; 32]).await;
    assert!(repeat.is_empty());
}
