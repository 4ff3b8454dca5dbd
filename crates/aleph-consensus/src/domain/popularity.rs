//! Popularity proofs (§4.5): a prime unit `U` proves a lower prime `V`
//! popular when some walk from `U` down to `V`, staying within the
//! sub-poset at or above `V`'s level, touches units created by at least
//! `2f+1` distinct processes. Bounded by construction (the walk never
//! leaves `[V.level, U.level]` and never descends past `V`) and memoized
//! per `(U, V)` by the caller.

use aleph_poset::Poset;
use aleph_types::Hash;
use std::collections::HashSet;

/// `true` iff a walk from `u` down to `v` passes through units created by
/// `>= 2f+1` distinct processes. Returns `false` if `v` is not below `u`
/// (no such walk exists) or either hash is unknown.
pub fn proves_popular(poset: &Poset, u: Hash, v: Hash) -> bool {
    let Some(v_unit) = poset.unit(&v) else {
        return false;
    };
    if !poset.below(v, u) {
        return false;
    }
    let floor_level = v_unit.level;

    let mut visited: HashSet<Hash> = HashSet::new();
    let mut creators: HashSet<_> = HashSet::new();
    let mut frontier = vec![u];
    while let Some(cur) = frontier.pop() {
        if !visited.insert(cur) {
            continue;
        }
        let Some(unit) = poset.unit(&cur) else {
            continue;
        };
        if unit.level < floor_level {
            continue;
        }
        creators.insert(unit.creator());
        if cur == v {
            // v is the floor of this walk; don't descend past it.
            continue;
        }
        if !poset.below(v, cur) {
            // only units still above v are part of the U-to-V walk.
            continue;
        }
        for &parent in unit.parents() {
            frontier.push(parent);
        }
    }

    creators.len() as u16 >= poset.committee_size().supermajority()
}

#[cfg(test)]
mod tests {
    use super::*;
    use aleph_poset::{sign_unit, PreUnit};
    use aleph_crypto::Ed25519KeyPair;
    use aleph_types::{ProcessCount, ProcessId};

    fn committee(n: u16) -> Vec<Ed25519KeyPair> {
        (0..n).map(|_| Ed25519KeyPair::generate()).collect()
    }

    #[test]
    fn self_popularity_fails_without_breadth() {
        let kps = committee(4);
        let mut poset = Poset::new(ProcessCount(4));
        let g = sign_unit(PreUnit::new_genesis(ProcessId(0)), &kps[0]);
        let g_hash = poset.insert(g).unwrap().hash;
        // A genesis unit alone was created by a single process; far short
        // of the 2f+1=3 threshold required at N=4.
        assert!(!proves_popular(&poset, g_hash, g_hash));
    }

    #[test]
    fn unrelated_units_do_not_prove_popularity() {
        let kps = committee(4);
        let mut poset = Poset::new(ProcessCount(4));
        let a = sign_unit(PreUnit::new_genesis(ProcessId(0)), &kps[0]);
        let a_hash = poset.insert(a).unwrap().hash;
        let b = sign_unit(PreUnit::new_genesis(ProcessId(1)), &kps[1]);
        let b_hash = poset.insert(b).unwrap().hash;
        assert!(!proves_popular(&poset, a_hash, b_hash));
    }

    #[test]
    fn a_child_with_three_parents_proves_its_own_predecessor_popular() {
        let kps = committee(4);
        let mut poset = Poset::new(ProcessCount(4));
        let mut genesis_hashes = Vec::new();
        for i in 0..4u16 {
            let g = sign_unit(PreUnit::new_genesis(ProcessId(i)), &kps[i as usize]);
            genesis_hashes.push(poset.insert(g).unwrap().hash);
        }
        let child = sign_unit(
            PreUnit::new_child(
                ProcessId(0),
                0,
                genesis_hashes.clone(),
                Vec::new(),
                Vec::new(),
            ),
            &kps[0],
        );
        let child_hash = poset.insert(child).unwrap().hash;
        // The child touches all four creators on its way down to its own
        // predecessor, well above the 2f+1=3 threshold.
        assert!(proves_popular(&poset, child_hash, genesis_hashes[0]));
    }
}
