//! Linear order extraction (§4.5, tail): once a timing unit `T` is fixed
//! for a level, every unit `U <= T` (i.e. `below(U, T)`) not already
//! ordered is appended, in a deterministic tie-broken topological order.
//! The prefix this produces is append-only: earlier positions never move.

use aleph_poset::Poset;
use aleph_types::Hash;
use std::collections::HashSet;

/// Collects every unit below (or equal to) `timing_unit` that is not yet
/// in `already_ordered`, sorted by `(level, creator_id, hash)` — the
/// deterministic tie-break that makes the order a pure function of the
/// poset's content rather than of insertion timing.
pub fn extend_to(
    poset: &Poset,
    timing_unit: Hash,
    already_ordered: &HashSet<Hash>,
) -> Vec<Hash> {
    let mut newly_ordered = Vec::new();
    let mut visited: HashSet<Hash> = HashSet::new();
    let mut frontier = vec![timing_unit];
    while let Some(cur) = frontier.pop() {
        if !visited.insert(cur) || already_ordered.contains(&cur) {
            continue;
        }
        let Some(unit) = poset.unit(&cur) else {
            continue;
        };
        newly_ordered.push(cur);
        for &parent in unit.parents() {
            frontier.push(parent);
        }
    }
    newly_ordered.sort_by_key(|hash| {
        let unit = poset.unit(hash).expect("visited units are known to the poset");
        (unit.level, unit.creator().0, *hash)
    });
    newly_ordered
}

#[cfg(test)]
mod tests {
    use super::*;
    use aleph_poset::{sign_unit, PreUnit};
    use aleph_crypto::Ed25519KeyPair;
    use aleph_types::{ProcessCount, ProcessId};

    #[test]
    fn extends_with_genesis_and_its_children_in_level_order() {
        let kps: Vec<Ed25519KeyPair> = (0..4).map(|_| Ed25519KeyPair::generate()).collect();
        let mut poset = Poset::new(ProcessCount(4));
        let mut genesis_hashes = Vec::new();
        for i in 0..4u16 {
            let g = sign_unit(PreUnit::new_genesis(ProcessId(i)), &kps[i as usize]);
            genesis_hashes.push(poset.insert(g).unwrap().hash);
        }
        let child = sign_unit(
            PreUnit::new_child(ProcessId(0), 0, genesis_hashes.clone(), Vec::new(), Vec::new()),
            &kps[0],
        );
        let child_hash = poset.insert(child).unwrap().hash;

        let order = extend_to(&poset, child_hash, &HashSet::new());
        assert_eq!(order.len(), 5);
        assert_eq!(*order.last().unwrap(), child_hash);
        // the four genesis units precede the child and are sorted by creator id.
        let genesis_prefix = &order[..4];
        for i in 0..4 {
            assert_eq!(genesis_prefix[i], genesis_hashes[i]);
        }
    }

    #[test]
    fn already_ordered_units_are_not_repeated() {
        let kps: Vec<Ed25519KeyPair> = (0..4).map(|_| Ed25519KeyPair::generate()).collect();
        let mut poset = Poset::new(ProcessCount(4));
        let g = sign_unit(PreUnit::new_genesis(ProcessId(0)), &kps[0]);
        let g_hash = poset.insert(g).unwrap().hash;

        let mut already = HashSet::new();
        already.insert(g_hash);
        let order = extend_to(&poset, g_hash, &already);
        assert!(order.is_empty());
    }
}
