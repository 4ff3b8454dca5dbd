//! The Poset: the per-process mutable graph of units (§3, §4.1, §4.2).
//! This is the sole place floors, levels, prime status, and forker
//! bookkeeping are derived and recorded; `Poset::insert` is the only
//! mutator, mirroring the arbiter-is-sole-mutator contract of §5 one
//! layer down (the service layer serializes calls into it).

use crate::domain::compliance::check_compliance;
use crate::domain::error::{PosetError, PosetResult};
use crate::domain::floor::{below as floor_below, combine_floors, in_floor, UnitLookup};
use crate::domain::unit::Unit;
use aleph_types::{Hash, ProcessCount, ProcessId};
use std::collections::{HashMap, HashSet};

/// Units created by one process, indexed by height. A non-empty bucket
/// with more than one hash is direct evidence that creator forked.
#[derive(Debug, Clone, Default)]
struct CreatorChain {
    units_by_height: Vec<Vec<Hash>>,
}

/// Outcome of a successful `Poset::insert`, carrying exactly what the
/// service layer needs to react (attempt a timing decision, emit a bus
/// event) without re-deriving it.
#[derive(Debug, Clone, Copy)]
pub struct InsertOutcome {
    pub hash: Hash,
    pub level: u64,
    pub prime: bool,
    /// `Some(creator)` the first time this insertion proves `creator` a
    /// forker; `None` on every subsequent unit from an already-known
    /// forker (the set is monotone, so we only report the transition).
    pub newly_discovered_forker: Option<ProcessId>,
    /// When `newly_discovered_forker` is `Some`, the previously known unit
    /// at the same (creator, height) that this insertion is incomparable
    /// with — the other half of the fork evidence.
    pub fork_partner: Option<Hash>,
}

pub struct Poset {
    n: ProcessCount,
    units: HashMap<Hash, Unit>,
    chains: Vec<CreatorChain>,
    /// level -> prime unit hashes at that level, across all creators.
    primes_by_level: HashMap<u64, Vec<Hash>>,
    forkers: HashSet<ProcessId>,
    genesis: Vec<Hash>,
    max_level: u64,
    /// Units with no known child yet (the DAG's current leaves), in the
    /// order needed for "most-recently added first" parent selection.
    tips: HashSet<Hash>,
    insertion_order: Vec<Hash>,
}

impl UnitLookup for Poset {
    fn get(&self, hash: &Hash) -> Option<&Unit> {
        self.units.get(hash)
    }
}

impl Poset {
    pub fn new(n: ProcessCount) -> Self {
        Poset {
            n,
            units: HashMap::new(),
            chains: vec![CreatorChain::default(); n.as_usize()],
            primes_by_level: HashMap::new(),
            forkers: HashSet::new(),
            genesis: Vec::new(),
            max_level: 0,
            tips: HashSet::new(),
            insertion_order: Vec::new(),
        }
    }

    pub fn committee_size(&self) -> ProcessCount {
        self.n
    }

    pub fn contains(&self, hash: &Hash) -> bool {
        self.units.contains_key(hash)
    }

    pub fn unit(&self, hash: &Hash) -> Option<&Unit> {
        self.units.get(hash)
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn is_forker(&self, creator: ProcessId) -> bool {
        self.forkers.contains(&creator)
    }

    pub fn forkers(&self) -> &HashSet<ProcessId> {
        &self.forkers
    }

    pub fn genesis_units(&self) -> &[Hash] {
        &self.genesis
    }

    pub fn max_level(&self) -> u64 {
        self.max_level
    }

    pub fn primes_at_level(&self, level: u64) -> &[Hash] {
        self.primes_by_level
            .get(&level)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// The maximal units by `creator` known so far. A singleton for an
    /// honest creator; more than one entry is itself fork evidence.
    pub fn creator_maximal(&self, creator: ProcessId) -> &[Hash] {
        self.chains
            .get(creator.index())
            .and_then(|c| c.units_by_height.last())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// `below(v, u)`: is `v` reachable from `u` along parent edges.
    pub fn below(&self, v: Hash, u: Hash) -> bool {
        floor_below(self, v, u)
    }

    /// Every unit hash in the order it was admitted. Parents always
    /// precede children here, since `insert` rejects orphans (rule 3) —
    /// a cheap, always-available topological order for callers (gossip
    /// diffing) that need one without walking the DAG themselves.
    pub fn insertion_order(&self) -> &[Hash] {
        &self.insertion_order
    }

    /// Current DAG tips (units with no known child), most recently
    /// inserted first — the order the greedy parent selector (§4.4) walks.
    pub fn tips_by_recency(&self) -> Vec<Hash> {
        self.insertion_order
            .iter()
            .rev()
            .filter(|h| self.tips.contains(*h))
            .copied()
            .collect()
    }

    /// The set of level-`level` prime units below `target`, used both by
    /// the expand-primes compliance rule and by level computation itself.
    pub fn primes_below(&self, level: u64, target: Hash) -> HashSet<Hash> {
        self.primes_at_level(level)
            .iter()
            .filter(|&&p| self.below(p, target))
            .copied()
            .collect()
    }

    /// §4.2: candidate level given a not-yet-inserted unit's would-be
    /// floor. `parents` must already all resolve in the poset (checked by
    /// compliance rule 2 before this is called).
    pub fn compute_level(&self, parents: &[Hash]) -> u64 {
        let Some(&predecessor) = parents.first() else {
            return 0;
        };
        let Some(pred_unit) = self.units.get(&predecessor) else {
            return 0;
        };
        let l = pred_unit.level;
        let tentative_floor = combine_floors(self, self.n.as_usize(), parents);
        let mut creators_with_prime_below: HashSet<ProcessId> = HashSet::new();
        for &prime_hash in self.primes_at_level(l) {
            if let Some(prime_unit) = self.units.get(&prime_hash) {
                if in_floor(self, &tentative_floor, prime_unit) {
                    creators_with_prime_below.insert(prime_unit.creator());
                }
            }
        }
        if creators_with_prime_below.len() >= self.n.supermajority() as usize {
            l + 1
        } else {
            l
        }
    }

    /// Admits `unit`, computing and recording its level, floor, and prime
    /// status. Rejects non-compliant, malformed-by-structure, orphaned, or
    /// already-known units; never deletes or mutates an existing entry.
    pub fn insert(&mut self, mut unit: Unit) -> PosetResult<InsertOutcome> {
        if self.units.contains_key(&unit.hash) {
            return Err(PosetError::AlreadyKnown(unit.hash));
        }
        check_compliance(self, &unit)?;

        let floor = combine_floors(self, self.n.as_usize(), unit.parents());
        let level = self.compute_level(unit.parents());
        let prime = if unit.is_genesis() {
            true
        } else {
            let predecessor = unit.predecessor().expect("non-genesis has a predecessor");
            let pred_level = self
                .units
                .get(&predecessor)
                .map(|u| u.level)
                .unwrap_or(0);
            level > pred_level
        };
        unit.floor = floor;
        unit.level = level;
        unit.prime = prime;

        let creator = unit.creator();
        let height = unit.height();
        let chain = &mut self.chains[creator.index()];
        while (chain.units_by_height.len() as u64) <= height {
            chain.units_by_height.push(Vec::new());
        }
        let bucket = &mut chain.units_by_height[height as usize];
        let fork_partner = bucket.first().copied();
        let newly_discovered_forker = if !bucket.is_empty() {
            let was_known = self.forkers.contains(&creator);
            if !was_known {
                self.forkers.insert(creator);
                Some(creator)
            } else {
                None
            }
        } else {
            None
        };
        bucket.push(unit.hash);

        if prime {
            self.primes_by_level.entry(level).or_default().push(unit.hash);
            if level > self.max_level {
                self.max_level = level;
            }
        }
        if unit.is_genesis() {
            self.genesis.push(unit.hash);
        }

        for parent in unit.parents() {
            self.tips.remove(parent);
        }
        self.tips.insert(unit.hash);
        self.insertion_order.push(unit.hash);

        let hash = unit.hash;
        self.units.insert(hash, unit);
        Ok(InsertOutcome {
            hash,
            level,
            prime,
            newly_discovered_forker,
            fork_partner: if newly_discovered_forker.is_some() {
                fork_partner
            } else {
                None
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::unit::{sign_unit, PreUnit};
    use aleph_crypto::Ed25519KeyPair;

    fn genesis(poset: &mut Poset, creator: u16, kp: &Ed25519KeyPair) -> Hash {
        let unit = sign_unit(PreUnit::new_genesis(ProcessId(creator)), kp);
        poset.insert(unit).unwrap().hash
    }

    #[test]
    fn genesis_units_are_prime_at_level_zero() {
        let mut poset = Poset::new(ProcessCount(4));
        let kp = Ed25519KeyPair::generate();
        let h = genesis(&mut poset, 0, &kp);
        let unit = poset.unit(&h).unwrap();
        assert_eq!(unit.level, 0);
        assert!(unit.prime);
    }

    #[test]
    fn duplicate_insert_is_rejected() {
        let mut poset = Poset::new(ProcessCount(4));
        let kp = Ed25519KeyPair::generate();
        let unit = sign_unit(PreUnit::new_genesis(ProcessId(0)), &kp);
        poset.insert(unit.clone()).unwrap();
        let err = poset.insert(unit).unwrap_err();
        assert!(matches!(err, PosetError::AlreadyKnown(_)));
    }

    #[test]
    fn fork_is_detected_on_second_unit_at_same_height() {
        let mut poset = Poset::new(ProcessCount(4));
        let kp = Ed25519KeyPair::generate();
        let mut a = sign_unit(PreUnit::new_genesis(ProcessId(0)), &kp);
        a.pre.txs.push(aleph_types::Transaction::new(vec![1]));
        let a = crate::domain::unit::sign_unit(a.pre, &kp);
        let mut b = PreUnit::new_genesis(ProcessId(0));
        b.txs.push(aleph_types::Transaction::new(vec![2]));
        let b = sign_unit(b, &kp);
        assert_ne!(a.hash, b.hash);
        poset.insert(a).unwrap();
        let outcome = poset.insert(b).unwrap();
        assert_eq!(outcome.newly_discovered_forker, Some(ProcessId(0)));
        assert!(poset.is_forker(ProcessId(0)));
    }

    #[test]
    fn tips_track_dag_leaves() {
        let mut poset = Poset::new(ProcessCount(4));
        let kp = Ed25519KeyPair::generate();
        let g = genesis(&mut poset, 0, &kp);
        assert_eq!(poset.tips_by_recency(), vec![g]);
        let child = sign_unit(
            PreUnit::new_child(ProcessId(0), 0, vec![g], Vec::new(), Vec::new()),
            &kp,
        );
        let child_hash = child.hash;
        poset.insert(child).unwrap();
        assert_eq!(poset.tips_by_recency(), vec![child_hash]);
    }
}
