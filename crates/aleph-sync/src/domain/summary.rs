//! Poset summaries and the gossip diff they drive (§4.6, §6). A summary
//! is "for each process k, the height and hash of the maximal known unit
//! by k"; the diff is "units I have that your summary shows you lack."
//!
//! Both are pure functions of a `Poset` snapshot, kept independent of the
//! transport so they can be unit tested without any I/O.

use aleph_poset::Poset;
use aleph_types::{Hash, ProcessCount, ProcessId};
use serde::{Deserialize, Serialize};

/// One row of a summary frame: `(creator_id, height, hash-or-empty)`.
/// Absent means the summary's sender knows no unit by that creator yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryEntry {
    pub creator: ProcessId,
    pub height: Option<u64>,
    pub hash: Option<Hash>,
}

/// A full poset summary: one entry per committee member, indexed by
/// `ProcessId`. Forks are not represented; a forker's summary entry is an
/// arbitrary choice among its maximal units (fork gossip is out of scope,
/// per §4.6).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PosetSummary(pub Vec<SummaryEntry>);

impl PosetSummary {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn known_hashes(&self) -> impl Iterator<Item = Hash> + '_ {
        self.0.iter().filter_map(|entry| entry.hash)
    }
}

/// Builds the summary a process sends about its own knowledge.
pub fn own_summary(poset: &Poset) -> PosetSummary {
    let n = poset.committee_size().as_usize();
    let entries = (0..n)
        .map(|i| {
            let creator = ProcessId(i as u16);
            match poset.creator_maximal(creator).first() {
                Some(&hash) => SummaryEntry {
                    creator,
                    height: poset.unit(&hash).map(|u| u.height()),
                    hash: Some(hash),
                },
                None => SummaryEntry { creator, height: None, hash: None },
            }
        })
        .collect();
    PosetSummary(entries)
}

/// Units `poset` has that `remote`'s summary shows its sender lacks, in
/// topological (parents-before-children) order. A unit is already known
/// to the remote side iff it is below some unit named in its summary.
pub fn hashes_missing_from(poset: &Poset, remote: &PosetSummary) -> Vec<Hash> {
    let frontier: Vec<Hash> = remote.known_hashes().collect();
    poset
        .insertion_order()
        .iter()
        .filter(|&&u| !frontier.iter().any(|&f| poset.below(u, f)))
        .copied()
        .collect()
}

/// Sanity check on an incoming summary before it drives a diff: row count
/// must match the committee size, else the peer is either stale or lying
/// about `N`.
pub fn validate_summary(summary: &PosetSummary, n: ProcessCount) -> bool {
    summary.len() == n.as_usize()
        && summary
            .0
            .iter()
            .enumerate()
            .all(|(i, e)| e.creator == ProcessId(i as u16))
}

#[cfg(test)]
mod tests {
    use super::*;
    use aleph_poset::{sign_unit, PreUnit};
    use aleph_crypto::Ed25519KeyPair;

    fn genesis(poset: &mut Poset, creator: u16, kp: &Ed25519KeyPair) -> Hash {
        poset
            .insert(sign_unit(PreUnit::new_genesis(ProcessId(creator)), kp))
            .unwrap()
            .hash
    }

    #[test]
    fn own_summary_has_one_entry_per_process_and_empty_entries_for_unknown_creators() {
        let mut poset = Poset::new(ProcessCount(3));
        let kp = Ed25519KeyPair::generate();
        let g0 = genesis(&mut poset, 0, &kp);

        let summary = own_summary(&poset);
        assert_eq!(summary.len(), 3);
        assert_eq!(summary.0[0].hash, Some(g0));
        assert_eq!(summary.0[1].hash, None);
        assert!(validate_summary(&summary, ProcessCount(3)));
    }

    #[test]
    fn a_unit_below_the_remote_frontier_is_not_reported_missing() {
        let mut poset = Poset::new(ProcessCount(3));
        let kp0 = Ed25519KeyPair::generate();
        let kp1 = Ed25519KeyPair::generate();
        let g0 = genesis(&mut poset, 0, &kp0);
        genesis(&mut poset, 1, &kp1);
        let child = sign_unit(
            PreUnit::new_child(ProcessId(0), 0, vec![g0], Vec::new(), Vec::new()),
            &kp0,
        );
        let child_hash = poset.insert(child).unwrap().hash;

        let remote = PosetSummary(vec![
            SummaryEntry { creator: ProcessId(0), height: Some(1), hash: Some(child_hash) },
            SummaryEntry { creator: ProcessId(1), height: None, hash: None },
            SummaryEntry { creator: ProcessId(2), height: None, hash: None },
        ]);
        let missing = hashes_missing_from(&poset, &remote);
        assert_eq!(missing, vec![]);
    }

    #[test]
    fn units_the_remote_never_mentioned_are_reported_missing_in_topological_order() {
        let mut poset = Poset::new(ProcessCount(2));
        let kp0 = Ed25519KeyPair::generate();
        let kp1 = Ed25519KeyPair::generate();
        let g0 = genesis(&mut poset, 0, &kp0);
        let g1 = genesis(&mut poset, 1, &kp1);

        let empty = PosetSummary(vec![
            SummaryEntry { creator: ProcessId(0), height: None, hash: None },
            SummaryEntry { creator: ProcessId(1), height: None, hash: None },
        ]);
        let missing = hashes_missing_from(&poset, &empty);
        assert_eq!(missing, vec![g0, g1]);
    }
}
