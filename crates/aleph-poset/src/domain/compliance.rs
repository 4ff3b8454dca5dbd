//! Compliance checking (component design §4.3): the seven rules a
//! candidate unit must satisfy before `Poset::insert` admits it. Only
//! structural rules live here — signature and hash verification (rule 1)
//! happens one layer up, in the service, because it needs the committee's
//! public keys, which the poset itself does not hold.

use crate::domain::error::{ComplianceViolation, PosetError, PosetResult};
use crate::domain::floor::combine_floors;
use crate::domain::poset::Poset;
use crate::domain::unit::Unit;
use aleph_types::ProcessId;
use std::collections::HashSet;

pub fn check_compliance(poset: &Poset, unit: &Unit) -> PosetResult<()> {
    if unit.is_genesis() {
        // A genesis unit has no parents to check rules 2-7 against.
        return Ok(());
    }

    check_parents_present_and_height(poset, unit)?;
    check_self_predecessor(poset, unit)?;
    check_distinct_creators(poset, unit)?;
    check_no_self_forker_proof(poset, unit)?;
    check_no_forker_endorsement(poset, unit)?;
    check_expand_primes(poset, unit)?;
    Ok(())
}

/// Rule 2: every parent hash resolves in the poset, and height is exactly
/// predecessor.height + 1.
fn check_parents_present_and_height(poset: &Poset, unit: &Unit) -> PosetResult<()> {
    for &parent in unit.parents() {
        if !poset.contains(&parent) {
            return Err(PosetError::Orphan(unit.hash, parent));
        }
    }
    let predecessor_hash = unit.predecessor().expect("non-genesis has a predecessor");
    let predecessor = poset
        .unit(&predecessor_hash)
        .expect("presence just checked above");
    if unit.height() != predecessor.height() + 1 {
        return Err(PosetError::NonCompliant {
            unit: unit.hash,
            reason: ComplianceViolation::BadHeight,
        });
    }
    Ok(())
}

/// Rule 3: the first parent's creator is this unit's own creator.
fn check_self_predecessor(poset: &Poset, unit: &Unit) -> PosetResult<()> {
    let predecessor_hash = unit.predecessor().expect("non-genesis has a predecessor");
    let predecessor = poset.unit(&predecessor_hash).expect("resolved by rule 2");
    if predecessor.creator() != unit.creator() {
        return Err(PosetError::NonCompliant {
            unit: unit.hash,
            reason: ComplianceViolation::SelfPredecessorMismatch,
        });
    }
    Ok(())
}

/// Rule 4: parents have pairwise distinct creators.
fn check_distinct_creators(poset: &Poset, unit: &Unit) -> PosetResult<()> {
    let mut seen: HashSet<ProcessId> = HashSet::new();
    for &parent in unit.parents() {
        let parent_unit = poset.unit(&parent).expect("resolved by rule 2");
        if !seen.insert(parent_unit.creator()) {
            return Err(PosetError::NonCompliant {
                unit: unit.hash,
                reason: ComplianceViolation::DuplicateParentCreator,
            });
        }
    }
    Ok(())
}

/// Rule 5: the unit's combined floor must not contain two incomparable
/// entries for its own creator — that would be the unit proving its own
/// lineage forked.
fn check_no_self_forker_proof(poset: &Poset, unit: &Unit) -> PosetResult<()> {
    let floor = combine_floors(poset, poset.committee_size().as_usize(), unit.parents());
    if floor.slot(unit.creator()).len() > 1 {
        return Err(PosetError::NonCompliant {
            unit: unit.hash,
            reason: ComplianceViolation::SelfForkerProof,
        });
    }
    Ok(())
}

/// Rule 6: no parent `p_i` proves another parent `p_j`'s creator a
/// forker, i.e. `p_i.floor[p_j.creator]` contains no element incomparable
/// with `p_j`.
fn check_no_forker_endorsement(poset: &Poset, unit: &Unit) -> PosetResult<()> {
    let parents = unit.parents();
    for &pi_hash in parents {
        let pi = poset.unit(&pi_hash).expect("resolved by rule 2");
        for &pj_hash in parents {
            if pi_hash == pj_hash {
                continue;
            }
            let pj = poset.unit(&pj_hash).expect("resolved by rule 2");
            for &candidate in pi.floor_slot(pj.creator()) {
                if candidate == pj_hash {
                    continue;
                }
                let comparable = poset.below(candidate, pj_hash) || poset.below(pj_hash, candidate);
                if !comparable {
                    return Err(PosetError::NonCompliant {
                        unit: unit.hash,
                        reason: ComplianceViolation::ForkerEndorsement,
                    });
                }
            }
        }
    }
    Ok(())
}

/// Rule 7, the expand-primes rule: for each parent `p_j` (`j >= 1`),
/// either its level strictly exceeds `p_{j-1}`'s, or the set of
/// level-`p_{j-1}.level` prime units below `p_j` strictly extends the
/// union of the same set for parents `p_1..p_{j-1}`.
fn check_expand_primes(poset: &Poset, unit: &Unit) -> PosetResult<()> {
    let parents = unit.parents();
    if parents.len() < 2 {
        return Ok(());
    }
    let mut union_so_far: HashSet<aleph_types::Hash> = HashSet::new();
    let first = poset.unit(&parents[0]).expect("resolved by rule 2");
    union_so_far.extend(poset.primes_below(first.level, parents[0]));

    for j in 1..parents.len() {
        let prev = poset.unit(&parents[j - 1]).expect("resolved by rule 2");
        let cur = poset.unit(&parents[j]).expect("resolved by rule 2");
        if cur.level > prev.level {
            union_so_far = poset.primes_below(cur.level, parents[j]);
            continue;
        }
        let primes_below_cur = poset.primes_below(prev.level, parents[j]);
        if primes_below_cur.is_subset(&union_so_far) {
            return Err(PosetError::NonCompliant {
                unit: unit.hash,
                reason: ComplianceViolation::ExpandPrimesViolation,
            });
        }
        union_so_far.extend(primes_below_cur);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::unit::{sign_unit, PreUnit};
    use aleph_crypto::Ed25519KeyPair;
    use aleph_types::ProcessCount;

    #[test]
    fn genesis_always_compliant() {
        let poset = Poset::new(ProcessCount(4));
        let kp = Ed25519KeyPair::generate();
        let unit = sign_unit(PreUnit::new_genesis(ProcessId(0)), &kp);
        assert!(check_compliance(&poset, &unit).is_ok());
    }

    #[test]
    fn duplicate_parent_creators_rejected() {
        let mut poset = Poset::new(ProcessCount(4));
        let kp0 = Ed25519KeyPair::generate();
        let kp2 = Ed25519KeyPair::generate();
        let g0 = sign_unit(PreUnit::new_genesis(ProcessId(0)), &kp0);
        let g0_hash = g0.hash;
        poset.insert(g0).unwrap();
        let g2 = sign_unit(PreUnit::new_genesis(ProcessId(2)), &kp2);
        let g2_hash = g2.hash;
        poset.insert(g2).unwrap();

        // creator 2's own predecessor (rule 3 is satisfied) followed by
        // g0 cited twice: two parents share creator 0, triggering rule 4.
        let dup = sign_unit(
            PreUnit {
                creator_id: ProcessId(2),
                height: 1,
                parents: vec![g2_hash, g0_hash, g0_hash],
                txs: Vec::new(),
                coin_shares: Vec::new(),
            },
            &kp2,
        );
        let err = check_compliance(&poset, &dup).unwrap_err();
        assert!(matches!(
            err,
            PosetError::NonCompliant {
                reason: ComplianceViolation::DuplicateParentCreator,
                ..
            }
        ));
    }
}
