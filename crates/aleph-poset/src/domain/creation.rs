//! Unit creation and parent selection (component design §4.4).

use crate::domain::poset::Poset;
use aleph_types::{Hash, ProcessId};
use std::time::Duration;

/// Greedy parent selection (§4.4): the creator's own latest unit is always
/// first; additional parents are taken from the poset's current tips,
/// most-recently-added first, admitted only while the expand-primes rule
/// and the `max_parents` cap both still hold. Returns `None` if no legal
/// parent set beyond the bare predecessor exists (creation is abandoned
/// silently and retried next tick, per §4.4).
pub fn select_parents(poset: &Poset, creator: ProcessId, max_parents: usize) -> Option<Vec<Hash>> {
    let predecessor = poset.creator_maximal(creator).first().copied();
    let mut parents = Vec::with_capacity(max_parents);
    if let Some(pred) = predecessor {
        parents.push(pred);
    }
    // No predecessor: this would be a genesis unit, which callers create
    // directly rather than through this selector.
    if parents.is_empty() {
        return None;
    }

    let tips = poset.tips_by_recency();

    // Pass 1: maximal units of maximal level, most-recently added first.
    let max_level = poset.max_level();
    for &tip in &tips {
        if parents.len() >= max_parents {
            break;
        }
        if tip == parents[0] || parents.contains(&tip) {
            continue;
        }
        let Some(unit) = poset.unit(&tip) else { continue };
        if unit.level != max_level {
            continue;
        }
        let mut candidate = parents.clone();
        candidate.push(tip);
        if would_satisfy_expand_primes(poset, &candidate) {
            parents = candidate;
        }
    }

    // Pass 2: maximal units at the predecessor's own level, inserted in
    // the legal position (before any later-level parent already chosen).
    let predecessor_level = poset.unit(&parents[0]).map(|u| u.level).unwrap_or(0);
    for &tip in &tips {
        if parents.len() >= max_parents {
            break;
        }
        if parents.contains(&tip) {
            continue;
        }
        let Some(unit) = poset.unit(&tip) else { continue };
        if unit.level != predecessor_level {
            continue;
        }
        if let Some(pos) = insertion_point_for_level(poset, &parents, predecessor_level) {
            let mut candidate = parents.clone();
            candidate.insert(pos, tip);
            if would_satisfy_expand_primes(poset, &candidate) {
                parents = candidate;
            }
        }
    }

    if parents.len() == 1 {
        // Nothing beyond the bare predecessor could legally be added.
        None
    } else {
        Some(parents)
    }
}

/// The position in `parents` before which a unit at `level` may still be
/// inserted without breaking the non-decreasing-level convention the
/// expand-primes rule assumes (parents are ordered by non-decreasing
/// level; same-level parents interleave freely as long as the rule holds).
fn insertion_point_for_level(poset: &Poset, parents: &[Hash], level: u64) -> Option<usize> {
    for (idx, &hash) in parents.iter().enumerate() {
        let unit_level = poset.unit(&hash).map(|u| u.level).unwrap_or(0);
        if unit_level > level {
            return Some(idx);
        }
    }
    Some(parents.len())
}

/// Re-checks rule 7 (expand-primes) for a candidate parent list without
/// needing a constructed `Unit` — used while greedily growing the parent
/// set so illegal additions are never committed to.
fn would_satisfy_expand_primes(poset: &Poset, parents: &[Hash]) -> bool {
    if parents.len() < 2 {
        return true;
    }
    let mut union_so_far = std::collections::HashSet::new();
    let first = match poset.unit(&parents[0]) {
        Some(u) => u,
        None => return false,
    };
    union_so_far.extend(poset.primes_below(first.level, parents[0]));

    for j in 1..parents.len() {
        let (Some(prev), Some(cur)) = (poset.unit(&parents[j - 1]), poset.unit(&parents[j])) else {
            return false;
        };
        if cur.level > prev.level {
            union_so_far = poset.primes_below(cur.level, parents[j]);
            continue;
        }
        let primes_below_cur = poset.primes_below(prev.level, parents[j]);
        if primes_below_cur.is_subset(&union_so_far) {
            return false;
        }
        union_so_far.extend(primes_below_cur);
    }
    true
}

/// Adaptive `create_delay` (§4.4): stagnating self-created levels push the
/// delay up (towards `max`), comfortable progress pulls it back down
/// (towards `min`), clamped to the configured bounds.
pub fn adapt_create_delay(
    recent_levels: &[u64],
    current: Duration,
    min: Duration,
    max: Duration,
) -> Duration {
    if recent_levels.len() < 3 {
        return current;
    }
    let last_three = &recent_levels[recent_levels.len() - 3..];
    let stagnating = last_three.windows(2).all(|w| w[1] <= w[0]);
    let progressing = last_three.windows(2).all(|w| w[1] > w[0]);

    if stagnating {
        let bumped = current + current / 4;
        bumped.min(max)
    } else if progressing {
        let eased = current.saturating_sub(current / 8);
        eased.max(min)
    } else {
        current
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::unit::{sign_unit, PreUnit};
    use aleph_crypto::Ed25519KeyPair;
    use aleph_types::ProcessCount;

    #[test]
    fn no_parents_beyond_predecessor_returns_none() {
        let mut poset = Poset::new(ProcessCount(4));
        let kp = Ed25519KeyPair::generate();
        let g = sign_unit(PreUnit::new_genesis(ProcessId(0)), &kp);
        poset.insert(g).unwrap();
        assert!(select_parents(&poset, ProcessId(0), 10).is_none());
    }

    #[test]
    fn genesis_creator_with_no_units_returns_none() {
        let poset = Poset::new(ProcessCount(4));
        assert!(select_parents(&poset, ProcessId(1), 10).is_none());
    }

    #[test]
    fn delay_increases_on_stagnation() {
        let d = adapt_create_delay(
            &[3, 3, 3],
            Duration::from_millis(1000),
            Duration::from_millis(500),
            Duration::from_millis(4000),
        );
        assert!(d > Duration::from_millis(1000));
    }

    #[test]
    fn delay_decreases_on_progress() {
        let d = adapt_create_delay(
            &[1, 2, 3],
            Duration::from_millis(1000),
            Duration::from_millis(500),
            Duration::from_millis(4000),
        );
        assert!(d < Duration::from_millis(1000));
    }

    #[test]
    fn delay_respects_bounds() {
        let low = adapt_create_delay(
            &[1, 2, 3],
            Duration::from_millis(520),
            Duration::from_millis(500),
            Duration::from_millis(4000),
        );
        assert!(low >= Duration::from_millis(500));
        let high = adapt_create_delay(
            &[5, 5, 5],
            Duration::from_millis(3900),
            Duration::from_millis(500),
            Duration::from_millis(4000),
        );
        assert!(high <= Duration::from_millis(4000));
    }
}
