//! Timing-unit election (§4.5): for a level `ℓ`, pick at most one prime
//! unit among the candidates in a canonical process order, deciding each
//! candidate via popularity proofs at `ℓ+2` and a common-mode vote
//! propagation (supermajority, falling back to the common coin) at every
//! level above that.

use crate::domain::popularity::proves_popular;
use aleph_crypto::threshold_coin::CoinShare;
use aleph_crypto::{sha256_hash_many, BlsSignature, ThresholdCoin};
use aleph_poset::{CoinSharePayload, Poset};
use aleph_types::{Hash, ProcessCount, ProcessId};
use std::collections::HashMap;

/// Result of attempting to decide a single candidate prime unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidateOutcome {
    Elected,
    Skipped,
    /// Not enough of the poset has grown in yet (missing level, or a
    /// prime at level `d` carries no usable coin share) to decide this
    /// candidate one way or the other.
    Undecided,
}

/// Result of attempting election at a whole level.
#[derive(Debug, Clone, Copy)]
pub enum ElectionOutcome {
    Elected(ProcessId, Hash),
    Undecided,
}

/// A safety bound on how many levels above `ℓ` the common-mode loop will
/// walk before giving up for this attempt (retried once the poset grows).
/// Termination is expected in O(1) levels with overwhelming probability;
/// this is not a protocol parameter, only a guard against pathological
/// non-termination.
pub const DEFAULT_MAX_ELECTION_DEPTH: u64 = 64;

/// The canonical order candidates are tried in at level `ℓ`: a permutation
/// of process ids derived from the hash of a designated prior unit (the
/// previous level's timing unit, or the level-0 seed).
pub fn candidate_order(poset: &Poset, seed: Hash) -> Vec<ProcessId> {
    let n = poset.committee_size().as_usize() as u16;
    let mut ids: Vec<ProcessId> = (0..n).map(ProcessId).collect();
    ids.sort_by_key(|id| sha256_hash_many(&[&seed[..], &id.0.to_be_bytes()]));
    ids
}

fn prime_by_creator(poset: &Poset, level: u64, creator: ProcessId) -> Option<Hash> {
    poset
        .primes_at_level(level)
        .iter()
        .copied()
        .find(|h| poset.unit(h).map(|u| u.creator()) == Some(creator))
}

/// The domain-separated byte string a coin share for candidate `v` at
/// depth `d` is signed over. Exposed so unit creation can pre-compute the
/// same nonce when attaching a share to a prime unit it is about to sign.
pub fn nonce_for(v: Hash, d: u64) -> Vec<u8> {
    let mut buf = v.to_vec();
    buf.extend_from_slice(&d.to_be_bytes());
    buf
}

fn decode_share(payload: &CoinSharePayload) -> Option<CoinShare> {
    if payload.0.len() != 98 {
        return None;
    }
    let creator = u16::from_be_bytes([payload.0[0], payload.0[1]]);
    let mut sig_bytes = [0u8; 96];
    sig_bytes.copy_from_slice(&payload.0[2..98]);
    BlsSignature::from_bytes(&sig_bytes)
        .ok()
        .map(|sig| CoinShare::from_parts(creator, sig))
}

/// Encodes a coin share for embedding in a `PreUnit` at creation time.
pub fn encode_share(share: &CoinShare, creator: u16) -> CoinSharePayload {
    let mut buf = Vec::with_capacity(98);
    buf.extend_from_slice(&creator.to_be_bytes());
    buf.extend_from_slice(&share.signature_bytes());
    CoinSharePayload(buf)
}

/// Every coin share attached to a prime unit at `level`, keyed by the
/// claimed creator (first one seen wins; `ThresholdCoin::combine_shares`
/// re-verifies before trusting any of them).
fn coin_shares_at(poset: &Poset, level: u64) -> HashMap<u16, CoinShare> {
    let mut shares = HashMap::new();
    for &hash in poset.primes_at_level(level) {
        if let Some(unit) = poset.unit(&hash) {
            for payload in &unit.pre.coin_shares {
                if let Some(share) = decode_share(payload) {
                    shares.entry(share.creator).or_insert(share);
                }
            }
        }
    }
    shares
}

fn supermajority_bit(votes: &[bool], n: ProcessCount) -> Option<bool> {
    let threshold = n.supermajority() as usize;
    let ones = votes.iter().filter(|&&b| b).count();
    let zeros = votes.len() - ones;
    if ones >= threshold {
        Some(true)
    } else if zeros >= threshold {
        Some(false)
    } else {
        None
    }
}

/// The vote a prime `u` at level `d > ℓ+2` casts for candidate `v`: the
/// supermajority of its level-`(d-1)` predecessors' votes if one exists,
/// otherwise the common coin for `(v, d)`. `None` when neither a
/// supermajority nor enough coin shares are visible yet.
fn vote_at(
    poset: &Poset,
    coin: &ThresholdCoin,
    prev_votes: &HashMap<Hash, bool>,
    u: Hash,
    d: u64,
    v: Hash,
) -> Option<bool> {
    let below_votes: Vec<bool> = poset
        .primes_at_level(d - 1)
        .iter()
        .filter(|&&p| poset.below(p, u))
        .filter_map(|p| prev_votes.get(p).copied())
        .collect();
    if let Some(bit) = supermajority_bit(&below_votes, poset.committee_size()) {
        return Some(bit);
    }
    let shares = coin_shares_at(poset, d);
    let nonce = nonce_for(v, d);
    coin.combine_shares(&shares, &nonce).ok()
}

/// Decides one candidate prime unit `v` at level `ℓ`, iterating vote
/// rounds `d = ℓ+2, ℓ+3, …` until every level-`d` prime unanimously agrees
/// (elected on unanimous 1, skipped on unanimous 0) or data runs out.
pub fn decide_candidate(
    poset: &Poset,
    coin: &ThresholdCoin,
    popularity_memo: &mut HashMap<(Hash, Hash), bool>,
    v: Hash,
    level: u64,
    max_depth: u64,
) -> CandidateOutcome {
    let mut votes: HashMap<Hash, bool> = HashMap::new();
    let mut d = level + 2;
    loop {
        if d > level + max_depth {
            return CandidateOutcome::Undecided;
        }
        let primes_d = poset.primes_at_level(d);
        if primes_d.is_empty() {
            return CandidateOutcome::Undecided;
        }
        let mut new_votes = HashMap::with_capacity(primes_d.len());
        for &u in primes_d {
            let vote = if d == level + 2 {
                *popularity_memo
                    .entry((u, v))
                    .or_insert_with(|| proves_popular(poset, u, v))
            } else {
                match vote_at(poset, coin, &votes, u, d, v) {
                    Some(bit) => bit,
                    None => return CandidateOutcome::Undecided,
                }
            };
            new_votes.insert(u, vote);
        }
        let total = new_votes.len();
        let ones = new_votes.values().filter(|&&b| b).count();
        if ones == total {
            return CandidateOutcome::Elected;
        }
        if ones == 0 {
            return CandidateOutcome::Skipped;
        }
        votes = new_votes;
        d += 1;
    }
}

/// Attempts to elect a timing unit at `level`, trying candidates in
/// `candidate_order`. Stops at the first candidate that is elected or
/// whose decision is still undetermined (order must be respected: later
/// candidates cannot be considered before an earlier one is settled).
/// Forkers never hold a valid candidacy.
pub fn elect_at_level(
    poset: &Poset,
    coin: &ThresholdCoin,
    popularity_memo: &mut HashMap<(Hash, Hash), bool>,
    level: u64,
    seed: Hash,
    max_depth: u64,
) -> ElectionOutcome {
    for creator in candidate_order(poset, seed) {
        if poset.is_forker(creator) {
            continue;
        }
        let Some(v) = prime_by_creator(poset, level, creator) else {
            continue;
        };
        match decide_candidate(poset, coin, popularity_memo, v, level, max_depth) {
            CandidateOutcome::Elected => return ElectionOutcome::Elected(creator, v),
            CandidateOutcome::Skipped => continue,
            CandidateOutcome::Undecided => return ElectionOutcome::Undecided,
        }
    }
    ElectionOutcome::Undecided
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn candidate_order_is_a_permutation() {
        let poset = Poset::new(ProcessCount(4));
        let seed = [7u8; 32];
        let order = candidate_order(&poset, seed);
        let mut sorted = order.clone();
        sorted.sort_by_key(|id| id.0);
        assert_eq!(sorted, vec![ProcessId(0), ProcessId(1), ProcessId(2), ProcessId(3)]);
    }

    #[test]
    fn candidate_order_is_deterministic_given_the_same_seed() {
        let poset = Poset::new(ProcessCount(5));
        let seed = [3u8; 32];
        assert_eq!(candidate_order(&poset, seed), candidate_order(&poset, seed));
    }

    #[test]
    fn share_encoding_round_trips() {
        let kp = aleph_crypto::BlsKeyPair::generate();
        let share = CoinShare::from_parts(2, kp.sign(b"nonce"));
        let payload = encode_share(&share, 2);
        let decoded = decode_share(&payload).unwrap();
        assert_eq!(decoded.creator, 2);
        assert_eq!(decoded.signature_bytes(), share.signature_bytes());
    }
}
