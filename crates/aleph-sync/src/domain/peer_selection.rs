//! Peer selection for `dispatch_syncs` (§4.7), modeled as a closed set of
//! strategies per the design notes (§9): new strategies are new variants,
//! not a runtime plugin.

use aleph_types::{GossipStrategy, ProcessCount, ProcessId};
use rand::Rng;

/// Picks the peer to sync with next, excluding `own_id`. `round` is a
/// monotonically increasing counter private to the caller, consumed only
/// by `RoundRobin`. Panics if `n` describes a committee of one (there is
/// no peer to pick), which the scheduler should never attempt.
pub fn select_peer(
    strategy: GossipStrategy,
    own_id: ProcessId,
    n: ProcessCount,
    round: u64,
    rng: &mut impl Rng,
) -> ProcessId {
    let size = n.as_usize();
    assert!(size > 1, "cannot select a sync peer in a committee of one");
    match strategy {
        GossipStrategy::UniformRandom => loop {
            let candidate = ProcessId(rng.gen_range(0..size as u16));
            if candidate != own_id {
                return candidate;
            }
        },
        GossipStrategy::RoundRobin => {
            let offset = (round % (size as u64 - 1)) as u16;
            let candidate = (own_id.0 + 1 + offset) % size as u16;
            ProcessId(candidate)
        }
    }
}
