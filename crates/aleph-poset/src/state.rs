//! The single `RwLock<Poset>` this process mutates. In the full
//! single-threaded-arbiter design (§5) the lock is never contended
//! (the arbiter is the only writer and reads happen between its calls),
//! but `RwLock` keeps the service `Send + Sync` for tokio without forcing
//! every reader through the arbiter's own mpsc queue.

use crate::domain::Poset;
use aleph_types::ProcessCount;
use parking_lot::RwLock;

pub struct PosetState {
    pub poset: RwLock<Poset>,
}

impl PosetState {
    pub fn new(n: ProcessCount) -> Self {
        PosetState {
            poset: RwLock::new(Poset::new(n)),
        }
    }
}
