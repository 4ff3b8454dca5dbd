//! The pending-by-missing-parent buffer: a unit the arbiter rejected only
//! because one parent is not yet known is held here, keyed by that
//! parent's hash, and retried once it is admitted. Entries older than the
//! configured TTL are dropped rather than retried forever, bounding the
//! buffer against a peer that keeps citing parents that never arrive.

use aleph_poset::Unit;
use aleph_sync::UnitSource;
use aleph_types::Hash;
use std::collections::HashMap;
use std::time::{Duration, Instant};

pub struct PendingUnit {
    pub unit: Unit,
    pub source: UnitSource,
    queued_at: Instant,
}

#[derive(Default)]
pub struct OrphanBuffer {
    by_missing_parent: HashMap<Hash, Vec<PendingUnit>>,
    len: usize,
    capacity: usize,
}

impl OrphanBuffer {
    pub fn new(capacity: usize) -> Self {
        OrphanBuffer { by_missing_parent: HashMap::new(), len: 0, capacity }
    }

    /// Buffers `unit`, waiting on `missing`. Returns `false` (and drops the
    /// unit) once the buffer is at capacity.
    pub fn insert(&mut self, missing: Hash, unit: Unit, source: UnitSource) -> bool {
        if self.len >= self.capacity {
            return false;
        }
        self.by_missing_parent
            .entry(missing)
            .or_default()
            .push(PendingUnit { unit, source, queued_at: Instant::now() });
        self.len += 1;
        true
    }

    /// Removes and returns every unit that was waiting on `newly_known`.
    pub fn take_ready(&mut self, newly_known: Hash) -> Vec<PendingUnit> {
        let entries = self.by_missing_parent.remove(&newly_known).unwrap_or_default();
        self.len -= entries.len();
        entries
    }

    /// Drops every entry older than `ttl`, returning how many were evicted.
    pub fn evict_expired(&mut self, ttl: Duration) -> usize {
        let now = Instant::now();
        let mut evicted = 0;
        self.by_missing_parent.retain(|_, pending| {
            let before = pending.len();
            pending.retain(|p| now.duration_since(p.queued_at) < ttl);
            evicted += before - pending.len();
            !pending.is_empty()
        });
        self.len -= evicted;
        evicted
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aleph_poset::{sign_unit, PreUnit};
    use aleph_types::ProcessId;

    fn unit() -> Unit {
        let kp = aleph_crypto::Ed25519KeyPair::generate();
        sign_unit(PreUnit::new_genesis(ProcessId(0)), &kp)
    }

    #[test]
    fn buffered_unit_is_released_when_its_parent_arrives() {
        let mut buf = OrphanBuffer::new(10);
        let missing = [9u8; 32];
        assert!(buf.insert(missing, unit(), UnitSource::Local));
        assert_eq!(buf.len(), 1);
        let ready = buf.take_ready(missing);
        assert_eq!(ready.len(), 1);
        assert!(buf.is_empty());
    }

    #[test]
    fn capacity_is_enforced() {
        let mut buf = OrphanBuffer::new(1);
        let missing = [1u8; 32];
        assert!(buf.insert(missing, unit(), UnitSource::Local));
        assert!(!buf.insert(missing, unit(), UnitSource::Local));
    }

    #[test]
    fn expired_entries_are_evicted() {
        let mut buf = OrphanBuffer::new(10);
        buf.insert([2u8; 32], unit(), UnitSource::Local);
        let evicted = buf.evict_expired(Duration::from_secs(0));
        assert_eq!(evicted, 1);
        assert!(buf.is_empty());
    }
}
