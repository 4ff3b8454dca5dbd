//! Events published on the process-internal bus: observable lifecycle
//! points of the poset and consensus engines, for an outer layer (e.g. a
//! persistence or RPC adapter) to subscribe to. This is a side-channel
//! fan-out, not the arbiter's own control-flow queue.

use aleph_types::{Hash, ProcessId};
use serde::{Deserialize, Serialize};

/// All events publishable on the bus.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum AlephEvent {
    /// A unit was admitted into the local poset.
    UnitInserted {
        hash: Hash,
        creator: ProcessId,
        height: u64,
        level: u64,
    },

    /// A creator was discovered to have forked (two incomparable units at
    /// the same height).
    ForkerDetected {
        creator: ProcessId,
        first: Hash,
        second: Hash,
    },

    /// A timing unit was elected for a level, finalizing that level's slot
    /// in the linear order.
    TimingUnitElected { level: u64, unit: Hash },

    /// The linear order was extended by appending newly-ordered units.
    LinearOrderExtended {
        up_to_level: u64,
        appended: Vec<Hash>,
    },
}

impl AlephEvent {
    /// Topic used for subscription filtering.
    #[must_use]
    pub fn topic(&self) -> EventTopic {
        match self {
            Self::UnitInserted { .. } => EventTopic::Poset,
            Self::ForkerDetected { .. } => EventTopic::Forks,
            Self::TimingUnitElected { .. } => EventTopic::Consensus,
            Self::LinearOrderExtended { .. } => EventTopic::LinearOrder,
        }
    }
}

/// Topics for subscription filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventTopic {
    Poset,
    Forks,
    Consensus,
    LinearOrder,
    All,
}

/// Filter for subscribing to a subset of topics.
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    /// Topics to include. Empty means all topics.
    pub topics: Vec<EventTopic>,
}

impl EventFilter {
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn topics(topics: Vec<EventTopic>) -> Self {
        Self { topics }
    }

    #[must_use]
    pub fn matches(&self, event: &AlephEvent) -> bool {
        self.topics.is_empty()
            || self.topics.contains(&EventTopic::All)
            || self.topics.contains(&event.topic())
    }
}
