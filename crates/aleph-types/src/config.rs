//! Process configuration: the enumerated keys of the external-interfaces
//! configuration table, plus the committee description they are scoped by.

use crate::entities::{CommitteeInfo, ProcessCount, ProcessId};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Peer-selection strategy for `dispatch_syncs`. Modeled as a closed set of
/// variants rather than a runtime plugin, per the design notes: new
/// strategies are added as new variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GossipStrategy {
    /// Pick a uniformly random peer other than ourselves each round.
    UniformRandom,
    /// Cycle deterministically through peers in id order.
    RoundRobin,
}

impl Default for GossipStrategy {
    fn default() -> Self {
        GossipStrategy::UniformRandom
    }
}

/// Scheduling and concurrency configuration (§5, §6).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Minimum seconds between units this process creates.
    pub create_delay_ms: u64,
    /// Lower bound `create_delay` may adapt down to.
    pub min_create_delay_ms: u64,
    /// Upper bound `create_delay` may adapt up to.
    pub max_create_delay_ms: u64,
    /// Minimum seconds between syncs this process initiates.
    pub sync_delay_ms: u64,
    /// Cap on transactions bundled into a single created unit.
    pub txs_per_unit: usize,
    /// Cap `p` on parents per unit (excluding none; includes predecessor).
    pub max_parents: usize,
    /// Concurrency cap on inbound sync sessions.
    pub max_incoming_syncs: usize,
    /// Concurrency cap on outbound sync sessions.
    pub max_outgoing_syncs: usize,
    /// Strategy used to pick the peer for each initiated sync.
    pub gossip_strategy: GossipStrategy,
    /// Wall-clock deadline for a single sync phase.
    pub sync_phase_timeout_ms: u64,
    /// TTL for units buffered awaiting a missing parent.
    pub orphan_ttl_ms: u64,
    /// Capacity of the arbiter's incoming-unit queue.
    pub arbiter_queue_capacity: usize,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        SchedulerConfig {
            create_delay_ms: 1_000,
            min_create_delay_ms: 500,
            max_create_delay_ms: 4_000,
            sync_delay_ms: 250,
            txs_per_unit: 100,
            max_parents: 20,
            max_incoming_syncs: 10,
            max_outgoing_syncs: 10,
            gossip_strategy: GossipStrategy::UniformRandom,
            sync_phase_timeout_ms: 5_000,
            orphan_ttl_ms: 30_000,
            arbiter_queue_capacity: 1_024,
        }
    }
}

impl SchedulerConfig {
    pub fn create_delay(&self) -> Duration {
        Duration::from_millis(self.create_delay_ms)
    }

    pub fn sync_delay(&self) -> Duration {
        Duration::from_millis(self.sync_delay_ms)
    }

    pub fn sync_phase_timeout(&self) -> Duration {
        Duration::from_millis(self.sync_phase_timeout_ms)
    }

    pub fn orphan_ttl(&self) -> Duration {
        Duration::from_millis(self.orphan_ttl_ms)
    }
}

/// Network binding configuration for the sync listener.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Address the sync listener binds to.
    pub listen_addr: String,
    /// `host:port` for every committee member, indexed by `ProcessId`.
    pub peer_addrs: Vec<String>,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        NetworkConfig {
            listen_addr: "0.0.0.0:5100".to_string(),
            peer_addrs: Vec::new(),
        }
    }
}

/// Top-level process configuration: committee membership plus the
/// scheduler/network sub-configurations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeConfig {
    pub own_id: ProcessId,
    pub committee_size: ProcessCount,
    pub threshold: u16,
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    #[serde(default)]
    pub network: NetworkConfig,
}

impl NodeConfig {
    /// Builds the runtime `CommitteeInfo` view from this config plus the
    /// resolved public keys (loaded separately, e.g. from a keystore file).
    pub fn committee_info(&self, public_keys: Vec<[u8; 32]>) -> CommitteeInfo {
        CommitteeInfo {
            own_id: self.own_id,
            size: self.committee_size,
            threshold: self.threshold,
            public_keys,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scheduler_defaults_are_within_bounds() {
        let cfg = SchedulerConfig::default();
        assert!(cfg.min_create_delay_ms <= cfg.create_delay_ms);
        assert!(cfg.create_delay_ms <= cfg.max_create_delay_ms);
    }

    #[test]
    fn gossip_strategy_round_trips_through_json() {
        let s = GossipStrategy::RoundRobin;
        let json = serde_json::to_string(&s).unwrap();
        assert_eq!(json, "\"round_robin\"");
        let back: GossipStrategy = serde_json::from_str(&json).unwrap();
        assert_eq!(back, s);
    }
}
