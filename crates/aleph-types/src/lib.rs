//! Value types shared across the poset, consensus, sync, and node crates:
//! process identity, committee/process configuration, and the opaque
//! transaction type the core counts and orders but never interprets.

pub mod config;
pub mod entities;
pub mod errors;

pub use config::{GossipStrategy, NetworkConfig, NodeConfig, SchedulerConfig};
pub use entities::{CommitteeInfo, Hash, ProcessCount, ProcessId, PublicKey, Signature, Transaction};
pub use errors::{ConfigError, NodeState};
