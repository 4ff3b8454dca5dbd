//! One committee process: loads its identity, wires the library crates'
//! services together behind a single serializing arbiter, and schedules
//! unit creation and pairwise gossip sync around it (§4, §6).
//!
//! `main.rs` is a thin CLI shell over [`container::Node`]; everything with
//! any logic lives in this library so it can be exercised from tests.

pub mod adapters;
pub mod arbiter;
pub mod config;
pub mod container;
pub mod orphan;
pub mod scheduler;
pub mod shutdown;
pub mod tx_source;
