//! The three independent tasks a running process schedules alongside the
//! arbiter (§4.7, §6): creating its own units, dialing out for gossip
//! sync, and listening for inbound gossip sync. None of them touches the
//! poset directly — `create_add` hands what it builds to the arbiter, and
//! both sync tasks go through a `SyncSession` backed by the arbiter too.

pub mod create_add;
pub mod dispatch_syncs;
pub mod listeners;
