//! # aleph-sync
//!
//! The pairwise three-step gossip protocol (§4.6): poset summaries,
//! the diff they drive, gossip peer selection, and the length-prefixed
//! wire framing of §6. Reads the poset through the narrow `PosetSnapshot`
//! port and hands received units onward through `UnitSink`; never holds
//! a mutable poset reference itself; `aleph-node`'s arbiter is the sole
//! mutator.

pub mod domain;
pub mod ports;
pub mod service;

pub use domain::{
    hashes_missing_from, own_summary, select_peer, validate_summary, PosetSummary, SummaryEntry,
    SyncError, SyncResult,
};
pub use ports::{DuplexStream, PosetSnapshot, SyncApi, SyncOutcome, UnitSink, UnitSource};
pub use service::SyncSession;
