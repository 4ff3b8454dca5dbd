//! # aleph-poset
//!
//! The poset engine: the in-memory directed acyclic structure of units,
//! its invariants, compliance checking, level/prime computation, and the
//! `below` relation supported by per-unit floor vectors (§3, §4.1-§4.4 of
//! the protocol design). This crate owns the one mutable `Poset` a
//! process maintains; `aleph-consensus` reads it to elect timing units
//! and extract the linear order, and `aleph-sync` reads/writes it through
//! the `PosetApi` port during gossip.

pub mod domain;
pub mod ports;
pub mod service;
pub mod state;

pub use domain::{
    adapt_create_delay, below, check_compliance, combine_floors, select_parents, sign_unit,
    ComplianceViolation, CoinSharePayload, Floor, InsertOutcome, PosetError, PosetResult,
    PreUnit, Poset, Unit, UnitLookup,
};
pub use ports::{CommitteeKeyProvider, NullEventSink, PosetApi, PosetEventSink};
pub use service::PosetService;
pub use state::PosetState;
