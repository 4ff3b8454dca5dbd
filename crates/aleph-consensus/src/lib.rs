//! # aleph-consensus
//!
//! Timing-unit election via coin-based common-mode BFT decision, and
//! extraction of the deterministic linear order from elected timing
//! units (§4.5 of the protocol design). Reads the poset maintained by
//! `aleph-poset` but never mutates it; the arbiter in `aleph-node` calls
//! this crate after every poset insertion that completes a new level.

pub mod domain;
pub mod ports;
pub mod service;
pub mod state;

pub use domain::{
    candidate_order, decide_candidate, elect_at_level, encode_share, extend_to, nonce_for,
    proves_popular, CandidateOutcome, ConsensusError, ConsensusResult, ElectionOutcome,
    DEFAULT_MAX_ELECTION_DEPTH,
};
pub use ports::{CoinProvider, ConsensusApi};
pub use service::ConsensusService;
pub use state::ConsensusState;
