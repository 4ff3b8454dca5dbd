mod election;
mod error;
mod linear_order;
mod popularity;

pub use election::{
    candidate_order, decide_candidate, elect_at_level, encode_share, nonce_for, CandidateOutcome,
    ElectionOutcome, DEFAULT_MAX_ELECTION_DEPTH,
};
pub use error::{ConsensusError, ConsensusResult};
pub use linear_order::extend_to;
pub use popularity::proves_popular;
